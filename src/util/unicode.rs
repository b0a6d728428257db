use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// The first `max` characters of `s`, never splitting a grapheme cluster.
/// Returns the prefix and whether anything was cut.
pub fn take_chars(s: &str, max: usize) -> (&str, bool) {
    let mut count = 0;
    for (i, g) in s.grapheme_indices(true) {
        let n = g.chars().count();
        if count + n > max {
            return (&s[..i], true);
        }
        count += n;
    }
    (s, false)
}

/// Byte offset of the `char_offset`-th character, clamped to `s.len()`.
pub fn char_to_byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Substring by character range; `None` if the range is empty or runs
/// past the end of `s`.
pub fn char_slice(s: &str, start: usize, end: usize) -> Option<&str> {
    if start >= end || end > s.chars().count() {
        return None;
    }
    let from = char_to_byte_offset(s, start);
    let to = char_to_byte_offset(s, end);
    Some(&s[from..to])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_counts_wide_and_tabs() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("a\tb"), 6);
    }

    #[test]
    fn truncate_to_width_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello\u{2026}");
        assert_eq!(truncate_to_width("日本語", 4), "日\u{2026}");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn take_chars_keeps_graphemes_whole() {
        assert_eq!(take_chars("abcdef", 3), ("abc", true));
        assert_eq!(take_chars("abc", 3), ("abc", false));
        // "e" + combining acute is one grapheme of two chars
        assert_eq!(take_chars("ae\u{301}x", 2), ("a", true));
    }

    #[test]
    fn char_slice_uses_char_offsets() {
        let s = "héllo wörld";
        assert_eq!(char_slice(s, 6, 11), Some("wörld"));
        assert_eq!(char_slice(s, 0, 5), Some("héllo"));
        assert_eq!(char_slice(s, 3, 3), None);
        assert_eq!(char_slice(s, 6, 12), None);
    }

    #[test]
    fn char_to_byte_offset_clamps() {
        assert_eq!(char_to_byte_offset("héllo", 2), 3);
        assert_eq!(char_to_byte_offset("héllo", 99), 6);
    }
}
