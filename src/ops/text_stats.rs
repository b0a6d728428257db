use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::util::unicode::take_chars;

/// Average reading speed used for `reading_minutes`
pub const WORDS_PER_MINUTE: usize = 200;

/// Default excerpt length in characters
pub const EXCERPT_CHARS: usize = 150;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Counts shown by `binder stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub reading_minutes: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub title: String,
    pub excerpt: String,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whole minutes at [`WORDS_PER_MINUTE`], never less than 1
pub fn reading_minutes(text: &str) -> usize {
    word_count(text).div_ceil(WORDS_PER_MINUTE).max(1)
}

pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        words: word_count(text),
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        reading_minutes: reading_minutes(text),
        paragraphs: PARAGRAPH_BREAK
            .split(text)
            .filter(|p| !p.trim().is_empty())
            .count(),
        sentences: SENTENCE_END
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .count(),
        title: extract_title(text),
        excerpt: excerpt(text, EXCERPT_CHARS),
    }
}

/// First line, if it is non-empty and shorter than 100 characters
pub fn extract_title(text: &str) -> String {
    let first = text.lines().next().unwrap_or("").trim();
    let len = first.chars().count();
    if len > 0 && len < 100 {
        first.to_string()
    } else {
        "Untitled Document".to_string()
    }
}

/// At most `max_chars` characters, cut back to the last space when there
/// is one, followed by `...`
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let (head, cut) = take_chars(text, max_chars);
    if !cut {
        return text.to_string();
    }
    match head.rfind(' ') {
        Some(i) if i > 0 => format!("{}...", &head[..i]),
        _ => format!("{}...", head),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_for_sample_text() {
        let text = "Title line\n\nFirst para. Still first!\n  \nSecond para? Yes.";
        assert_eq!(
            text_stats(text),
            TextStats {
                words: 9,
                characters: 57,
                characters_no_spaces: 45,
                reading_minutes: 1,
                paragraphs: 3,
                sentences: 4,
                title: "Title line".to_string(),
                excerpt: text.to_string(),
            }
        );
    }

    #[test]
    fn empty_text() {
        let s = text_stats("   ");
        assert_eq!(s.words, 0);
        assert_eq!(s.paragraphs, 0);
        assert_eq!(s.sentences, 0);
        assert_eq!(s.reading_minutes, 1);
    }

    #[test]
    fn reading_time_rounds_up() {
        let text = "word ".repeat(201);
        assert_eq!(reading_minutes(&text), 2);
        assert_eq!(reading_minutes(&"word ".repeat(200)), 1);
    }

    #[test]
    fn title_from_first_line() {
        assert_eq!(extract_title("  Morning pages \nbody"), "Morning pages");
        assert_eq!(extract_title("\nbody"), "Untitled Document");
        assert_eq!(extract_title(&"x".repeat(100)), "Untitled Document");
    }

    #[test]
    fn excerpt_cuts_at_last_space() {
        assert_eq!(excerpt("short", 150), "short");
        assert_eq!(excerpt("build a boat today", 10), "build a...");
        assert_eq!(excerpt("abcdefghijkl", 5), "abcde...");
    }
}
