use chrono::{DateTime, TimeZone};

use crate::model::settings::TimestampFormat;
use crate::util::unicode::char_to_byte_offset;

/// Render `at` in the given format
pub fn format_timestamp<Tz>(format: TimestampFormat, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(format.pattern()).to_string()
}

/// Insert `"<stamp> "` at character offset `cursor` (clamped to the end of
/// `text`). Returns the new text and the cursor just past the insertion.
pub fn insert_timestamp(text: &str, cursor: usize, stamp: &str) -> (String, usize) {
    let cursor = cursor.min(text.chars().count());
    let at = char_to_byte_offset(text, cursor);
    let insertion = format!("{} ", stamp);
    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..at]);
    out.push_str(&insertion);
    out.push_str(&text[at..]);
    (out, cursor + insertion.chars().count())
}

/// Filename-safe form of `at` used in export names:
/// RFC 3339 in UTC with `:` and `.` replaced by `-`
pub fn file_stamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(&chrono::Utc)
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 9, 3, 7).unwrap()
    }

    #[test]
    fn formats() {
        assert_eq!(format_timestamp(TimestampFormat::Datetime, &at()), "2025-05-14 09:03:07");
        assert_eq!(format_timestamp(TimestampFormat::Date, &at()), "2025-05-14");
        assert_eq!(format_timestamp(TimestampFormat::Time, &at()), "09:03:07");
    }

    #[test]
    fn insert_in_middle() {
        let (text, cursor) = insert_timestamp("héllo world", 6, "09:03:07");
        assert_eq!(text, "héllo 09:03:07 world");
        assert_eq!(cursor, 15);
    }

    #[test]
    fn insert_clamps_to_end() {
        let (text, cursor) = insert_timestamp("ab", 99, "2025-05-14");
        assert_eq!(text, "ab2025-05-14 ");
        assert_eq!(cursor, 13);
    }

    #[test]
    fn insert_into_empty() {
        let (text, cursor) = insert_timestamp("", 0, "x");
        assert_eq!(text, "x ");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn file_stamp_has_no_colons_or_dots() {
        assert_eq!(file_stamp(&at()), "2025-05-14T09-03-07-000Z");
    }

    #[test]
    fn file_stamp_is_always_utc() {
        let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(file_stamp(&at().with_timezone(&plus_two)), "2025-05-14T09-03-07-000Z");
    }
}
