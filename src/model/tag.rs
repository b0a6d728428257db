use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed palette a tag color is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TagColor {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Violet,
    Pink,
    Gray,
}

impl TagColor {
    /// All palette entries, in picker order
    pub const ALL: [TagColor; 9] = [
        TagColor::Red,
        TagColor::Orange,
        TagColor::Yellow,
        TagColor::Green,
        TagColor::Cyan,
        TagColor::Blue,
        TagColor::Violet,
        TagColor::Pink,
        TagColor::Gray,
    ];

    /// The persisted hex form, e.g. `#ef4444`
    pub fn hex(self) -> &'static str {
        match self {
            TagColor::Red => "#ef4444",
            TagColor::Orange => "#f97316",
            TagColor::Yellow => "#eab308",
            TagColor::Green => "#22c55e",
            TagColor::Cyan => "#06b6d4",
            TagColor::Blue => "#3b82f6",
            TagColor::Violet => "#8b5cf6",
            TagColor::Pink => "#ec4899",
            TagColor::Gray => "#6b7280",
        }
    }

    /// Lowercase palette name, e.g. `red`
    pub fn name(self) -> &'static str {
        match self {
            TagColor::Red => "red",
            TagColor::Orange => "orange",
            TagColor::Yellow => "yellow",
            TagColor::Green => "green",
            TagColor::Cyan => "cyan",
            TagColor::Blue => "blue",
            TagColor::Violet => "violet",
            TagColor::Pink => "pink",
            TagColor::Gray => "gray",
        }
    }

    /// Parse either a palette name or its hex value (case-insensitive)
    pub fn parse_color(s: &str) -> Option<TagColor> {
        let s = s.trim();
        TagColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.hex().eq_ignore_ascii_case(s))
    }

    /// Pick a palette entry at random
    pub fn random() -> TagColor {
        use rand::seq::SliceRandom;
        *TagColor::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&TagColor::Gray)
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<String> for TagColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TagColor::parse_color(&value).ok_or_else(|| format!("unknown tag color: {}", value))
    }
}

impl From<TagColor> for String {
    fn from(color: TagColor) -> String {
        color.hex().to_string()
    }
}

/// A user-defined label applied to sections of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Opaque id, assigned at creation and never changed
    pub id: String,
    /// Display name (trimmed, not guaranteed unique)
    pub name: String,
    pub color: TagColor,
}

impl Tag {
    pub fn new(id: String, name: String, color: TagColor) -> Self {
        Tag { id, name, color }
    }

    /// Case-insensitive name comparison used for de-duplication
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serializes_as_hex() {
        let tag = Tag::new("tag-1".into(), "Ideas".into(), TagColor::Blue);
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, r##"{"id":"tag-1","name":"Ideas","color":"#3b82f6"}"##);
    }

    #[test]
    fn color_parses_name_or_hex() {
        assert_eq!(TagColor::parse_color("violet"), Some(TagColor::Violet));
        assert_eq!(TagColor::parse_color("#EF4444"), Some(TagColor::Red));
        assert_eq!(TagColor::parse_color(" Gray "), Some(TagColor::Gray));
        assert_eq!(TagColor::parse_color("#123456"), None);
    }

    #[test]
    fn off_palette_color_is_rejected() {
        let res: Result<Tag, _> =
            serde_json::from_str(r##"{"id":"t","name":"x","color":"#000000"}"##);
        assert!(res.is_err());
    }

    #[test]
    fn name_match_ignores_case_and_padding() {
        let tag = Tag::new("t".into(), "Ideas".into(), TagColor::Red);
        assert!(tag.matches_name("ideas"));
        assert!(tag.matches_name("  IDEAS "));
        assert!(!tag.matches_name("idea"));
    }
}
