use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of a tagged span of the page.
///
/// `content` is a copy taken when the span was tagged, not a live
/// reference into the page: later edits to the page do not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    /// `section-<start>-<end>-<millis>`; informational only
    pub id: String,
    pub content: String,
    /// Tag ids, in the order they were applied
    pub tags: Vec<String>,
    /// Creation time, persisted as unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ContentSection {
    /// Build a section for the span `[start, start + chars)` of the page.
    pub fn new(start: usize, content: String, tags: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        let end = start + content.chars().count();
        ContentSection {
            id: format!("section-{}-{}-{}", start, end, timestamp.timestamp_millis()),
            content,
            tags,
            timestamp,
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }

    /// True when the section carries any of the given tag ids
    pub fn has_any_tag<'a, I>(&self, tag_ids: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        tag_ids.into_iter().any(|id| self.has_tag(id))
    }
}
