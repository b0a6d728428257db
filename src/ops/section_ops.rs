use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::section::ContentSection;
use crate::model::tag::Tag;
use crate::ops::tag_ops::TagRegistry;
use crate::util::unicode::take_chars;

/// Characters shown in a section preview before `...`
pub const PREVIEW_CHARS: usize = 100;

/// Append-only list of tagged sections, in recording order.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    sections: Vec<ContentSection>,
}

/// Aggregate numbers shown next to the tag list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStats {
    pub total_sections: usize,
    /// Sections that still carry at least one tag
    pub tagged_sections: usize,
    pub most_used: Option<Tag>,
}

impl SectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<ContentSection>) -> Self {
        SectionIndex { sections }
    }

    /// Record a section whose offset in the page is unknown (taken as 0).
    pub fn record_section(
        &mut self,
        content: &str,
        tag_ids: &[String],
        timestamp: DateTime<Utc>,
    ) -> Option<ContentSection> {
        self.record_section_at(0, content, tag_ids, timestamp)
    }

    /// Record a section starting at character offset `start` of the page.
    ///
    /// Returns `None` (and records nothing) when `content` is blank or
    /// `tag_ids` is empty. Identical calls append distinct sections; spans
    /// are never merged.
    pub fn record_section_at(
        &mut self,
        start: usize,
        content: &str,
        tag_ids: &[String],
        timestamp: DateTime<Utc>,
    ) -> Option<ContentSection> {
        if content.trim().is_empty() || tag_ids.is_empty() {
            return None;
        }
        let mut tags: Vec<String> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !tags.contains(id) {
                tags.push(id.clone());
            }
        }
        let section = ContentSection::new(start, content.to_string(), tags, timestamp);
        self.sections.push(section.clone());
        Some(section)
    }

    /// Strip `tag_id` from every section. Sections left without tags stay
    /// in the index. Returns how many sections changed.
    pub fn remove_tag_references(&mut self, tag_id: &str) -> usize {
        let mut changed = 0;
        for section in &mut self.sections {
            let before = section.tags.len();
            section.tags.retain(|t| t != tag_id);
            if section.tags.len() != before {
                changed += 1;
            }
        }
        changed
    }

    /// Drop references to tag ids not in `known`. Returns how many
    /// references were removed.
    pub fn retain_known_tags(&mut self, known: &HashSet<&str>) -> usize {
        let mut dropped = 0;
        for section in &mut self.sections {
            let before = section.tags.len();
            section.tags.retain(|t| known.contains(t.as_str()));
            dropped += before - section.tags.len();
        }
        dropped
    }

    pub fn usage_count(&self, tag_id: &str) -> usize {
        self.sections.iter().filter(|s| s.has_tag(tag_id)).count()
    }

    /// Sections carrying `tag_id`, in recording order
    pub fn sections_for_tag(&self, tag_id: &str) -> Vec<&ContentSection> {
        self.sections.iter().filter(|s| s.has_tag(tag_id)).collect()
    }

    pub fn sections(&self) -> &[ContentSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Totals plus the most used tag (first in registry order on ties,
    /// `None` when there are no tags).
    pub fn stats(&self, registry: &TagRegistry) -> TagStats {
        let mut most_used: Option<(&Tag, usize)> = None;
        for tag in registry.list_tags() {
            let count = self.usage_count(&tag.id);
            match most_used {
                Some((_, best)) if count <= best => {}
                _ => most_used = Some((tag, count)),
            }
        }
        TagStats {
            total_sections: self.sections.len(),
            tagged_sections: self.sections.iter().filter(|s| !s.tags.is_empty()).count(),
            most_used: most_used.map(|(t, _)| t.clone()),
        }
    }
}

/// Short form of a section's content for listings
pub fn preview(section: &ContentSection) -> String {
    let (head, cut) = take_chars(&section.content, PREVIEW_CHARS);
    if cut {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tag::TagColor;
    use chrono::TimeZone;

    fn ts(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_rejects_blank_or_untagged() {
        let mut idx = SectionIndex::new();
        assert!(idx.record_section("  \n\t", &ids(&["t1"]), ts(1)).is_none());
        assert!(idx.record_section("text", &[], ts(1)).is_none());
        assert!(idx.is_empty());
    }

    #[test]
    fn test_identical_records_are_not_deduplicated() {
        let mut idx = SectionIndex::new();
        idx.record_section("same", &ids(&["t1"]), ts(1));
        idx.record_section("same", &ids(&["t1"]), ts(1));
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.usage_count("t1"), 2);
    }

    #[test]
    fn test_duplicate_tag_ids_collapse_within_section() {
        let mut idx = SectionIndex::new();
        let s = idx.record_section("x", &ids(&["t1", "t2", "t1"]), ts(1)).unwrap();
        assert_eq!(s.tags, ids(&["t1", "t2"]));
    }

    #[test]
    fn test_record_at_offset_sets_id() {
        let mut idx = SectionIndex::new();
        let s = idx.record_section_at(10, "boat", &ids(&["t1"]), ts(5)).unwrap();
        assert_eq!(s.id, "section-10-14-5");
    }

    #[test]
    fn test_remove_tag_references_keeps_sections() {
        let mut idx = SectionIndex::new();
        idx.record_section("a", &ids(&["t1"]), ts(1));
        idx.record_section("b", &ids(&["t1", "t2"]), ts(2));
        idx.record_section("c", &ids(&["t2"]), ts(3));

        assert_eq!(idx.remove_tag_references("t1"), 2);
        assert_eq!(idx.len(), 3);
        assert!(idx.sections()[0].tags.is_empty());
        assert_eq!(idx.sections()[1].tags, ids(&["t2"]));
        assert!(idx.sections().iter().all(|s| !s.has_tag("t1")));
        assert_eq!(idx.remove_tag_references("missing"), 0);
    }

    #[test]
    fn test_sections_for_tag_in_recording_order() {
        let mut idx = SectionIndex::new();
        idx.record_section("late", &ids(&["t1"]), ts(300));
        idx.record_section("other", &ids(&["t2"]), ts(200));
        idx.record_section("early", &ids(&["t1"]), ts(100));
        let got: Vec<&str> = idx
            .sections_for_tag("t1")
            .iter()
            .map(|s| s.content.as_str())
            .collect();
        assert_eq!(got, vec!["late", "early"]);
    }

    #[test]
    fn test_retain_known_tags() {
        let mut idx = SectionIndex::new();
        idx.record_section("a", &ids(&["t1", "ghost"]), ts(1));
        idx.record_section("b", &ids(&["ghost"]), ts(1));
        let known: HashSet<&str> = ["t1"].into_iter().collect();
        assert_eq!(idx.retain_known_tags(&known), 2);
        assert_eq!(idx.sections()[0].tags, ids(&["t1"]));
        assert!(idx.sections()[1].tags.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut reg = TagRegistry::new();
        let a = reg.create_or_find_tag("a", Some(TagColor::Red), ts(1)).unwrap();
        let b = reg.create_or_find_tag("b", Some(TagColor::Blue), ts(1)).unwrap();
        let mut idx = SectionIndex::new();
        idx.record_section("1", &[b.id.clone()], ts(1));
        idx.record_section("2", &[a.id.clone(), b.id.clone()], ts(1));
        idx.record_section("3", &[a.id.clone()], ts(1));
        idx.remove_tag_references(&a.id);

        let stats = idx.stats(&reg);
        assert_eq!(stats.total_sections, 3);
        assert_eq!(stats.tagged_sections, 2);
        assert_eq!(stats.most_used.map(|t| t.name), Some("b".to_string()));
    }

    #[test]
    fn test_stats_tie_goes_to_first_tag() {
        let mut reg = TagRegistry::new();
        reg.create_or_find_tag("first", None, ts(1));
        reg.create_or_find_tag("second", None, ts(1));
        let stats = SectionIndex::new().stats(&reg);
        assert_eq!(stats.most_used.map(|t| t.name), Some("first".to_string()));
        assert!(SectionIndex::new().stats(&TagRegistry::new()).most_used.is_none());
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(150);
        let s = ContentSection::new(0, long, ids(&["t"]), ts(1));
        let p = preview(&s);
        assert_eq!(p.len(), 103);
        assert!(p.ends_with("..."));

        let short = ContentSection::new(0, "short".into(), ids(&["t"]), ts(1));
        assert_eq!(preview(&short), "short");
    }
}
