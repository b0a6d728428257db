use indexmap::IndexSet;

use crate::model::section::ContentSection;

/// Separator placed between sections in a filtered view
pub const VIEW_SEPARATOR: &str = "\n\n---\n\n";

/// The tag ids currently filtering the page, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `tag_id`; returns whether it is now selected
    pub fn toggle(&mut self, tag_id: &str) -> bool {
        if self.ids.shift_remove(tag_id) {
            false
        } else {
            self.ids.insert(tag_id.to_string());
            true
        }
    }

    pub fn select(&mut self, tag_id: &str) {
        self.ids.insert(tag_id.to_string());
    }

    /// Returns true if the id was selected
    pub fn deselect(&mut self, tag_id: &str) -> bool {
        self.ids.shift_remove(tag_id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `exists` holds. Returns how many were dropped.
    pub fn retain_existing<F>(&mut self, mut exists: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|id| exists(id));
        before - self.ids.len()
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.ids.contains(tag_id)
    }

    /// Filtering is active whenever anything is selected
    pub fn is_active(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Selection {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Derived, read-only view of the page for the current selection.
///
/// With nothing selected this is the page itself. Otherwise it is the
/// content of every section carrying *any* selected tag, in recording
/// order, joined by [`VIEW_SEPARATOR`]; empty when nothing matches.
pub fn filtered_view(full_document: &str, selected: &Selection, sections: &[ContentSection]) -> String {
    if !selected.is_active() {
        return full_document.to_string();
    }
    sections
        .iter()
        .filter(|s| s.has_any_tag(selected.iter()))
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join(VIEW_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn section(content: &str, tags: &[&str]) -> ContentSection {
        let ts = Utc.timestamp_millis_opt(1).unwrap();
        ContentSection::new(0, content.into(), tags.iter().map(|t| t.to_string()).collect(), ts)
    }

    #[test]
    fn empty_selection_returns_document() {
        let doc = "whole page\n\nwith lines";
        let sections = vec![section("with", &["t1"])];
        assert_eq!(filtered_view(doc, &Selection::new(), &sections), doc);
        assert_eq!(filtered_view("", &Selection::new(), &[]), "");
    }

    #[test]
    fn no_sections_gives_empty_view() {
        let sel: Selection = ["t1"].into_iter().collect();
        assert_eq!(filtered_view("page", &sel, &[]), "");
    }

    #[test]
    fn selection_is_or_across_tags() {
        let sections = vec![
            section("one", &["a"]),
            section("two", &["b"]),
            section("three", &["c"]),
        ];
        let sel: Selection = ["b", "a"].into_iter().collect();
        assert_eq!(filtered_view("page", &sel, &sections), "one\n\n---\n\ntwo");
    }

    #[test]
    fn overlapping_tag_sets_join_in_recording_order() {
        let sections = vec![section("first", &["a", "b"]), section("second", &["b", "c"])];
        let sel: Selection = ["b"].into_iter().collect();
        assert_eq!(filtered_view("page", &sel, &sections), "first\n\n---\n\nsecond");
    }

    #[test]
    fn section_matching_two_selected_tags_appears_once() {
        let sections = vec![section("both", &["a", "b"])];
        let sel: Selection = ["a", "b"].into_iter().collect();
        assert_eq!(filtered_view("page", &sel, &sections), "both");
    }

    #[test]
    fn toggle_and_retain() {
        let mut sel = Selection::new();
        assert!(sel.toggle("a"));
        assert!(sel.toggle("b"));
        assert!(!sel.toggle("a"));
        assert_eq!(sel.to_vec(), vec!["b"]);

        sel.select("c");
        assert_eq!(sel.retain_existing(|id| id == "c"), 1);
        assert_eq!(sel.to_vec(), vec!["c"]);
        assert!(sel.deselect("c"));
        assert!(!sel.is_active());
    }
}
