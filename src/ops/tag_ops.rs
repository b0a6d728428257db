use chrono::{DateTime, Utc};

use crate::model::tag::{Tag, TagColor};

/// The set of tags, in creation order.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<Tag>,
    /// Per-session counter appended to generated ids
    next_seq: u64,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from previously persisted tags
    pub fn from_tags(tags: Vec<Tag>) -> Self {
        TagRegistry { tags, next_seq: 0 }
    }

    /// Resolve `name` to an existing tag (case-insensitive) or create one.
    ///
    /// Returns `None` when the trimmed name is empty. An existing tag is
    /// returned unchanged, even if `color_hint` differs from its color.
    pub fn create_or_find_tag(
        &mut self,
        name: &str,
        color_hint: Option<TagColor>,
        now: DateTime<Utc>,
    ) -> Option<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(existing) = self.find_by_name(name) {
            return Some(existing.clone());
        }

        let tag = Tag::new(
            self.next_id(now),
            name.to_string(),
            color_hint.unwrap_or_else(TagColor::random),
        );
        self.tags.push(tag.clone());
        Some(tag)
    }

    /// Remove a tag. Unknown ids are a no-op returning `None`.
    ///
    /// This only touches the registry; references held by sections and the
    /// selection are the caller's to cascade.
    pub fn delete_tag(&mut self, tag_id: &str) -> Option<Tag> {
        let idx = self.tags.iter().position(|t| t.id == tag_id)?;
        Some(self.tags.remove(idx))
    }

    /// Tags in insertion order
    pub fn list_tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == tag_id)
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.get(tag_id).is_some()
    }

    /// First tag whose name matches case-insensitively
    pub fn find_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.matches_name(name))
    }

    /// Look up by exact id first, then by name
    pub fn resolve(&self, id_or_name: &str) -> Option<&Tag> {
        self.get(id_or_name).or_else(|| self.find_by_name(id_or_name))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// `tag-<millis>-<seq>`, skipping any id already taken by a loaded tag
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("tag-{}-{}", now.timestamp_millis(), self.next_seq);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
