//! The binder: one page, its quick notes, tags and tagged sections, all
//! owned by one struct over an injected key-value store.
//!
//! Every user action is a method here. Callers (the CLI, tests) never
//! touch the registry, index or store directly, so the cross-structure
//! invariants hold after every call:
//! - every tag id a section references exists in the registry;
//! - the filter selection only holds existing tag ids;
//! - the page is not editable while a filter is active or the binder is
//!   locked.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

use crate::io::autosave::Debouncer;
use crate::io::kv_store::{KeyValueStore, StoreError};
use crate::io::persist;
use crate::model::section::ContentSection;
use crate::model::settings::{ExportFormat, TimestampSettings};
use crate::model::tag::{Tag, TagColor};
use crate::ops::export::{self, ExportOptions};
use crate::ops::filter::{Selection, filtered_view};
use crate::ops::pin_lock::{PinError, PinLock};
use crate::ops::prompts::{FocusExercise, append_prompt, find_exercise};
use crate::ops::section_ops::{SectionIndex, TagStats};
use crate::ops::share::{self, ShareError};
use crate::ops::tag_ops::TagRegistry;
use crate::ops::text_stats::{TextStats, text_stats};
use crate::ops::timestamp::{format_timestamp, insert_timestamp};
use crate::util::unicode::char_slice;

/// Error type for binder operations
#[derive(Debug, thiserror::Error)]
pub enum BinderError {
    #[error("binder is locked: unlock it with your PIN first")]
    Locked,
    #[error("a tag filter is active: the filtered view is read-only (clear the filter to edit)")]
    FilterActive,
    #[error(transparent)]
    Pin(#[from] PinError),
    #[error("nothing to export: the content is empty")]
    NothingToExport,
    #[error("selection {start}..{end} is outside the page")]
    SelectionOutOfRange { start: usize, end: usize },
    #[error("text not found in page: {0:?}")]
    TextNotFound(String),
    #[error("no focus exercise named {0:?}")]
    UnknownExercise(String),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A rendered export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub body: String,
}

pub struct Binder<S: KeyValueStore> {
    store: S,
    registry: TagRegistry,
    sections: SectionIndex,
    selection: Selection,
    document: String,
    quick_notes: String,
    gate: PinLock,
    timestamp_settings: TimestampSettings,
    autosave: Debouncer,
}

impl<S: KeyValueStore> Binder<S> {
    /// Load everything from `store`.
    ///
    /// Each key loads independently. Section references to tags the
    /// registry does not know (left by an interrupted two-key write) are
    /// dropped.
    pub fn open(store: S, autosave_delay: Duration) -> Self {
        let (tags, sections) = persist::load(&store);
        let registry = TagRegistry::from_tags(tags);
        let mut sections = SectionIndex::from_sections(sections);

        let known: HashSet<&str> = registry.list_tags().iter().map(|t| t.id.as_str()).collect();
        let dropped = sections.retain_known_tags(&known);
        if dropped > 0 {
            log::warn!("dropped {} section reference(s) to unknown tags", dropped);
        }

        let gate = PinLock::new(persist::load_pin(&store), persist::load_locked(&store));

        Binder {
            document: persist::load_document(&store),
            quick_notes: persist::load_quick_notes(&store),
            timestamp_settings: persist::load_timestamp_settings(&store),
            registry,
            sections,
            selection: Selection::new(),
            gate,
            autosave: Debouncer::new(autosave_delay),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, dropping any unsaved page edit
    pub fn into_store(self) -> S {
        self.store
    }

    fn ensure_unlocked(&self) -> Result<(), BinderError> {
        if self.gate.is_locked() {
            Err(BinderError::Locked)
        } else {
            Ok(())
        }
    }

    fn ensure_editable(&self) -> Result<(), BinderError> {
        self.ensure_unlocked()?;
        if self.selection.is_active() {
            return Err(BinderError::FilterActive);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Page and quick notes
    // -----------------------------------------------------------------------

    pub fn document(&self) -> Result<&str, BinderError> {
        self.ensure_unlocked()?;
        Ok(&self.document)
    }

    /// The page, or the filtered view while a filter is active
    pub fn visible_document(&self) -> Result<String, BinderError> {
        self.ensure_unlocked()?;
        Ok(filtered_view(&self.document, &self.selection, self.sections.sections()))
    }

    /// Replace the page and (re)arm the autosave timer.
    pub fn edit_document(&mut self, text: &str, now: Instant) -> Result<(), BinderError> {
        self.ensure_editable()?;
        self.document = text.to_string();
        self.autosave.arm(now);
        Ok(())
    }

    pub fn append_document(&mut self, text: &str, now: Instant) -> Result<(), BinderError> {
        self.ensure_editable()?;
        if !self.document.is_empty() && !self.document.ends_with('\n') {
            self.document.push('\n');
        }
        self.document.push_str(text);
        self.autosave.arm(now);
        Ok(())
    }

    /// Whether a page edit is waiting for the autosave timer
    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Write the page if the autosave timer has run out. Returns whether a
    /// write happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool, BinderError> {
        if self.autosave.fire_if_due(now) {
            persist::save_document(&mut self.store, &self.document)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Write a pending page edit now and disarm the timer
    pub fn flush(&mut self) -> Result<(), BinderError> {
        if self.autosave.is_pending() {
            self.autosave.cancel();
            persist::save_document(&mut self.store, &self.document)?;
        }
        Ok(())
    }

    pub fn quick_notes(&self) -> Result<&str, BinderError> {
        self.ensure_unlocked()?;
        Ok(&self.quick_notes)
    }

    pub fn set_quick_notes(&mut self, text: &str) -> Result<(), BinderError> {
        self.ensure_unlocked()?;
        self.quick_notes = text.to_string();
        persist::save_quick_notes(&mut self.store, &self.quick_notes)?;
        Ok(())
    }

    /// Insert a timestamp at character offset `cursor`; returns the cursor
    /// after the inserted text.
    pub fn insert_timestamp<Tz>(&mut self, cursor: usize, at: &DateTime<Tz>, now: Instant) -> Result<usize, BinderError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.ensure_editable()?;
        let stamp = format_timestamp(self.timestamp_settings.format, at);
        let (text, cursor) = insert_timestamp(&self.document, cursor, &stamp);
        self.document = text;
        self.autosave.arm(now);
        Ok(cursor)
    }

    /// Append the prompt of focus exercise `id` as a new paragraph
    pub fn use_exercise(&mut self, id: &str, now: Instant) -> Result<&'static FocusExercise, BinderError> {
        self.ensure_editable()?;
        let exercise = find_exercise(id).ok_or_else(|| BinderError::UnknownExercise(id.to_string()))?;
        self.document = append_prompt(&self.document, exercise.prompt);
        self.autosave.arm(now);
        log::debug!("used focus exercise {}", exercise.id);
        Ok(exercise)
    }

    pub fn text_stats(&self) -> Result<TextStats, BinderError> {
        self.ensure_unlocked()?;
        Ok(text_stats(&self.document))
    }

    // -----------------------------------------------------------------------
    // Tags and sections
    // -----------------------------------------------------------------------

    pub fn tags(&self) -> Result<&[Tag], BinderError> {
        self.ensure_unlocked()?;
        Ok(self.registry.list_tags())
    }

    /// Find a tag by id, or by name case-insensitively
    pub fn resolve_tag(&self, id_or_name: &str) -> Result<Option<&Tag>, BinderError> {
        self.ensure_unlocked()?;
        Ok(self.registry.resolve(id_or_name))
    }

    pub fn sections(&self) -> Result<&[ContentSection], BinderError> {
        self.ensure_unlocked()?;
        Ok(self.sections.sections())
    }

    /// Create a tag, or return the existing one with the same name.
    /// Blank names are ignored (`Ok(None)`).
    pub fn create_tag(
        &mut self,
        name: &str,
        color: Option<TagColor>,
        now: DateTime<Utc>,
    ) -> Result<Option<Tag>, BinderError> {
        self.ensure_unlocked()?;
        let Some(tag) = self.registry.create_or_find_tag(name, color, now) else {
            return Ok(None);
        };
        persist::save_tags(&mut self.store, self.registry.list_tags())?;
        Ok(Some(tag))
    }

    /// Delete a tag and every reference to it (sections, filter).
    /// Unknown ids are ignored (`Ok(None)`).
    pub fn delete_tag(&mut self, tag_id: &str) -> Result<Option<Tag>, BinderError> {
        self.ensure_unlocked()?;
        let Some(tag) = self.registry.delete_tag(tag_id) else {
            return Ok(None);
        };
        let touched = self.sections.remove_tag_references(tag_id);
        self.selection.deselect(tag_id);
        log::debug!("deleted tag {} ({} section(s) untagged)", tag.id, touched);
        persist::save(&mut self.store, self.registry.list_tags(), self.sections.sections())?;
        Ok(Some(tag))
    }

    /// Tag the characters `start..end` of the page with `tag_name`,
    /// creating the tag if needed.
    ///
    /// Returns `Ok(None)` without changing anything when the selected text
    /// is blank or the tag name is blank.
    pub fn tag_selection(
        &mut self,
        start: usize,
        end: usize,
        tag_name: &str,
        color: Option<TagColor>,
        now: DateTime<Utc>,
    ) -> Result<Option<ContentSection>, BinderError> {
        self.ensure_editable()?;
        let content = char_slice(&self.document, start, end)
            .ok_or(BinderError::SelectionOutOfRange { start, end })?
            .to_string();
        if content.trim().is_empty() {
            return Ok(None);
        }
        let Some(tag) = self.registry.create_or_find_tag(tag_name, color, now) else {
            return Ok(None);
        };
        let section = self
            .sections
            .record_section_at(start, &content, std::slice::from_ref(&tag.id), now);
        persist::save(&mut self.store, self.registry.list_tags(), self.sections.sections())?;
        Ok(section)
    }

    /// Tag the first occurrence of `text` in the page
    pub fn tag_text(
        &mut self,
        text: &str,
        tag_name: &str,
        color: Option<TagColor>,
        now: DateTime<Utc>,
    ) -> Result<Option<ContentSection>, BinderError> {
        self.ensure_editable()?;
        let byte_start = self
            .document
            .find(text)
            .filter(|_| !text.is_empty())
            .ok_or_else(|| BinderError::TextNotFound(text.to_string()))?;
        let start = self.document[..byte_start].chars().count();
        let end = start + text.chars().count();
        self.tag_selection(start, end, tag_name, color, now)
    }

    pub fn usage_count(&self, tag_id: &str) -> usize {
        self.sections.usage_count(tag_id)
    }

    pub fn sections_for_tag(&self, tag_id: &str) -> Result<Vec<&ContentSection>, BinderError> {
        self.ensure_unlocked()?;
        Ok(self.sections.sections_for_tag(tag_id))
    }

    pub fn tag_stats(&self) -> Result<TagStats, BinderError> {
        self.ensure_unlocked()?;
        Ok(self.sections.stats(&self.registry))
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection, keeping only ids of existing tags
    pub fn set_selection(&mut self, mut selection: Selection) {
        let registry = &self.registry;
        let dropped = selection.retain_existing(|id| registry.contains(id));
        if dropped > 0 {
            log::debug!("dropped {} unknown tag id(s) from the filter", dropped);
        }
        self.selection = selection;
    }

    /// Flip a tag in the filter. Unknown ids are ignored; returns whether
    /// the tag is selected afterwards.
    pub fn toggle_filter(&mut self, tag_id: &str) -> bool {
        if !self.registry.contains(tag_id) {
            return false;
        }
        self.selection.toggle(tag_id)
    }

    pub fn clear_filter(&mut self) {
        self.selection.clear();
    }

    // -----------------------------------------------------------------------
    // Timestamps and export
    // -----------------------------------------------------------------------

    pub fn timestamp_settings(&self) -> TimestampSettings {
        self.timestamp_settings
    }

    pub fn set_timestamp_settings(&mut self, settings: TimestampSettings) -> Result<(), BinderError> {
        self.timestamp_settings = settings;
        persist::save_timestamp_settings(&mut self.store, &settings)?;
        Ok(())
    }

    /// Render the page (or, with `filtered`, the current filtered view)
    pub fn export<Tz>(
        &self,
        format: ExportFormat,
        filtered: bool,
        title: &str,
        at: &DateTime<Tz>,
    ) -> Result<ExportFile, BinderError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.ensure_unlocked()?;
        let content = if filtered {
            self.visible_document()?
        } else {
            self.document.clone()
        };
        if content.trim().is_empty() {
            return Err(BinderError::NothingToExport);
        }
        let stamp = self
            .timestamp_settings
            .enabled
            .then(|| format_timestamp(self.timestamp_settings.format, at));
        let opts = ExportOptions {
            title,
            stamp: stamp.as_deref(),
        };
        Ok(ExportFile {
            file_name: export::export_filename(format, at),
            body: export::render(format, &content, &opts),
        })
    }

    // -----------------------------------------------------------------------
    // PIN lock
    // -----------------------------------------------------------------------

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    pub fn has_pin(&self) -> bool {
        self.gate.has_pin()
    }

    pub fn set_pin(&mut self, pin: &str) -> Result<(), BinderError> {
        self.ensure_unlocked()?;
        self.gate.set_pin(pin)?;
        persist::save_pin(&mut self.store, self.gate.pin())?;
        Ok(())
    }

    /// Lock the binder, writing any pending page edit first
    pub fn lock(&mut self) -> Result<(), BinderError> {
        self.flush()?;
        self.gate.lock()?;
        persist::save_locked(&mut self.store, true)?;
        Ok(())
    }

    pub fn unlock(&mut self, pin: &str) -> Result<(), BinderError> {
        self.gate.unlock(pin)?;
        persist::save_locked(&mut self.store, false)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Private share
    // -----------------------------------------------------------------------

    /// Encrypt the page and quick notes with `key`
    pub fn share(&self, key: &str, now: DateTime<Utc>) -> Result<String, BinderError> {
        self.ensure_unlocked()?;
        Ok(share::share(&self.document, &self.quick_notes, now, key)?)
    }
}
