//! Storage layout for everything binder keeps in the key-value store.
//!
//! Structured values are wrapped in a versioned envelope. A value that is
//! missing, unparsable, of an unknown version, or fails validation loads as
//! the empty/default value; one bad key never prevents the others loading.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::io::kv_store::{KeyValueStore, StoreError};
use crate::model::section::ContentSection;
use crate::model::settings::{TimestampFormat, TimestampSettings};
use crate::model::tag::Tag;

pub const CONTENT_KEY: &str = "one-page-binder-content";
pub const QUICK_NOTES_KEY: &str = "one-page-binder-quick-notes";
pub const PIN_KEY: &str = "one-page-binder-pin";
pub const LOCKED_KEY: &str = "one-page-binder-locked";
pub const TIMESTAMP_SETTINGS_KEY: &str = "one-page-binder-timestamp-settings";
pub const TAGS_KEY: &str = "one-page-binder-tags";
pub const SECTIONS_KEY: &str = "one-page-binder-content-sections";

/// Current envelope version for every structured key
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct ListEnvelopeOut<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct ListEnvelopeIn<T> {
    version: u32,
    items: Vec<T>,
}

#[derive(Serialize, Deserialize)]
struct TimestampEnvelope {
    version: u32,
    enabled: bool,
    format: TimestampFormat,
}

// ---------------------------------------------------------------------------
// Tags and sections
// ---------------------------------------------------------------------------

/// Write tags and sections under their two keys.
///
/// The writes are independent: the sections write is attempted even if the
/// tags write failed. The first error is returned.
pub fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    tags: &[Tag],
    sections: &[ContentSection],
) -> Result<(), StoreError> {
    let tags_result = save_tags(store, tags);
    let sections_result = save_sections(store, sections);
    tags_result.and(sections_result)
}

/// Read tags and sections, each defaulting to empty on its own.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> (Vec<Tag>, Vec<ContentSection>) {
    (load_tags(store), load_sections(store))
}

pub fn save_tags<S: KeyValueStore + ?Sized>(store: &mut S, tags: &[Tag]) -> Result<(), StoreError> {
    write_list(store, TAGS_KEY, tags)
}

pub fn save_sections<S: KeyValueStore + ?Sized>(
    store: &mut S,
    sections: &[ContentSection],
) -> Result<(), StoreError> {
    write_list(store, SECTIONS_KEY, sections)
}

pub fn load_tags<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Tag> {
    let tags: Vec<Tag> = read_list(store, TAGS_KEY).unwrap_or_default();
    match validate_tags(&tags) {
        Ok(()) => tags,
        Err(reason) => {
            log::warn!("discarding stored tags: {}", reason);
            Vec::new()
        }
    }
}

pub fn load_sections<S: KeyValueStore + ?Sized>(store: &S) -> Vec<ContentSection> {
    let sections: Vec<ContentSection> = read_list(store, SECTIONS_KEY).unwrap_or_default();
    match validate_sections(&sections) {
        Ok(()) => sections,
        Err(reason) => {
            log::warn!("discarding stored content sections: {}", reason);
            Vec::new()
        }
    }
}

fn validate_tags(tags: &[Tag]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for tag in tags {
        if tag.id.is_empty() {
            return Err("tag with empty id".to_string());
        }
        if tag.name.trim().is_empty() {
            return Err(format!("tag {} has an empty name", tag.id));
        }
        if !seen.insert(tag.id.as_str()) {
            return Err(format!("duplicate tag id {}", tag.id));
        }
    }
    Ok(())
}

fn validate_sections(sections: &[ContentSection]) -> Result<(), String> {
    for section in sections {
        if section.id.is_empty() {
            return Err("section with empty id".to_string());
        }
        if section.content.trim().is_empty() {
            return Err(format!("section {} has no content", section.id));
        }
    }
    Ok(())
}

fn write_list<S: KeyValueStore + ?Sized, T: Serialize>(
    store: &mut S,
    key: &str,
    items: &[T],
) -> Result<(), StoreError> {
    let envelope = ListEnvelopeOut {
        version: SCHEMA_VERSION,
        items,
    };
    let json = serde_json::to_string(&envelope)?;
    store.set(key, &json)
}

fn read_list<S: KeyValueStore + ?Sized, T: DeserializeOwned>(store: &S, key: &str) -> Option<Vec<T>> {
    let raw = store.get(key)?;
    match serde_json::from_str::<ListEnvelopeIn<T>>(&raw) {
        Ok(env) if env.version == SCHEMA_VERSION => Some(env.items),
        Ok(env) => {
            log::warn!("ignoring {}: unsupported version {}", key, env.version);
            None
        }
        Err(e) => {
            log::warn!("ignoring malformed {}: {}", key, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp settings
// ---------------------------------------------------------------------------

pub fn save_timestamp_settings<S: KeyValueStore + ?Sized>(
    store: &mut S,
    settings: &TimestampSettings,
) -> Result<(), StoreError> {
    let envelope = TimestampEnvelope {
        version: SCHEMA_VERSION,
        enabled: settings.enabled,
        format: settings.format,
    };
    store.set(TIMESTAMP_SETTINGS_KEY, &serde_json::to_string(&envelope)?)
}

pub fn load_timestamp_settings<S: KeyValueStore + ?Sized>(store: &S) -> TimestampSettings {
    let Some(raw) = store.get(TIMESTAMP_SETTINGS_KEY) else {
        return TimestampSettings::default();
    };
    match serde_json::from_str::<TimestampEnvelope>(&raw) {
        Ok(env) if env.version == SCHEMA_VERSION => TimestampSettings {
            enabled: env.enabled,
            format: env.format,
        },
        Ok(env) => {
            log::warn!("ignoring timestamp settings: unsupported version {}", env.version);
            TimestampSettings::default()
        }
        Err(e) => {
            log::warn!("ignoring malformed timestamp settings: {}", e);
            TimestampSettings::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Plain string values
// ---------------------------------------------------------------------------

pub fn load_document<S: KeyValueStore + ?Sized>(store: &S) -> String {
    store.get(CONTENT_KEY).unwrap_or_default()
}

pub fn save_document<S: KeyValueStore + ?Sized>(store: &mut S, text: &str) -> Result<(), StoreError> {
    store.set(CONTENT_KEY, text)
}

pub fn load_quick_notes<S: KeyValueStore + ?Sized>(store: &S) -> String {
    store.get(QUICK_NOTES_KEY).unwrap_or_default()
}

pub fn save_quick_notes<S: KeyValueStore + ?Sized>(store: &mut S, text: &str) -> Result<(), StoreError> {
    store.set(QUICK_NOTES_KEY, text)
}

/// The stored PIN, if one is set and well-formed (4 characters)
pub fn load_pin<S: KeyValueStore + ?Sized>(store: &S) -> Option<String> {
    let pin = store.get(PIN_KEY)?;
    if pin.chars().count() == 4 {
        Some(pin)
    } else {
        log::warn!("ignoring stored PIN of unexpected length");
        None
    }
}

pub fn save_pin<S: KeyValueStore + ?Sized>(store: &mut S, pin: Option<&str>) -> Result<(), StoreError> {
    match pin {
        Some(pin) => store.set(PIN_KEY, pin),
        None => store.remove(PIN_KEY),
    }
}

/// Lock state; anything other than `"true"` reads as unlocked
pub fn load_locked<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    store.get(LOCKED_KEY).as_deref() == Some("true")
}

pub fn save_locked<S: KeyValueStore + ?Sized>(store: &mut S, locked: bool) -> Result<(), StoreError> {
    store.set(LOCKED_KEY, if locked { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use crate::model::tag::TagColor;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> (Vec<Tag>, Vec<ContentSection>) {
        let tags = vec![
            Tag::new("tag-1".into(), "Ideas".into(), TagColor::Red),
            Tag::new("tag-2".into(), "Todo".into(), TagColor::Cyan),
        ];
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let sections = vec![
            ContentSection::new(0, "build a boat".into(), vec!["tag-1".into()], ts),
            ContentSection::new(13, "sail".into(), vec!["tag-1".into(), "tag-2".into()], ts),
        ];
        (tags, sections)
    }

    /// Memory store whose writes to one key always fail
    struct RefusingStore {
        inner: MemoryStore,
        refused: &'static str,
    }

    impl KeyValueStore for RefusingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.refused {
                return Err(StoreError::WriteError {
                    path: key.into(),
                    source: std::io::Error::other("refused"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_tags_write_still_writes_sections() {
        let mut store = RefusingStore {
            inner: MemoryStore::new(),
            refused: TAGS_KEY,
        };
        let (tags, sections) = sample();

        let err = save(&mut store, &tags, &sections).unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));
        assert!(store.get(TAGS_KEY).is_none());
        assert_eq!(load_sections(&store), sections);
    }

    #[test]
    fn failed_sections_write_is_reported() {
        let mut store = RefusingStore {
            inner: MemoryStore::new(),
            refused: SECTIONS_KEY,
        };
        let (tags, sections) = sample();

        assert!(save(&mut store, &tags, &sections).is_err());
        assert_eq!(load_tags(&store), tags);
    }

    #[test]
    fn save_then_load_round_trip() {
        let mut store = MemoryStore::new();
        let (tags, sections) = sample();
        save(&mut store, &tags, &sections).unwrap();
        let (t, s) = load(&store);
        assert_eq!(t, tags);
        assert_eq!(s, sections);
    }

    #[test]
    fn envelope_carries_version() {
        let mut store = MemoryStore::new();
        let (tags, _) = sample();
        save_tags(&mut store, &tags).unwrap();
        let v: serde_json::Value = serde_json::from_str(&store.get(TAGS_KEY).unwrap()).unwrap();
        assert_eq!(v["version"], 1);
        assert_eq!(v["items"][0]["color"], "#ef4444");
    }

    #[test]
    fn missing_keys_load_empty() {
        let store = MemoryStore::new();
        let (t, s) = load(&store);
        assert!(t.is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn malformed_tags_do_not_block_sections() {
        let mut store = MemoryStore::new();
        let (_, sections) = sample();
        save_sections(&mut store, &sections).unwrap();
        store.set(TAGS_KEY, "[{oops").unwrap();
        let (t, s) = load(&store);
        assert!(t.is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn malformed_sections_do_not_block_tags() {
        let mut store = MemoryStore::new();
        let (tags, _) = sample();
        save_tags(&mut store, &tags).unwrap();
        store.set(SECTIONS_KEY, "42").unwrap();
        let (t, s) = load(&store);
        assert_eq!(t.len(), 2);
        assert!(s.is_empty());
    }

    #[test]
    fn unversioned_array_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set(TAGS_KEY, r##"[{"id":"t","name":"Ideas","color":"#ef4444"}]"##)
            .unwrap();
        assert!(load_tags(&store).is_empty());
    }

    #[test]
    fn future_version_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set(TAGS_KEY, r##"{"version":2,"items":[{"id":"t","name":"Ideas","color":"#ef4444"}]}"##)
            .unwrap();
        assert!(load_tags(&store).is_empty());
    }

    #[test]
    fn duplicate_tag_ids_fail_validation() {
        let mut store = MemoryStore::new();
        let tags = vec![
            Tag::new("t".into(), "A".into(), TagColor::Red),
            Tag::new("t".into(), "B".into(), TagColor::Blue),
        ];
        save_tags(&mut store, &tags).unwrap();
        assert!(load_tags(&store).is_empty());
    }

    #[test]
    fn blank_section_fails_validation() {
        let mut store = MemoryStore::new();
        store
            .set(
                SECTIONS_KEY,
                r#"{"version":1,"items":[{"id":"s","content":"  ","tags":["t"],"timestamp":1}]}"#,
            )
            .unwrap();
        assert!(load_sections(&store).is_empty());
    }

    #[test]
    fn timestamp_settings_default_and_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(load_timestamp_settings(&store), TimestampSettings::default());
        let settings = TimestampSettings {
            enabled: true,
            format: TimestampFormat::Time,
        };
        save_timestamp_settings(&mut store, &settings).unwrap();
        assert_eq!(load_timestamp_settings(&store), settings);

        store.set(TIMESTAMP_SETTINGS_KEY, r#"{"enabled":true,"format":"time"}"#).unwrap();
        assert_eq!(load_timestamp_settings(&store), TimestampSettings::default());
    }

    #[test]
    fn lock_and_pin_values() {
        let mut store = MemoryStore::new();
        assert!(!load_locked(&store));
        save_locked(&mut store, true).unwrap();
        assert_eq!(store.get(LOCKED_KEY).as_deref(), Some("true"));
        assert!(load_locked(&store));

        assert!(load_pin(&store).is_none());
        save_pin(&mut store, Some("1234")).unwrap();
        assert_eq!(load_pin(&store).as_deref(), Some("1234"));
        store.set(PIN_KEY, "12345").unwrap();
        assert!(load_pin(&store).is_none());
        save_pin(&mut store, None).unwrap();
        assert!(store.get(PIN_KEY).is_none());
    }
}
