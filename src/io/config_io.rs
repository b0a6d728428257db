use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BinderConfig;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{key} is out of range: {value}")]
    OutOfRange { key: &'static str, value: u64 },
}

/// Config directory, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"))
        .join("binder")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
/// A missing file yields defaults and an empty document.
pub fn read_config(path: &Path) -> Result<(BinderConfig, toml_edit::DocumentMut), ConfigError> {
    if !path.exists() {
        return Ok((BinderConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: BinderConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Resolve the store file: explicit override, then config, then the
/// default beside config.toml.
pub fn resolve_store_path(config: &BinderConfig, override_path: Option<&str>, config_file: &Path) -> PathBuf {
    if let Some(p) = override_path {
        return PathBuf::from(p);
    }
    if let Some(p) = &config.store.path {
        return PathBuf::from(p);
    }
    config_file
        .parent()
        .map(|d| d.join("store.json"))
        .unwrap_or_else(|| PathBuf::from("store.json"))
}

fn ensure_table(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

/// Set `[store] path`
pub fn set_store_path(doc: &mut toml_edit::DocumentMut, path: &str) {
    ensure_table(doc, "store");
    doc["store"]["path"] = toml_edit::value(path);
}

/// Set `[autosave] delay_ms`. TOML integers are signed, so values above
/// `i64::MAX` are refused and the document is left untouched.
pub fn set_autosave_delay(doc: &mut toml_edit::DocumentMut, delay_ms: u64) -> Result<(), ConfigError> {
    let value = i64::try_from(delay_ms).map_err(|_| ConfigError::OutOfRange {
        key: "autosave.delay_ms",
        value: delay_ms,
    })?;
    ensure_table(doc, "autosave");
    doc["autosave"]["delay_ms"] = toml_edit::value(value);
    Ok(())
}

/// Set `[export] title`
pub fn set_export_title(doc: &mut toml_edit::DocumentMut, title: &str) {
    ensure_table(doc, "export");
    doc["export"]["title"] = toml_edit::value(title);
}
