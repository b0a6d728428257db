use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinderConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file. If absent, `store.json` beside config.toml is used.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Debounce delay before the page is written, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        AutosaveConfig {
            delay_ms: default_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Title used by the print and markdown exports
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            title: default_title(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_title() -> String {
    "One Page Binder Document".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: BinderConfig = toml::from_str("").unwrap();
        assert!(config.store.path.is_none());
        assert_eq!(config.autosave.delay_ms, 1000);
        assert_eq!(config.export.title, "One Page Binder Document");
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config: BinderConfig = toml::from_str("[autosave]\n\n[store]\npath = \"/tmp/b.json\"\n").unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/tmp/b.json"));
        assert_eq!(config.autosave.delay_ms, 1000);
    }
}
