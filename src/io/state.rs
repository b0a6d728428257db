use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Per-session view state kept beside the store (`.binder-state.json`).
///
/// This is not part of the store's key space: it only remembers which
/// tags the command line is filtering by between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Selected tag ids, in selection order
    #[serde(default)]
    pub selected_tags: Vec<String>,
}

/// Path of the state file for a given store file
pub fn state_path(store_path: &Path) -> PathBuf {
    let dir = store_path.parent().unwrap_or(Path::new("."));
    dir.join(".binder-state.json")
}

/// Read the state file, `None` when missing or malformed
pub fn read_ui_state(path: &Path) -> Option<UiState> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write the state file
pub fn write_ui_state(path: &Path, state: &UiState) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content)
}
