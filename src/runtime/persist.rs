//! Resume marker storage

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::host::ResumeStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ResumeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_button: Option<u8>,
}

/// Keeps the marker in a small JSON file so it survives restarts.
/// Write failures are logged and the in-memory value still updates.
pub struct FileResumeStore {
    path: PathBuf,
    state: ResumeState,
}

impl FileResumeStore {
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable resume state {:?}: {}", path, e);
                ResumeState::default()
            })
        } else {
            ResumeState::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    fn persist(&self) {
        if let Err(e) = self.write() {
            warn!("Failed to save resume state to {:?}: {}", self.path, e);
        }
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&self.state)?)?;
        Ok(())
    }
}

impl ResumeStore for FileResumeStore {
    fn load_last_button(&self) -> Option<u8> {
        self.state.last_button
    }

    fn save_last_button(&mut self, button: u8) {
        if self.state.last_button != Some(button) {
            self.state.last_button = Some(button);
            self.persist();
        }
    }

    fn clear_last_button(&mut self) {
        if self.state.last_button.take().is_some() {
            self.persist();
        }
    }
}

/// Marker kept only for the life of the process
#[derive(Debug, Default)]
pub struct MemoryResumeStore {
    last_button: Option<u8>,
}

impl ResumeStore for MemoryResumeStore {
    fn load_last_button(&self) -> Option<u8> {
        self.last_button
    }

    fn save_last_button(&mut self, button: u8) {
        self.last_button = Some(button);
    }

    fn clear_last_button(&mut self) {
        self.last_button = None;
    }
}

/// Either store behind one type so the host need not be generic
pub enum AnyResumeStore {
    File(FileResumeStore),
    Memory(MemoryResumeStore),
}

impl ResumeStore for AnyResumeStore {
    fn load_last_button(&self) -> Option<u8> {
        match self {
            AnyResumeStore::File(s) => s.load_last_button(),
            AnyResumeStore::Memory(s) => s.load_last_button(),
        }
    }

    fn save_last_button(&mut self, button: u8) {
        match self {
            AnyResumeStore::File(s) => s.save_last_button(button),
            AnyResumeStore::Memory(s) => s.save_last_button(button),
        }
    }

    fn clear_last_button(&mut self) {
        match self {
            AnyResumeStore::File(s) => s.clear_last_button(),
            AnyResumeStore::Memory(s) => s.clear_last_button(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tile-deck-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("state.json")
    }

    #[test]
    fn test_marker_survives_reopen() {
        let path = scratch("reopen");
        let mut store = FileResumeStore::open(&path).unwrap();
        assert_eq!(store.load_last_button(), None);
        store.save_last_button(3);

        let reopened = FileResumeStore::open(&path).unwrap();
        assert_eq!(reopened.load_last_button(), Some(3));
    }

    #[test]
    fn test_clear_removes_marker_on_disk() {
        let path = scratch("clear");
        let mut store = FileResumeStore::open(&path).unwrap();
        store.save_last_button(1);
        store.clear_last_button();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{}");
        assert_eq!(FileResumeStore::open(&path).unwrap().load_last_button(), None);
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let path = scratch("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileResumeStore::open(&path).unwrap().load_last_button(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryResumeStore::default();
        store.save_last_button(2);
        assert_eq!(store.load_last_button(), Some(2));
        store.clear_last_button();
        assert_eq!(store.load_last_button(), None);
    }
}
