//! Saving and restoring response state across restarts.
//!
//! The registry's state and enabled snapshots are stored as one
//! [`SavedState`] document, together with the `/click` counts. [`JsonStateStore`] keeps it in a JSON file;
//! [`MemoryStateStore`] keeps it in memory for tests and throwaway sessions.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use amadeus_core::UserId;
use amadeus_framework::{BulkReport, Registry};

use crate::commands::ClickBoard;
use crate::error::{PersistenceError, PersistenceResult};

/// Everything persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    /// Response name → state string.
    #[serde(default)]
    pub responses_states: BTreeMap<String, String>,
    /// Response name → enabled flag.
    #[serde(default)]
    pub responses_enabled: BTreeMap<String, bool>,
    /// Member → times clicked.
    #[serde(default)]
    pub click_db: BTreeMap<UserId, u64>,
}

impl SavedState {
    /// Snapshots `registry` and `clicks`.
    pub fn capture(registry: &Registry, clicks: &ClickBoard) -> Self {
        Self {
            responses_states: registry.snapshot_states(),
            responses_enabled: registry.snapshot_enabled(),
            click_db: clicks.snapshot(),
        }
    }

    /// Replaces the counts in `clicks` with the saved ones.
    pub fn restore_clicks(&self, clicks: &ClickBoard) {
        clicks.restore(&self.click_db);
    }

    /// Seeds `registry`, states first. Unknown names and rejected states are
    /// skipped and reported.
    pub fn apply(&self, registry: &Registry) -> (BulkReport, BulkReport) {
        let states: HashMap<String, String> = self
            .responses_states
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let enabled: HashMap<String, bool> = self
            .responses_enabled
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        (
            registry.bulk_set_states(&states),
            registry.bulk_set_enabled(&enabled),
        )
    }
}

/// Storage for [`SavedState`].
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Returns the saved state, or `None` if nothing was saved yet.
    async fn load(&self) -> PersistenceResult<Option<SavedState>>;

    /// Replaces the saved state.
    async fn save(&self, state: &SavedState) -> PersistenceResult<()>;
}

/// Stores state as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> PersistenceResult<Option<SavedState>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved state");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let state = serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    /// Writes a sibling temp file and renames it over the target, so a crash
    /// mid-write leaves the previous state intact.
    async fn save(&self, state: &SavedState) -> PersistenceResult<()> {
        let json = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), "Saved response state");
        Ok(())
    }
}

/// Keeps state in memory only.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<SavedState>>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `state` already saved.
    pub fn with_state(state: SavedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> Option<SavedState> {
        self.state.lock().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> PersistenceResult<Option<SavedState>> {
        Ok(self.current())
    }

    async fn save(&self, state: &SavedState) -> PersistenceResult<()> {
        *self.state.lock() = Some(state.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amadeus_core::EmojiId;
    use amadeus_framework::{Action, ReplyMode, Response, Trigger};

    fn registry() -> Registry {
        Registry::new()
            .with(Response::send_or_react(
                "Thanks Bot",
                Trigger::contains(["thanks bot"]),
                "ok",
                EmojiId(1),
                ReplyMode::Message,
            ))
            .with(
                Response::random_chance("meow", Trigger::contains(["meow"]), Action::echo(), 0.5)
                    .unwrap(),
            )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested/dir/state.json"));

        let reg = registry();
        reg.set_state("thanks bot", "react").unwrap();
        reg.set_enabled("meow", false).unwrap();
        let clicks = ClickBoard::new();
        clicks.click(UserId(587652588019908629));
        store.save(&SavedState::capture(&reg, &clicks)).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.responses_states["Thanks Bot"], "react");
        assert_eq!(loaded.responses_states["meow"], "0.5");
        assert_eq!(loaded.responses_enabled["meow"], false);
        assert_eq!(loaded.click_db[&UserId(587652588019908629)], 1);

        let restored = ClickBoard::new();
        loaded.restore_clicks(&restored);
        assert_eq!(restored.count(UserId(587652588019908629)), 1);

        let fresh = registry();
        let (states, enabled) = loaded.apply(&fresh);
        assert!(states.is_clean() && enabled.is_clean());
        assert_eq!(fresh.lookup("Thanks Bot").unwrap().state(), "react");
        assert!(!fresh.lookup("meow").unwrap().is_enabled());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = JsonStateStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }

    #[test]
    fn test_partial_document_defaults_missing_maps() {
        let state: SavedState =
            serde_json::from_str(r#"{"responses_enabled": {"meow": false}}"#).unwrap();
        assert!(state.responses_states.is_empty());
        assert!(state.click_db.is_empty());
        assert_eq!(state.responses_enabled.len(), 1);
    }

    #[test]
    fn test_click_db_keys_are_json_strings() {
        let state = SavedState {
            click_db: BTreeMap::from([(UserId(7), 3)]),
            ..Default::default()
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["click_db"]["7"], 3);

        let back: SavedState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_apply_skips_stale_entries() {
        let reg = registry();
        let mut saved = SavedState::default();
        saved
            .responses_states
            .insert("Removed Response".into(), "react".into());
        saved.responses_states.insert("meow".into(), "2".into());
        saved.responses_enabled.insert("Thanks Bot".into(), false);

        let (states, enabled) = saved.apply(&reg);

        assert_eq!(states.skipped.len(), 2);
        assert_eq!(enabled.applied, vec!["Thanks Bot".to_string()]);
        assert_eq!(reg.lookup("meow").unwrap().state(), "0.5");
    }

    #[tokio::test]
    async fn test_memory_store_counts_saves() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store
            .save(&SavedState::capture(&registry(), &ClickBoard::new()))
            .await
            .unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(store.current().is_some());
    }
}
