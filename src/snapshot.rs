use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::constants::{LEGACY_SUFFIX, STORAGE_PREFIX};
use crate::error::StoreError;
use crate::state::MatchState;
use crate::types::{BoardResult, GameOverStatus, MatchConfig};

/// String key-value store the codec persists snapshots into.
///
/// Implementations may fail freely; the codec never lets a failure reach
/// the match engine.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key under `root`, for native builds.
///
/// Bytes outside `[A-Za-z0-9_-]` are written as `%XX` in the file name, so
/// distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                file_name.push(char::from(b));
            } else {
                file_name.push_str(&format!("%{b:02X}"));
            }
        }
        self.root.join(format!("{file_name}.json"))
    }
}

impl SnapshotStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Persisted form of a match: its config plus every state field.
///
/// Missing state fields fall back to the starting values so snapshots
/// written by older builds still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub match_config: Option<MatchConfig>,
    #[serde(default = "first_board")]
    pub board_no: u32,
    #[serde(default)]
    pub total_a: u32,
    #[serde(default)]
    pub total_b: u32,
    #[serde(default)]
    pub history: Vec<BoardResult>,
    #[serde(default)]
    pub game_over: GameOverStatus,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub saved_at: u64,
}

fn first_board() -> u32 {
    1
}

impl Snapshot {
    pub fn capture(config: &MatchConfig, state: &MatchState, saved_at: u64) -> Self {
        Self {
            match_config: Some(config.clone()),
            board_no: state.board_no(),
            total_a: state.total_a(),
            total_b: state.total_b(),
            history: state.history().to_vec(),
            game_over: state.game_over().clone(),
            saved_at,
        }
    }

    pub fn to_state(&self) -> MatchState {
        MatchState::restore(
            self.board_no,
            self.total_a,
            self.total_b,
            self.history.clone(),
            self.game_over.clone(),
        )
    }

    pub fn has_resumable_progress(&self) -> bool {
        has_resumable_progress(self)
    }
}

/// True for any snapshot that is not the pristine starting state.
pub fn has_resumable_progress(snapshot: &Snapshot) -> bool {
    snapshot.to_state().has_progress()
}

/// Reads and writes snapshots under `<prefix><match id>`.
///
/// Every operation is best-effort: failures are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotCodec {
    prefix: String,
}

impl SnapshotCodec {
    pub fn new() -> Self {
        Self::with_prefix(STORAGE_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// An empty match id maps to the legacy single-match key.
    pub fn storage_key(&self, match_id: &str) -> String {
        if match_id.is_empty() {
            self.legacy_key()
        } else {
            format!("{}{}", self.prefix, match_id)
        }
    }

    pub fn legacy_key(&self) -> String {
        format!("{}{}", self.prefix, LEGACY_SUFFIX)
    }

    pub fn encode(
        &self,
        config: &MatchConfig,
        state: &MatchState,
        saved_at: u64,
    ) -> Result<String, StoreError> {
        let snapshot = Snapshot::capture(config, state, saved_at);
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// `None` for anything that does not parse as a snapshot.
    pub fn decode(&self, raw: &str) -> Option<Snapshot> {
        match serde_json::from_str(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable snapshot");
                None
            }
        }
    }

    pub fn save<S>(&self, store: &mut S, config: &MatchConfig, state: &MatchState)
    where
        S: SnapshotStore + ?Sized,
    {
        let key = self.storage_key(&config.match_id);
        let result = self
            .encode(config, state, now_millis())
            .and_then(|raw| store.set(&key, &raw));
        match result {
            Ok(()) => debug!(key = %key, board_no = state.board_no(), "snapshot saved"),
            Err(err) => warn!(key = %key, error = %err, "failed to save snapshot"),
        }
    }

    pub fn load<S>(&self, store: &S, match_id: &str) -> Option<Snapshot>
    where
        S: SnapshotStore + ?Sized,
    {
        let key = self.storage_key(match_id);
        match store.get(&key) {
            Ok(Some(raw)) => self.decode(&raw),
            Ok(None) => None,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read snapshot");
                None
            }
        }
    }

    pub fn clear<S>(&self, store: &mut S, match_id: &str)
    where
        S: SnapshotStore + ?Sized,
    {
        self.remove_key(store, &self.storage_key(match_id));
    }

    /// Drops the snapshot left under the single-match key by older builds.
    /// Run once whenever a new match is set up.
    pub fn clear_legacy<S>(&self, store: &mut S)
    where
        S: SnapshotStore + ?Sized,
    {
        self.remove_key(store, &self.legacy_key());
    }

    fn remove_key<S>(&self, store: &mut S, key: &str)
    where
        S: SnapshotStore + ?Sized,
    {
        match store.remove(key) {
            Ok(()) => debug!(key = %key, "snapshot cleared"),
            Err(err) => warn!(key = %key, error = %err, "failed to clear snapshot"),
        }
    }
}

impl Default for SnapshotCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardInput, Mode, Outcome, TeamSide, Teams};

    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("unavailable".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("unavailable".to_string()))
        }
    }

    fn config() -> MatchConfig {
        MatchConfig::new(Mode::EightBoards, "match-1", Teams::default())
    }

    fn played_state() -> MatchState {
        let mut state = MatchState::new();
        state
            .submit_board(Mode::EightBoards, &BoardInput::new(TeamSide::A, true, 4))
            .unwrap();
        state
            .submit_board(Mode::EightBoards, &BoardInput::new(TeamSide::B, false, 2))
            .unwrap();
        state
    }

    #[test]
    fn storage_key_uses_prefix_and_legacy_fallback() {
        let codec = SnapshotCodec::new();

        assert_eq!(codec.storage_key("abc"), "carrom_score_tracker_abc");
        assert_eq!(codec.storage_key(""), "carrom_score_tracker_v1");
        assert_eq!(
            SnapshotCodec::with_prefix("x_").legacy_key(),
            "x_v1".to_string()
        );
    }

    #[test]
    fn save_then_load_restores_state() {
        let codec = SnapshotCodec::new();
        let mut store = MemoryStore::new();
        let state = played_state();

        codec.save(&mut store, &config(), &state);
        let snapshot = codec.load(&store, "match-1").unwrap();

        assert_eq!(snapshot.match_config, Some(config()));
        assert_eq!(snapshot.to_state(), state);
        assert!(snapshot.saved_at > 0);
        assert!(snapshot.has_resumable_progress());
    }

    #[test]
    fn encoded_snapshot_uses_camel_case_fields() {
        let codec = SnapshotCodec::new();
        let raw = codec.encode(&config(), &played_state(), 42).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["matchConfig"]["mode"], "EIGHT_BOARDS");
        assert_eq!(value["matchConfig"]["matchId"], "match-1");
        assert_eq!(value["boardNo"], 3);
        assert_eq!(value["totalA"], 7);
        assert_eq!(value["totalB"], 2);
        assert_eq!(value["history"][0]["totalsAfter"]["a"], 7);
        assert_eq!(value["history"][1]["opponentCoinsLeft"], 2);
        assert_eq!(value["gameOver"]["isOver"], false);
        assert!(value["gameOver"]["winner"].is_null());
        assert_eq!(value["savedAt"], 42);
    }

    #[test]
    fn load_missing_or_corrupt_returns_none() {
        let codec = SnapshotCodec::new();
        let mut store = MemoryStore::new();

        assert_eq!(codec.load(&store, "match-1"), None);

        store
            .set(&codec.storage_key("match-1"), "{not json")
            .unwrap();
        assert_eq!(codec.load(&store, "match-1"), None);

        store
            .set(&codec.storage_key("match-1"), r#"{"history":"nope"}"#)
            .unwrap();
        assert_eq!(codec.load(&store, "match-1"), None);
    }

    #[test]
    fn decode_fills_missing_fields_with_defaults() {
        let snapshot = SnapshotCodec::new().decode(r#"{"totalB":4}"#).unwrap();

        assert_eq!(snapshot.match_config, None);
        assert_eq!(snapshot.board_no, 1);
        assert_eq!(snapshot.total_b, 4);
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.game_over.is_over);
        assert!(has_resumable_progress(&snapshot));
    }

    #[test]
    fn pristine_snapshot_is_not_resumable() {
        let snapshot = Snapshot::capture(&config(), &MatchState::new(), 1);

        assert!(!has_resumable_progress(&snapshot));
    }

    #[test]
    fn each_progress_signal_makes_snapshot_resumable() {
        let pristine = Snapshot::capture(&config(), &MatchState::new(), 1);

        let later_board = Snapshot {
            board_no: 2,
            ..pristine.clone()
        };
        let scored = Snapshot {
            total_a: 1,
            ..pristine.clone()
        };
        let finished = Snapshot {
            game_over: GameOverStatus::over(Outcome::Draw, "Completed 8 boards"),
            ..pristine.clone()
        };
        let with_history = Snapshot::capture(&config(), &played_state(), 1);

        for snapshot in [later_board, scored, finished, with_history] {
            assert!(has_resumable_progress(&snapshot));
        }
    }

    #[test]
    fn snapshot_progress_matches_restored_state() {
        let pristine = Snapshot::capture(&config(), &MatchState::new(), 1);
        let board_zero = Snapshot {
            board_no: 0,
            ..pristine.clone()
        };
        let played = Snapshot::capture(&config(), &played_state(), 1);

        for snapshot in [pristine, board_zero, played] {
            assert_eq!(
                has_resumable_progress(&snapshot),
                snapshot.to_state().has_progress()
            );
        }
    }

    #[test]
    fn clear_removes_snapshot_and_legacy_key() {
        let codec = SnapshotCodec::new();
        let mut store = MemoryStore::new();
        store.set(&codec.legacy_key(), "{}").unwrap();
        codec.save(&mut store, &config(), &played_state());

        codec.clear(&mut store, "match-1");
        assert!(!store.contains_key(&codec.storage_key("match-1")));
        assert!(store.contains_key(&codec.legacy_key()));

        codec.clear_legacy(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn failing_store_is_swallowed() {
        let codec = SnapshotCodec::new();
        let mut store = BrokenStore;

        codec.save(&mut store, &config(), &played_state());
        codec.clear(&mut store, "match-1");
        codec.clear_legacy(&mut store);

        assert_eq!(codec.load(&store, "match-1"), None);
    }

    #[test]
    fn dir_store_round_trips_and_ignores_missing_keys() {
        let root = std::env::temp_dir().join(format!("carrom_dir_store_{}", std::process::id()));
        let mut store = DirStore::new(root.clone());

        assert_eq!(store.get("carrom_score_tracker_a/b").unwrap(), None);
        store.set("carrom_score_tracker_a/b", "payload").unwrap();
        assert_eq!(
            store.get("carrom_score_tracker_a/b").unwrap().as_deref(),
            Some("payload")
        );
        assert!(root.join("carrom_score_tracker_a%2Fb.json").exists());

        store.set("carrom_score_tracker_a_b", "other").unwrap();
        assert_eq!(
            store.get("carrom_score_tracker_a/b").unwrap().as_deref(),
            Some("payload")
        );
        assert_eq!(
            store.get("carrom_score_tracker_a_b").unwrap().as_deref(),
            Some("other")
        );
        store.remove("carrom_score_tracker_a_b").unwrap();

        store.remove("carrom_score_tracker_a/b").unwrap();
        store.remove("carrom_score_tracker_a/b").unwrap();
        assert_eq!(store.get("carrom_score_tracker_a/b").unwrap(), None);

        let _ = fs::remove_dir_all(&root);
    }
}
