use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::{MatchError, StoreError};
use crate::game::MatchInstance;
use crate::setup::MatchSetup;
use crate::snapshot::{SnapshotCodec, SnapshotStore};
use crate::types::{BoardResult, BoardScore, GameOverStatus, MatchConfig, Mode, TeamSide, Teams};

#[wasm_bindgen]
extern "C" {
    /// Anything shaped like `window.localStorage`.
    pub type JsStorage;

    #[wasm_bindgen(method, catch, js_name = getItem)]
    fn get_item(this: &JsStorage, key: &str) -> Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setItem)]
    fn set_item(this: &JsStorage, key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeItem)]
    fn remove_item(this: &JsStorage, key: &str) -> Result<(), JsValue>;
}

struct JsStore(JsStorage);

impl SnapshotStore for JsStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get_item(key).map_err(js_store_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.set_item(key, value).map_err(js_store_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.remove_item(key).map_err(js_store_error)
    }
}

fn js_store_error(err: JsValue) -> StoreError {
    StoreError::Backend(format!("{err:?}"))
}

fn to_js_error(err: MatchError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Plain JS objects with `null` for `None`, the shape `JSON.parse` gives.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Config as the shell holds it: the mode may still be unset.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigDraft {
    #[serde(default)]
    mode: Option<Mode>,
    #[serde(default)]
    match_id: String,
    #[serde(default)]
    teams: Teams,
}

impl ConfigDraft {
    fn into_config(self) -> Option<MatchConfig> {
        let mode = self.mode?;
        Some(MatchConfig::new(mode, self.match_id, self.teams))
    }
}

fn parse_side(side: &str) -> Result<TeamSide, JsValue> {
    match side {
        "A" | "a" => Ok(TeamSide::A),
        "B" | "b" => Ok(TeamSide::B),
        other => Err(JsValue::from_str(&format!("unknown team side: {other}"))),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchView<'a> {
    board_no: u32,
    total_a: u32,
    total_b: u32,
    history: &'a [BoardResult],
    game_over: &'a GameOverStatus,
    /// "Team A Wins!" / "Match Draw!", `null` while in progress.
    headline: Option<String>,
    /// Winning players joined with " & "; empty for a draw.
    winner_names: Option<String>,
    preview: BoardScore,
    mode_label: &'static str,
    team_a_label: String,
    team_b_label: String,
    has_resumable_progress: bool,
}

/// The pending resume offer as the shell's prompt shows it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResumeOfferView {
    saved_at: f64,
    board_no: u32,
    total_a: u32,
    total_b: u32,
    is_over: bool,
}

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Builds a new match config from `{ mode, teamAPlayers, teamBPlayers }`
/// and clears the legacy snapshot in `storage`.
#[wasm_bindgen]
pub fn start_match(setup: JsValue, storage: JsStorage) -> Result<JsValue, JsValue> {
    let setup: MatchSetup = serde_wasm_bindgen::from_value(setup)?;
    let mut store = JsStore(storage);
    let config = setup
        .start(&SnapshotCodec::new(), &mut store)
        .map_err(to_js_error)?;
    to_js(&config)
}

#[wasm_bindgen]
pub struct WasmMatch {
    inner: MatchInstance,
}

#[wasm_bindgen]
impl WasmMatch {
    /// Errors with the missing-config message when no mode is set; the shell
    /// should route back to mode selection.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, storage: JsStorage) -> Result<WasmMatch, JsValue> {
        let draft: ConfigDraft = serde_wasm_bindgen::from_value(config)?;
        let inner = MatchInstance::open(draft.into_config(), Box::new(JsStore(storage)))
            .map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Current state, live preview and labels for rendering.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let config = self.inner.config();
        let state = self.inner.state();
        let announcement = self.inner.winner_announcement();
        let (headline, winner_names) = match announcement {
            Some((headline, names)) => (Some(headline), Some(names)),
            None => (None, None),
        };
        to_js(&MatchView {
            board_no: state.board_no(),
            total_a: state.total_a(),
            total_b: state.total_b(),
            history: state.history(),
            game_over: state.game_over(),
            headline,
            winner_names,
            preview: self.inner.preview(),
            mode_label: config.mode.label(),
            team_a_label: config.teams.team_a.roster_label(),
            team_b_label: config.teams.team_b.roster_label(),
            has_resumable_progress: self.inner.has_resumable_progress(),
        })
    }

    pub fn preview(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.preview())
    }

    pub fn set_winner(&mut self, side: &str) -> Result<(), JsValue> {
        self.inner.set_winner(parse_side(side)?);
        Ok(())
    }

    pub fn set_queen_selected(&mut self, selected: bool) {
        self.inner.set_queen_selected(selected);
    }

    pub fn set_coins(&mut self, text: &str) {
        self.inner.set_coins_text(text);
    }

    /// `false` when the match is already over.
    pub fn submit_board(&mut self) -> bool {
        self.inner.submit_board().is_ok()
    }

    /// `false` when there is nothing to undo.
    pub fn undo_last_board(&mut self) -> bool {
        self.inner.undo_last_board().is_ok()
    }

    pub fn reset_match(&mut self, clear_persisted: bool) {
        self.inner.reset_match(clear_persisted);
    }

    pub fn has_resumable_progress(&self) -> bool {
        self.inner.has_resumable_progress()
    }

    /// `{ savedAt, boardNo, totalA, totalB, isOver }` of the stored match,
    /// or `null` when there is nothing to resume.
    pub fn resume_offer(&self) -> Result<JsValue, JsValue> {
        match self.inner.resume_offer() {
            Some(snapshot) => to_js(&ResumeOfferView {
                saved_at: snapshot.saved_at as f64,
                board_no: snapshot.board_no,
                total_a: snapshot.total_a,
                total_b: snapshot.total_b,
                is_over: snapshot.game_over.is_over,
            }),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn resume(&mut self) -> bool {
        self.inner.resume()
    }

    pub fn start_fresh(&mut self) {
        self.inner.start_fresh();
    }

    pub fn winner_selection(&self) -> String {
        match self.inner.form().winner {
            TeamSide::A => "A".to_string(),
            TeamSide::B => "B".to_string(),
        }
    }
}
