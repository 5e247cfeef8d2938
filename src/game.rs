use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::scoring::parse_coins;
use crate::snapshot::{Snapshot, SnapshotCodec, SnapshotStore};
use crate::state::MatchState;
use crate::types::{BoardInput, BoardResult, BoardScore, MatchConfig, Mode, TeamSide};

/// The board being entered but not yet submitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardForm {
    pub winner: TeamSide,
    pub queen_selected: bool,
    /// Raw text from the coin field; normalised on use.
    pub coins_text: String,
}

impl BoardForm {
    pub fn to_input(&self) -> BoardInput {
        BoardInput::new(self.winner, self.queen_selected, parse_coins(&self.coins_text))
    }

    fn clear_board_fields(&mut self) {
        self.queen_selected = false;
        self.coins_text.clear();
    }
}

/// One match in play: config, state, pending form and its persistence.
///
/// Every state change is followed by a best-effort save; a failing store
/// never blocks or rolls back a transition.
pub struct MatchInstance {
    config: MatchConfig,
    state: MatchState,
    form: BoardForm,
    codec: SnapshotCodec,
    store: Box<dyn SnapshotStore>,
    resume_offer: Option<Snapshot>,
}

impl MatchInstance {
    /// Opens a match for `config`. A stored snapshot with progress is held
    /// as a resume offer; the match itself starts fresh until resumed.
    pub fn new(config: MatchConfig, codec: SnapshotCodec, store: Box<dyn SnapshotStore>) -> Self {
        let resume_offer = codec
            .load(store.as_ref(), &config.match_id)
            .filter(Snapshot::has_resumable_progress);
        if resume_offer.is_some() {
            info!(match_id = %config.match_id, "resumable snapshot found");
        }

        Self {
            config,
            state: MatchState::new(),
            form: BoardForm::default(),
            codec,
            store,
            resume_offer,
        }
    }

    pub fn with_default_codec(config: MatchConfig, store: Box<dyn SnapshotStore>) -> Self {
        Self::new(config, SnapshotCodec::new(), store)
    }

    /// Fails with [`MatchError::MissingConfig`] when no match was set up;
    /// the shell should send the user back to mode selection.
    pub fn open(config: Option<MatchConfig>, store: Box<dyn SnapshotStore>) -> Result<Self> {
        let config = config.ok_or(MatchError::MissingConfig)?;
        Ok(Self::with_default_codec(config, store))
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn form(&self) -> &BoardForm {
        &self.form
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Hands the store back, e.g. to reopen the same match later.
    pub fn into_store(self) -> Box<dyn SnapshotStore> {
        self.store
    }

    pub fn set_winner(&mut self, winner: TeamSide) {
        self.form.winner = winner;
    }

    pub fn set_queen_selected(&mut self, selected: bool) {
        self.form.queen_selected = selected;
    }

    pub fn set_coins_text(&mut self, text: impl Into<String>) {
        self.form.coins_text = text.into();
    }

    /// Live score of the pending form against the current totals.
    pub fn preview(&self) -> BoardScore {
        self.state.preview(&self.form.to_input())
    }

    /// Submits the pending form. On success the queen and coin fields are
    /// cleared; the selected winner is kept.
    pub fn submit_board(&mut self) -> Result<BoardResult> {
        let input = self.form.to_input();
        let entry = self.submit(&input)?;
        self.form.clear_board_fields();
        Ok(entry)
    }

    /// Submits an explicit board, bypassing the form.
    pub fn submit(&mut self, input: &BoardInput) -> Result<BoardResult> {
        let entry = self.state.submit_board(self.config.mode, input)?;
        self.persist();
        Ok(entry)
    }

    /// Undoes the last board and pre-selects its winner in the form.
    pub fn undo_last_board(&mut self) -> Result<BoardResult> {
        let undone = self.state.undo_last_board()?;
        self.form.winner = undone.winner;
        self.form.clear_board_fields();
        self.persist();
        Ok(undone)
    }

    pub fn reset_match(&mut self, clear_persisted: bool) {
        self.state.reset();
        self.form = BoardForm::default();
        if clear_persisted {
            self.codec.clear(self.store.as_mut(), &self.config.match_id);
        } else {
            self.persist();
        }
    }

    pub fn resume_offer(&self) -> Option<&Snapshot> {
        self.resume_offer.as_ref()
    }

    pub fn has_resumable_progress(&self) -> bool {
        self.resume_offer.is_some()
    }

    /// Applies the pending resume offer. The live config stays
    /// authoritative; only state fields are taken from the snapshot.
    pub fn resume(&mut self) -> bool {
        let Some(snapshot) = self.resume_offer.take() else {
            return false;
        };

        self.state = snapshot.to_state();
        self.form = BoardForm::default();
        debug!(
            board_no = self.state.board_no(),
            total_a = self.state.total_a(),
            total_b = self.state.total_b(),
            "match resumed"
        );
        self.persist();
        true
    }

    /// Declines the resume offer and wipes the stored snapshot.
    pub fn start_fresh(&mut self) {
        self.resume_offer = None;
        self.reset_match(true);
    }

    /// Writes the current snapshot now. Called after every transition.
    pub fn persist(&mut self) {
        self.codec.save(self.store.as_mut(), &self.config, &self.state);
    }

    /// Headline plus the winners' names once the match is over,
    /// e.g. `("Team A Wins!", "Asha & Ravi")`.
    pub fn winner_announcement(&self) -> Option<(String, String)> {
        let status = self.state.game_over();
        let headline = status.headline()?;
        let outcome = status.winner?;
        let names = self.config.winner_players(outcome).join(" & ");
        Some((headline, names))
    }
}
