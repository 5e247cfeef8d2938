use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::{REASON_BOARDS_COMPLETED, REASON_REACHED_TARGET, TARGET_SCORE};
use crate::error::{MatchError, Result};
use crate::scoring::score_board;
use crate::types::{
    BoardInput, BoardResult, BoardScore, GameOverStatus, Mode, Outcome, TeamSide, Totals,
};

/// Running state of one match.
///
/// Contract:
/// - `total_a`/`total_b` equal the summed points of the history entries won
///   by each side.
/// - `board_no == history.len() + 1` while the match is not over.
/// - Both totals stay below 25 unless the match is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    board_no: u32,
    total_a: u32,
    total_b: u32,
    history: Vec<BoardResult>,
    game_over: GameOverStatus,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            board_no: 1,
            total_a: 0,
            total_b: 0,
            history: Vec::new(),
            game_over: GameOverStatus::in_progress(),
        }
    }

    /// Rebuilds a state from persisted fields, taken as stored. Arithmetic on
    /// the result saturates, so corrupt totals cannot overflow.
    pub fn restore(
        board_no: u32,
        total_a: u32,
        total_b: u32,
        history: Vec<BoardResult>,
        game_over: GameOverStatus,
    ) -> Self {
        Self {
            board_no: board_no.max(1),
            total_a,
            total_b,
            history,
            game_over,
        }
    }

    pub fn board_no(&self) -> u32 {
        self.board_no
    }

    pub fn total_a(&self) -> u32 {
        self.total_a
    }

    pub fn total_b(&self) -> u32 {
        self.total_b
    }

    pub fn totals(&self) -> Totals {
        Totals {
            a: self.total_a,
            b: self.total_b,
        }
    }

    pub fn total_for(&self, side: TeamSide) -> u32 {
        self.totals().get(side)
    }

    pub fn history(&self) -> &[BoardResult] {
        &self.history
    }

    pub fn game_over(&self) -> &GameOverStatus {
        &self.game_over
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_over
    }

    /// Anything other than the pristine starting state.
    pub fn has_progress(&self) -> bool {
        !self.history.is_empty()
            || self.board_no > 1
            || self.total_a > 0
            || self.total_b > 0
            || self.game_over.is_over
    }

    /// Scores `input` against the current totals without applying it.
    pub fn preview(&self, input: &BoardInput) -> BoardScore {
        score_board(input, self.total_for(input.winner))
    }

    /// Applies one board. Fails with [`MatchError::AlreadyOver`], leaving the
    /// state untouched, once the match has ended.
    pub fn submit_board(&mut self, mode: Mode, input: &BoardInput) -> Result<BoardResult> {
        if self.game_over.is_over {
            return Err(MatchError::AlreadyOver);
        }

        let score = self.preview(input);
        match input.winner {
            TeamSide::A => self.total_a = self.total_a.saturating_add(score.points),
            TeamSide::B => self.total_b = self.total_b.saturating_add(score.points),
        }

        let board_no = self.board_no;
        let entry = BoardResult {
            board_no,
            winner: input.winner,
            points: score.points,
            queen_claimed: input.queen_claimed,
            queen_allowed: score.queen_allowed,
            queen_counted: score.queen_counted,
            opponent_coins_left: score.coins,
            totals_after: self.totals(),
        };
        self.history.push(entry.clone());
        debug!(
            board_no,
            winner = ?input.winner,
            points = score.points,
            total_a = self.total_a,
            total_b = self.total_b,
            "board submitted"
        );

        match self.end_condition(mode, input.winner, board_no) {
            Some(status) => {
                info!(winner = ?status.winner, reason = %status.reason, "match over");
                self.game_over = status;
            }
            None => self.board_no = self.board_no.saturating_add(1),
        }

        Ok(entry)
    }

    /// Removes the last board and rebuilds totals and board number from the
    /// remaining history. Always reopens the match.
    pub fn undo_last_board(&mut self) -> Result<BoardResult> {
        let undone = self.history.pop().ok_or(MatchError::NothingToUndo)?;

        let totals = totals_from_history(&self.history);
        self.total_a = totals.a;
        self.total_b = totals.b;
        self.board_no = self.history.last().map_or(1, |last| last.board_no.saturating_add(1));
        self.game_over = GameOverStatus::in_progress();

        debug!(
            board_no = undone.board_no,
            total_a = self.total_a,
            total_b = self.total_b,
            "board undone"
        );
        Ok(undone)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("match reset");
    }

    fn end_condition(&self, mode: Mode, scorer: TeamSide, board_no: u32) -> Option<GameOverStatus> {
        let a_reached = self.total_a >= TARGET_SCORE;
        let b_reached = self.total_b >= TARGET_SCORE;
        if a_reached && b_reached {
            warn!(
                total_a = self.total_a,
                total_b = self.total_b,
                "both teams at or above {TARGET_SCORE}; awarding the board's scorer"
            );
        }

        let reached = match (a_reached, b_reached) {
            (true, true) => Some(scorer),
            (true, false) => Some(TeamSide::A),
            (false, true) => Some(TeamSide::B),
            (false, false) => None,
        };
        if let Some(side) = reached {
            return Some(GameOverStatus::over(side.into(), REASON_REACHED_TARGET));
        }

        if mode.board_limit() == Some(board_no) {
            return Some(GameOverStatus::over(
                Outcome::from_totals(self.total_a, self.total_b),
                REASON_BOARDS_COMPLETED,
            ));
        }

        None
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sums points per side.
pub fn totals_from_history(history: &[BoardResult]) -> Totals {
    history.iter().fold(Totals::default(), |mut acc, entry| {
        match entry.winner {
            TeamSide::A => acc.a = acc.a.saturating_add(entry.points),
            TeamSide::B => acc.b = acc.b.saturating_add(entry.points),
        }
        acc
    })
}
