use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_LIMIT, TEAM_A_NAME, TEAM_B_NAME};

/// Match format, fixed once the match starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Ends after board 8, or earlier when a team reaches 25.
    #[serde(rename = "EIGHT_BOARDS")]
    EightBoards,
    #[serde(rename = "FIRST_TO_25")]
    FirstTo25,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::EightBoards => "8 Boards (ends at 8 OR at 25)",
            Self::FirstTo25 => "First to 25 (no board limit)",
        }
    }

    pub fn board_limit(self) -> Option<u32> {
        match self {
            Self::EightBoards => Some(BOARD_LIMIT),
            Self::FirstTo25 => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    #[default]
    A,
    B,
}

impl TeamSide {
    pub fn default_name(self) -> &'static str {
        match self {
            Self::A => TEAM_A_NAME,
            Self::B => TEAM_B_NAME,
        }
    }
}

/// Who won a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    A,
    B,
    #[serde(rename = "DRAW")]
    Draw,
}

impl Outcome {
    /// Higher total wins; equal totals draw.
    pub fn from_totals(total_a: u32, total_b: u32) -> Self {
        match total_a.cmp(&total_b) {
            std::cmp::Ordering::Greater => Self::A,
            std::cmp::Ordering::Less => Self::B,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    pub fn side(self) -> Option<TeamSide> {
        match self {
            Self::A => Some(TeamSide::A),
            Self::B => Some(TeamSide::B),
            Self::Draw => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self.side() {
            Some(side) => side.default_name(),
            None => "Draw",
        }
    }
}

impl From<TeamSide> for Outcome {
    fn from(side: TeamSide) -> Self {
        match side {
            TeamSide::A => Self::A,
            TeamSide::B => Self::B,
        }
    }
}

/// A team and its roster of up to two players. Blank names are kept as
/// empty strings so the roster positions stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    #[serde(default)]
    pub players: Vec<String>,
}

impl TeamInfo {
    pub const MAX_PLAYERS: usize = 2;

    pub fn new<I, S>(name: impl Into<String>, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            players: players
                .into_iter()
                .take(Self::MAX_PLAYERS)
                .map(|p| p.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn named_players(&self) -> Vec<&str> {
        self.players
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Players joined with " & ", or the team name when nobody is named.
    pub fn roster_label(&self) -> String {
        let named = self.named_players();
        if named.is_empty() {
            self.name.clone()
        } else {
            named.join(" & ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teams {
    pub team_a: TeamInfo,
    pub team_b: TeamInfo,
}

impl Teams {
    pub fn get(&self, side: TeamSide) -> &TeamInfo {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }
}

impl Default for Teams {
    fn default() -> Self {
        Self {
            team_a: TeamInfo::new(TEAM_A_NAME, ["", ""]),
            team_b: TeamInfo::new(TEAM_B_NAME, ["", ""]),
        }
    }
}

/// Immutable input to the engine, produced by [`crate::setup::MatchSetup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub mode: Mode,
    /// Persistence key for this playthrough. Empty means the legacy
    /// single-match key.
    #[serde(default)]
    pub match_id: String,
    #[serde(default)]
    pub teams: Teams,
}

impl MatchConfig {
    pub fn new(mode: Mode, match_id: impl Into<String>, teams: Teams) -> Self {
        Self {
            mode,
            match_id: match_id.into(),
            teams,
        }
    }

    pub fn team(&self, side: TeamSide) -> &TeamInfo {
        self.teams.get(side)
    }

    /// Named players of the winning team; empty for a draw.
    pub fn winner_players(&self, outcome: Outcome) -> Vec<&str> {
        outcome
            .side()
            .map(|side| self.team(side).named_players())
            .unwrap_or_default()
    }
}

/// Raw result of one board as entered by the scorer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoardInput {
    pub winner: TeamSide,
    pub queen_claimed: bool,
    pub opponent_coins_left: u8,
}

impl BoardInput {
    pub fn new(winner: TeamSide, queen_claimed: bool, opponent_coins_left: u8) -> Self {
        Self {
            winner,
            queen_claimed,
            opponent_coins_left,
        }
    }
}

/// Points for one board with the breakdown the shell renders
/// (queen marker plus one marker per coin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardScore {
    pub points: u32,
    pub queen_allowed: bool,
    pub queen_counted: bool,
    pub coins: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub a: u32,
    pub b: u32,
}

impl Totals {
    pub fn get(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::A => self.a,
            TeamSide::B => self.b,
        }
    }
}

/// One persisted history entry.
///
/// Contract:
/// - `points == (queen_counted ? 3 : 0) + opponent_coins_left`
/// - `queen_counted` implies `queen_claimed && queen_allowed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResult {
    pub board_no: u32,
    pub winner: TeamSide,
    pub points: u32,
    #[serde(default, alias = "redSelected")]
    pub queen_claimed: bool,
    #[serde(default)]
    pub queen_allowed: bool,
    #[serde(default)]
    pub queen_counted: bool,
    #[serde(default, alias = "coinsLeft")]
    pub opponent_coins_left: u8,
    #[serde(default, alias = "totalAfter")]
    pub totals_after: Totals,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameOverStatus {
    pub is_over: bool,
    /// `None` while the match is in progress.
    pub winner: Option<Outcome>,
    pub reason: String,
}

impl GameOverStatus {
    pub fn in_progress() -> Self {
        Self::default()
    }

    pub fn over(winner: Outcome, reason: &str) -> Self {
        Self {
            is_over: true,
            winner: Some(winner),
            reason: reason.to_string(),
        }
    }

    /// "Team A Wins!" / "Match Draw!" once the match is over.
    pub fn headline(&self) -> Option<String> {
        if !self.is_over {
            return None;
        }
        match self.winner? {
            Outcome::Draw => Some("Match Draw!".to_string()),
            outcome => Some(format!("{} Wins!", outcome.label())),
        }
    }
}
