use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::constants::{TEAM_A_NAME, TEAM_B_NAME};
use crate::error::{MatchError, Result};
use crate::snapshot::{SnapshotCodec, SnapshotStore};
use crate::types::{MatchConfig, Mode, TeamInfo, TeamSide, Teams};

/// Collects mode and rosters before a match starts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub team_a_players: Vec<String>,
    #[serde(default)]
    pub team_b_players: Vec<String>,
}

impl MatchSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    pub fn set_players<I, S>(&mut self, side: TeamSide, players: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = players.into_iter().map(Into::into).collect();
        match side {
            TeamSide::A => self.team_a_players = players,
            TeamSide::B => self.team_b_players = players,
        }
        self
    }

    /// Builds the config for a brand-new match with a fresh match id, and
    /// clears the legacy single-match snapshot from `store`.
    pub fn start<S>(&self, codec: &SnapshotCodec, store: &mut S) -> Result<MatchConfig>
    where
        S: SnapshotStore + ?Sized,
    {
        let mode = self.mode.ok_or(MatchError::NoModeSelected)?;
        let teams = Teams {
            team_a: TeamInfo::new(TEAM_A_NAME, &self.team_a_players),
            team_b: TeamInfo::new(TEAM_B_NAME, &self.team_b_players),
        };
        let config = MatchConfig::new(mode, Uuid::new_v4().to_string(), teams);

        codec.clear_legacy(store);
        info!(match_id = %config.match_id, mode = ?mode, "new match set up");
        Ok(config)
    }
}
