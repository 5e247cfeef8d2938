/// Points that end the match in either mode.
pub const TARGET_SCORE: u32 = 25;
/// The queen only counts while the claiming team is at or below this total.
pub const QUEEN_THRESHOLD: u32 = 21;
pub const QUEEN_BONUS: u32 = 3;
/// Opponent coins on the board: 9 of each color.
pub const MAX_COINS: u8 = 9;
/// Board limit in [`crate::types::Mode::EightBoards`].
pub const BOARD_LIMIT: u32 = 8;

pub const REASON_REACHED_TARGET: &str = "Reached 25 points";
pub const REASON_BOARDS_COMPLETED: &str = "Completed 8 boards";

pub const STORAGE_PREFIX: &str = "carrom_score_tracker_";
/// Key suffix used by the single-match layout of the store.
pub const LEGACY_SUFFIX: &str = "v1";

pub const TEAM_A_NAME: &str = "Team A";
pub const TEAM_B_NAME: &str = "Team B";
