pub mod constants;
pub mod error;
pub mod game;
pub mod scoring;
pub mod setup;
pub mod snapshot;
pub mod state;
pub mod types;
pub mod wasm;

pub use error::{MatchError, Result, StoreError};
pub use game::{BoardForm, MatchInstance};
pub use scoring::{parse_coins, score_board};
pub use setup::MatchSetup;
pub use snapshot::{
    DirStore, MemoryStore, Snapshot, SnapshotCodec, SnapshotStore, has_resumable_progress,
};
pub use state::MatchState;
pub use types::{
    BoardInput, BoardResult, BoardScore, GameOverStatus, MatchConfig, Mode, Outcome, TeamInfo,
    TeamSide, Teams, Totals,
};
