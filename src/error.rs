use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("match is already over")]
    AlreadyOver,

    #[error("no boards to undo")]
    NothingToUndo,

    #[error("no match mode selected")]
    NoModeSelected,

    #[error("no match configuration; return to mode selection")]
    MissingConfig,
}

pub type Result<T> = std::result::Result<T, MatchError>;

/// Failures raised by a [`crate::snapshot::SnapshotStore`] backend.
///
/// These never reach the match engine: the codec logs and swallows them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
