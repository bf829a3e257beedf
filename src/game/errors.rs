use thiserror::Error;

/// Errors surfaced by the tile-walk engine and its storage layer.
///
/// Callers should treat the conflict variants (`TileAlreadyActioned`,
/// `PlaythroughActive`, `UsernameTaken`, `NoActionSelected`) as routine
/// rule rejections to redirect on, not faults; `is_conflict` exists for
/// exactly that split.
#[derive(Debug, Error)]
pub enum GameError {
    /// Underlying sled database error.
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),

    /// Record encode/decode failure.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Filesystem problem while opening or housekeeping the store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced entity does not exist. The payload names it,
    /// e.g. `player: 42` or `tile: 7`.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored record was written by an incompatible schema revision.
    #[error("schema mismatch for {entity}: expected {expected}, found {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// The tile has already consumed its one action.
    #[error("tile {0} has already been actioned")]
    TileAlreadyActioned(u64),

    /// The player already has a playthrough with no end timestamp.
    #[error("playthrough {0} is still active")]
    PlaythroughActive(u64),

    /// A player with that username already exists.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// An action resolution was requested with an empty action value.
    #[error("no action selected")]
    NoActionSelected,

    /// Password hashing or verification failed at the argon2 layer.
    #[error("credential hash failure: {0}")]
    CredentialHash(String),

    /// Invariant violation that indicates a bug rather than bad input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// True for benign rule rejections a host should answer with a
    /// redirect or a polite message rather than a 500.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GameError::TileAlreadyActioned(_)
                | GameError::PlaythroughActive(_)
                | GameError::UsernameTaken(_)
                | GameError::NoActionSelected
        )
    }
}
