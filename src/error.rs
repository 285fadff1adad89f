use crate::duel::{Phase, Player, TurnKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WandClashError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Game is already completed")]
    GameOver,

    #[error("Out of turn: expected {expected}, got {actual}")]
    OutOfTurn { expected: Player, actual: Player },

    #[error("Wrong phase: expected {expected}, session is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("No pending attack to counter")]
    NoPendingAttack,

    #[error("Spell '{0}' was already cast by this player")]
    PatternAlreadyUsed(String),

    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    #[error("No spell choice is pending")]
    NoPendingChoice,

    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Session '{0}' already exists")]
    SessionExists(String),

    #[error("Session conflict: expected version {expected}, found {actual}")]
    SessionConflict { expected: u64, actual: u64 },

    #[error("Turn conflict: submitted for {submitted:?}, session is at {current:?}")]
    TurnConflict { submitted: TurnKey, current: TurnKey },

    #[error("Session lock poisoned: {0}")]
    SessionPoisoned(String),
}

pub type WcResult<T> = Result<T, WandClashError>;
