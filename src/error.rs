//! Crate-wide error type.

use thiserror::Error;

use crate::cfr::config::ConfigError;

/// Errors that can occur while building or running a solver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A decision state maps to an information set the enumerator never saw.
    #[error("unknown information set `{0}`")]
    UnknownInfoSet(String),

    /// The game reported a different action set for an existing information set.
    #[error("information set `{key}` was created with actions {expected:?} but {found:?} are legal here")]
    InconsistentActions {
        /// Composite information set key.
        key: String,
        /// Labels of the actions recorded at creation.
        expected: Vec<String>,
        /// Labels of the actions reported now.
        found: Vec<String>,
    },

    /// The game returned a state that violates the environment contract.
    #[error("invalid game state: {0}")]
    InvalidState(String),

    /// Enumeration stopped because the tree is larger than the configured bound.
    #[error("game tree exceeds {limit} nodes")]
    TreeTooLarge {
        /// Configured node limit.
        limit: usize,
    },

    /// A checkpoint does not fit the enumerated game.
    #[error("checkpoint does not match this game: {0}")]
    CheckpointMismatch(String),

    /// Filesystem failure (checkpoints, CSV metrics, config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
