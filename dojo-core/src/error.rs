//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum DojoError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The name does not match any registered environment.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// Action index outside of the action space.
    #[error("Invalid action {action}, the number of actions is {n_actions}")]
    InvalidAction {
        /// The given action.
        action: usize,
        /// The number of available actions.
        n_actions: usize,
    },

    /// Dimension of data does not match the one expected by a model or an environment.
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Where the mismatch was found.
        context: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// A batch without samples was given.
    #[error("Empty batch: {0}")]
    EmptyBatch(String),
}
