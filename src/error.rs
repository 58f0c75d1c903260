//! Engine error taxonomy
//!
//! Off-screen carriers, exhausted cooldowns and simultaneous collisions are
//! normal control flow and never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A run cannot start without at least one question
    #[error("question bank is empty")]
    EmptyQuestionBank,

    /// Input collaborator asked for a lane that does not exist
    #[error("lane index {lane} out of range (lanes: {lanes})")]
    InvalidLaneIndex { lane: usize, lanes: usize },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("malformed question bank: {0}")]
    BankFormat(#[from] serde_json::Error),

    #[error("engine has not been started")]
    NotStarted,
}

impl EngineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }
}
