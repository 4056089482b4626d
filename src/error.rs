//! Error taxonomy shared by every stage of a session.

use thiserror::Error;

/// Every way a gromit session can end unsuccessfully.
///
/// None of these are retried internally; the session prints a message and
/// hands the error to the process boundary.
#[derive(Debug, Error)]
pub enum GromitError {
    /// A CLI option or config file value is unusable.
    #[error("{0}")]
    ConfigValidation(String),

    /// The requested agent is not one we can talk to.
    #[error("cannot create AI agent for {agent} and model {model}")]
    UnsupportedAgent { agent: String, model: String },

    /// The provider call failed or returned nothing usable. The message is
    /// passed through as-is.
    #[error("{0}")]
    Translation(String),

    /// Reading the user's answer failed (as opposed to an answer we could
    /// not understand, which just re-prompts).
    #[error("error reading your response: {0}")]
    ConfirmationInput(String),

    /// The shell command could not be spawned or exited unsuccessfully.
    #[error("{message}")]
    Execution { message: String, output: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GromitError>;
