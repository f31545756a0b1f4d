//! Error types for the Argus pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown robot: {0}")]
    UnknownRobot(String),

    #[error("incomplete action: {0}")]
    IncompleteAction(String),

    #[error("suggestion not found: {0}")]
    SuggestionNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
