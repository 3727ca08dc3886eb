use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scripts directory {} does not exist", .0.display())]
    MissingScriptsDir(PathBuf),

    #[error("script file {} does not exist", .0.display())]
    MissingScript(PathBuf),

    #[error("error when executing script:\n{stderr}")]
    Script { stderr: String },

    #[error("terminal error: {0}")]
    Tui(String),

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
