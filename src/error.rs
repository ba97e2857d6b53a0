use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures at the external solver boundary.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("solver binary {binary} could not be started: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("solver exited with {status}: {stderr}")]
    Exit { status: std::process::ExitStatus, stderr: String },

    #[error("solver I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable solution file {path}: {message}")]
    Solution { path: PathBuf, message: String },

    #[error("embedded solver failed: {0}")]
    Backend(String),

    #[error("solver worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("optimization model too large: {variables} variables exceeds the limit of {limit}")]
    ModelTooLarge { variables: usize, limit: usize },
}
