//! Error types for Briefsmith.

use std::time::Duration;

use uuid::Uuid;

/// Top-level error type for the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Job store errors.
///
/// `InvalidState` is a contract violation (completing or failing a job that is
/// not in progress) and is the only store error callers may treat as fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {id} is {status}, cannot {action}")]
    InvalidState {
        id: Uuid,
        status: String,
        action: String,
    },
}

/// Transport and protocol errors talking to the conversational engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected engine payload: {0}")]
    InvalidResponse(String),

    #[error("Unknown run status from engine: {0}")]
    UnknownStatus(String),
}

/// Search collaborator errors. Never propagated past the tool dispatcher;
/// always converted into a structured tool output.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Search returned status {0}")]
    BadStatus(u16),

    #[error("Search timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed search payload: {0}")]
    InvalidPayload(String),
}

/// Terminal run outcomes other than success.
///
/// `Terminal` means the engine itself reported a dead run; `TimedOut` means
/// the engine never reached a terminal state within the attempt budget. The
/// two are distinct so callers can tell "engine said no" from "engine never
/// answered".
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("engine reported run as {status}")]
    Terminal { status: String },

    #[error("timed out after {attempts} poll attempts")]
    TimedOut { attempts: u32 },
}

/// Result type alias for the orchestrator.
pub type Result<T> = std::result::Result<T, Error>;
