//! Configuration types.

use std::time::Duration;

use regex::Regex;

use crate::error::ConfigError;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval between engine status polls within a run.
    pub poll_interval: Duration,
    /// Hard cap on status polls per run; the run is abandoned as a timeout
    /// failure once exceeded.
    pub max_poll_attempts: u32,
    /// Interval between scheduler ticks (one claim attempt per tick).
    pub tick_interval: Duration,
    /// A final engine reply with fewer non-blank lines than this is treated
    /// as confirmation-only when resolving against a captured payload.
    pub confirmation_max_lines: usize,
    /// Optional pattern that additionally must match for a short reply to be
    /// treated as confirmation-only. `None` means line count alone decides.
    pub confirmation_pattern: Option<Regex>,
    /// Whether a captured payload may override a confirmation-only reply.
    pub prefer_captured_payload: bool,
    /// Timeout for one search collaborator call.
    pub search_timeout: Duration,
    /// Timeout for one engine HTTP request (poll, submit, message listing).
    pub engine_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 30, // ~60s deadline at the default interval
            tick_interval: Duration::from_secs(30),
            confirmation_max_lines: 3,
            confirmation_pattern: None,
            prefer_captured_payload: true,
            search_timeout: Duration::from_secs(30),
            engine_timeout: Duration::from_secs(30),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(secs) = read_u64("BRIEFSMITH_POLL_INTERVAL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = read_u64("BRIEFSMITH_MAX_POLL_ATTEMPTS")? {
            if attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "BRIEFSMITH_MAX_POLL_ATTEMPTS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            config.max_poll_attempts = attempts as u32;
        }
        if let Some(secs) = read_u64("BRIEFSMITH_TICK_INTERVAL_SECS")? {
            config.tick_interval = Duration::from_secs(secs);
        }
        if let Some(lines) = read_u64("BRIEFSMITH_CONFIRMATION_MAX_LINES")? {
            config.confirmation_max_lines = lines as usize;
        }
        if let Ok(pattern) = std::env::var("BRIEFSMITH_CONFIRMATION_PATTERN") {
            let re = Regex::new(&pattern).map_err(|e| ConfigError::InvalidValue {
                key: "BRIEFSMITH_CONFIRMATION_PATTERN".to_string(),
                message: e.to_string(),
            })?;
            config.confirmation_pattern = Some(re);
        }
        if let Ok(raw) = std::env::var("BRIEFSMITH_PREFER_CAPTURED") {
            config.prefer_captured_payload =
                raw.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                    key: "BRIEFSMITH_PREFER_CAPTURED".to_string(),
                    message: format!("expected true or false, got {raw:?}"),
                })?;
        }
        if let Some(secs) = read_u64("BRIEFSMITH_SEARCH_TIMEOUT_SECS")? {
            config.search_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_u64("BRIEFSMITH_ENGINE_TIMEOUT_SECS")? {
            config.engine_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn read_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected an integer, got {raw:?}"),
            }),
        Err(_) => Ok(None),
    }
}
