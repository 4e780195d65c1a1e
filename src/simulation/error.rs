//! Error types for the fleet simulation

use thiserror::Error;

use super::types::VehicleId;

/// Errors surfaced by the engine
///
/// Only `Configuration` and `Scenario` are fatal, and only while a world is
/// being built. `UnknownEntity` is reported for logging; operator commands
/// never fail because of it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown vehicle {0}")]
    UnknownEntity(VehicleId),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The sound subsystem is missing, muted or refused playback
#[derive(Debug, Error)]
#[error("audio unavailable: {reason}")]
pub struct AudioUnavailable {
    pub reason: String,
}

impl AudioUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
