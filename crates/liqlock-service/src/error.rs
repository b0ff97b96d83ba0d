//! Error types for the liqlock service

use liqlock_core::LockerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Engine rejected operation: {0}")]
    Engine(#[from] LockerError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Snapshot schema version {found} is not supported (newest known: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// The engine error behind this failure, if the engine produced it
    pub fn engine_error(&self) -> Option<&LockerError> {
        match self {
            ServiceError::Engine(e) => Some(e),
            _ => None,
        }
    }
}
