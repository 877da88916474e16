use std::result::Result as StdResult;

use perk_config::ConfigError;
use perk_core::CoreError;
use thiserror::Error;

/// Failures surfaced by the [`Tracker`](crate::Tracker) facade.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TrackerError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, TrackerError::Core(CoreError::Unauthenticated))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::Core(err) if err.is_not_found())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TrackerError::Core(CoreError::Validation(_)))
    }
}

pub type Result<T> = StdResult<T, TrackerError>;
