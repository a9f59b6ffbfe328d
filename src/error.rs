//! Error types.
//!
//! Generation itself never fails on a hard constraint; these errors cover
//! rejected configuration, rejected input (strict mode) and the background
//! worker.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by the timetabling API.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
    #[error("Input failed validation with {} error(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),
    #[error("A generation is already in flight")]
    GenerationInFlight,
    #[error("Generation worker failed: {0}")]
    WorkerFailed(String),
}

/// Result alias for the timetabling API.
pub type Result<T> = std::result::Result<T, TimetableError>;
