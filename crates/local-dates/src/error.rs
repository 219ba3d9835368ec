//! Error types for boundary parsing.
//!
//! The resolver core never returns errors — malformed dates degrade to the
//! invalid-moment sentinel instead. These variants only surface when
//! building a [`crate::DateConfig`] or loading a translation catalog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalDateError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid translation catalog: {0}")]
    InvalidCatalog(String),
}

pub type Result<T> = std::result::Result<T, LocalDateError>;
