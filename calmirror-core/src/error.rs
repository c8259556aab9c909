//! Error types for calmirror.

use thiserror::Error;

/// Errors that can occur while mirroring calendars.
#[derive(Error, Debug)]
pub enum CalMirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Invalid time zone '{0}'")]
    InvalidTimezone(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalMirrorError {
    /// Whether this error means the run cannot start at all.
    ///
    /// Everything else is scoped to a single store request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CalMirrorError::Config(_)
                | CalMirrorError::CalendarNotFound(_)
                | CalMirrorError::InvalidTimezone(_)
                | CalMirrorError::ProviderNotInstalled(_)
        )
    }
}

/// Result type alias for calmirror operations.
pub type CalMirrorResult<T> = Result<T, CalMirrorError>;
