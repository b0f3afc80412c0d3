//! Error types for the protocol_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for protocol_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Completion toggled before weight and sets were entered
    #[error("Day {} exercise {}: enter weight and sets before marking it done", .day + 1, .index + 1)]
    MissingInput { day: usize, index: usize },

    /// Finalization attempted while exercises are still pending
    #[error("Day {} still has {remaining} pending exercise(s)", .day + 1)]
    IncompleteDay { day: usize, remaining: usize },

    /// Edit or finalization attempted on a day that is already closed
    #[error("Day {} is already completed", .day + 1)]
    AlreadyCompleted { day: usize },

    /// Day index outside the 30-day program
    #[error("Day index {0} is outside the program")]
    DayOutOfRange(usize),

    /// Feedback rating outside 1..=5
    #[error("Invalid {field} rating {value}: expected 1-5")]
    InvalidRating { field: &'static str, value: u8 },

    /// A generation response arrived for a request that is no longer wanted
    #[error("Generation response is stale and was discarded")]
    StaleGeneration,

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the validation signals a front end should show as a prompt
    /// rather than treat as a failure.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingInput { .. }
                | Error::IncompleteDay { .. }
                | Error::AlreadyCompleted { .. }
                | Error::InvalidRating { .. }
        )
    }
}
