//! Error types module
//!
//! All failures of the submission pipeline are unified under the
//! `ReportError` enum. Each variant knows how it should be presented to the
//! user and what it implies for local state: whether the draft survives the
//! failure and whether the stored session must be cleared.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like connectivity loss
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// A required draft field is missing or empty.
///
/// Variants are listed in the order the rules are checked; validation stops
/// at the first violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Visit date is required")]
    MissingDate,

    #[error("Visit date {date} is outside the allowed range")]
    DateOutOfRange { date: chrono::NaiveDate },

    #[error("Description is required")]
    EmptyDescription,

    #[error("At least one student note is required")]
    NoStudentNotes,

    #[error("A monitoring photo is required")]
    MissingPhoto,

    #[error("A signature is required")]
    MissingSignature,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session expired")]
    SessionExpired,

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Structured failure returned by the backend. The message is surfaced
    /// to the user verbatim.
    #[error("Server error: {0}")]
    Server(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("No placement selected for this session")]
    PlacementNotFound,

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Asset(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Unexpected(format!("JSON error: {}", err))
    }
}

impl ReportError {
    /// Message shown in the blocking user notice.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Validation(v) => v.to_string(),
            ReportError::SessionExpired => "Your session has expired. Please log in again.".into(),
            ReportError::Connectivity(_) => {
                "Could not reach the server. Check your internet connection and try again.".into()
            }
            // Backend message passed through unchanged.
            ReportError::Server(msg) => msg.clone(),
            ReportError::Asset(msg) => msg.clone(),
            ReportError::PlacementNotFound => "Placement data was not found.".into(),
            ReportError::SubmissionInFlight => "A submission is already in progress.".into(),
            ReportError::Unexpected(_) => {
                "Something went wrong while sending the report. Please try again.".into()
            }
        }
    }

    /// Whether the draft survives this failure so the user can retry or edit.
    /// Only a successful submission resets the draft; every error keeps it.
    pub fn preserves_draft(&self) -> bool {
        true
    }

    /// Whether the stored session (token and identifiers) must be cleared,
    /// forcing re-authentication.
    pub fn clears_session(&self) -> bool {
        matches!(self, ReportError::SessionExpired)
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ReportError::Validation(_) => LogLevel::Debug,
            ReportError::SessionExpired => LogLevel::Debug,
            ReportError::Connectivity(_) => LogLevel::Warn,
            ReportError::Server(_) => LogLevel::Warn,
            ReportError::Asset(_) => LogLevel::Error,
            ReportError::PlacementNotFound => LogLevel::Warn,
            ReportError::SubmissionInFlight => LogLevel::Debug,
            ReportError::Unexpected(_) => LogLevel::Error,
        }
    }
}
