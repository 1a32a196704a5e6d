//! InternSight Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! validation rules shared across all InternSight components.

pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod session_keys;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::{CompressionStep, DatePolicy, PipelineConfig};
pub use display::pad_with;
pub use error::{LogLevel, ReportError, ValidationError};
pub use models::{
    DraftReport, LoginResponse, PlacementRef, ReportUpload, SubmitAck, UploadPart,
    VisitReportSummary,
};
pub use validation::validate_draft;
