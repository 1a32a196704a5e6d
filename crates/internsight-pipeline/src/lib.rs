//! InternSight Report Submission Pipeline
//!
//! Composes draft validation, session validation, asset staging, photo
//! compression, and the multipart upload into the single submission flow
//! the reporting screen drives. See `ReportSubmissionPipeline`.

pub mod pipeline;

pub use pipeline::ReportSubmissionPipeline;
