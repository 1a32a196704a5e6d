//! Pre-submission draft validation.
//!
//! Rules run in a fixed order and fail fast: the first violated rule is the
//! one reported, and no network call is made for an invalid draft.

use crate::config::DatePolicy;
use crate::error::ValidationError;
use crate::models::DraftReport;

/// Validate a draft against the required-field rules, in order:
/// visit date, description, student notes, photo, signature.
pub fn validate_draft(draft: &DraftReport, policy: &DatePolicy) -> Result<(), ValidationError> {
    let date = draft.visit_date.ok_or(ValidationError::MissingDate)?;
    if !policy.allows(date) {
        return Err(ValidationError::DateOutOfRange { date });
    }

    if draft.description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    if draft.filled_student_notes().is_empty() {
        return Err(ValidationError::NoStudentNotes);
    }

    if draft.photo.is_none() {
        return Err(ValidationError::MissingPhoto);
    }

    if draft.signature.is_none() {
        return Err(ValidationError::MissingSignature);
    }

    Ok(())
}
