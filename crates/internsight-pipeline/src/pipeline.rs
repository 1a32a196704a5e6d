//! The visit-report submission pipeline.
//!
//! Ordering contract for `submit`: draft validation (no network), in-flight
//! guard, session validation, placement lookup, photo preparation, signature
//! re-check, multipart upload, then reset-and-cleanup on success. On any
//! failure the draft is left untouched so the user can edit and resubmit;
//! only a rejected token additionally clears the stored session.

use internsight_api_client::ReportApi;
use internsight_core::{
    session_keys, validate_draft, DraftReport, PipelineConfig, ReportError, SubmitAck,
    VisitReportSummary,
};
use internsight_core::models::{ReportUpload, UploadPart};
use internsight_processing::prepare_photo;
use internsight_storage::{SessionStore, SignatureStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;

pub struct ReportSubmissionPipeline<A, S> {
    api: A,
    session: S,
    signatures: SignatureStore,
    config: PipelineConfig,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<A: ReportApi, S: SessionStore> ReportSubmissionPipeline<A, S> {
    pub fn new(api: A, session: S, config: PipelineConfig) -> Self {
        let signatures = SignatureStore::new(&config.storage_root);
        Self {
            api,
            session,
            signatures,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn signatures(&self) -> &SignatureStore {
        &self.signatures
    }

    async fn session_get(&self, key: &str) -> Result<Option<String>, ReportError> {
        self.session
            .get(key)
            .await
            .map_err(|e| ReportError::Unexpected(format!("Session store error: {}", e)))
    }

    /// Authenticate and persist the token and teacher id.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ReportError> {
        let response = self.api.login(email, password).await?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Invalid email or password".to_string());
            return Err(ReportError::Server(message));
        }

        let token = response
            .token
            .ok_or_else(|| ReportError::Unexpected("Login response missing token".into()))?;
        let user = response
            .user
            .ok_or_else(|| ReportError::Unexpected("Login response missing user".into()))?;
        let guru_id = user.id.to_string();

        self.session
            .multi_set(&[
                (session_keys::AUTH_TOKEN, token.as_str()),
                (session_keys::GURU_ID, guru_id.as_str()),
                (session_keys::CURRENT_LOGGED_GURU_ID, guru_id.as_str()),
            ])
            .await
            .map_err(|e| ReportError::Unexpected(format!("Session store error: {}", e)))?;

        tracing::info!(guru_id = %guru_id, "Signed in");
        Ok(())
    }

    /// Clear the stored session and report it as expired.
    async fn expire_session(&self) -> ReportError {
        if let Err(e) = self.session.multi_remove(&session_keys::ALL).await {
            tracing::warn!(error = %e, "Failed to clear session keys");
        }
        tracing::warn!("Session expired, re-authentication required");
        ReportError::SessionExpired
    }

    /// Confirm a stored token exists and the backend still accepts it.
    ///
    /// A connectivity failure during validation preserves the session so
    /// the user can retry without logging in again; a definite rejection
    /// clears it.
    pub async fn ensure_session(&self) -> Result<String, ReportError> {
        let token = match self.session_get(session_keys::AUTH_TOKEN).await? {
            Some(token) if !token.is_empty() => token,
            _ => return Err(self.expire_session().await),
        };

        match self.api.validate_token(&token).await {
            Ok(true) => Ok(token),
            Ok(false) => Err(self.expire_session().await),
            Err(err @ ReportError::Connectivity(_)) => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "Token validation failed, treating as rejection");
                Err(self.expire_session().await)
            }
        }
    }

    /// Resolve the placement for the stored teacher/host pair and remember
    /// its id for submission.
    pub async fn resolve_placement(&self) -> Result<i64, ReportError> {
        let token = self.ensure_session().await?;

        let guru_id = match self.session_get(session_keys::CURRENT_LOGGED_GURU_ID).await? {
            Some(id) => id,
            None => self
                .session_get(session_keys::GURU_ID)
                .await?
                .ok_or(ReportError::PlacementNotFound)?,
        };
        let dudika_id = self
            .session_get(session_keys::SELECTED_DUDIKA_ID)
            .await?
            .ok_or(ReportError::PlacementNotFound)?;

        let placement = self.api.find_placement(&token, &guru_id, &dudika_id).await?;

        let id = placement.id.to_string();
        self.session
            .set(session_keys::CURRENT_MAGANG_ID, &id)
            .await
            .map_err(|e| ReportError::Unexpected(format!("Session store error: {}", e)))?;

        tracing::debug!(magang_id = %id, "Placement resolved");
        Ok(placement.id)
    }

    /// Stage a captured signature payload and record its path on the draft.
    pub async fn stage_signature(
        &self,
        draft: &mut DraftReport,
        base64_payload: &str,
    ) -> Result<PathBuf, ReportError> {
        let path = self.signatures.stage(base64_payload).await?;
        draft.signature = Some(path.clone());
        Ok(path)
    }

    /// Validate, package, and submit a draft report.
    ///
    /// On success the draft is reset to empty and the staged signature file
    /// is deleted. On any failure the draft is preserved; no retry happens
    /// automatically.
    pub async fn submit(&self, draft: &mut DraftReport) -> Result<SubmitAck, ReportError> {
        validate_draft(draft, &self.config.date_policy)?;

        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(ReportError::SubmissionInFlight)?;

        let token = self.ensure_session().await?;

        let magang_id = match self.session_get(session_keys::CURRENT_MAGANG_ID).await? {
            Some(id) => id,
            None => self
                .session_get(session_keys::SELECTED_MAGANG_ID)
                .await?
                .ok_or(ReportError::PlacementNotFound)?,
        };

        // Validated above; the lets only destructure.
        let Some(visit_date) = draft.visit_date else {
            return Err(ReportError::Validation(
                internsight_core::ValidationError::MissingDate,
            ));
        };
        let Some(photo_path) = draft.photo.clone() else {
            return Err(ReportError::Validation(
                internsight_core::ValidationError::MissingPhoto,
            ));
        };
        let Some(signature_path) = draft.signature.clone() else {
            return Err(ReportError::Validation(
                internsight_core::ValidationError::MissingSignature,
            ));
        };

        let photo = prepare_photo(
            &photo_path,
            &self.config.compression_ladder,
            self.config.photo_ceiling_bytes(),
        )
        .await?;

        // Re-check immediately before packaging: a missing signature file is
        // a hard failure, distinct from any network failure.
        if !self.signatures.exists(&signature_path).await {
            return Err(ReportError::Asset(format!(
                "Signature file not found: {}",
                signature_path.display()
            )));
        }
        let signature_data = fs::read(&signature_path).await.map_err(|e| {
            ReportError::Asset(format!(
                "Failed to read signature {}: {}",
                signature_path.display(),
                e
            ))
        })?;
        let signature_name = signature_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("signature.png")
            .to_string();

        let upload = ReportUpload {
            magang_id,
            visit_date,
            description: draft.description.clone(),
            student_notes: draft.filled_student_notes(),
            photo: UploadPart {
                data: photo.data,
                file_name: photo.file_name,
                content_type: photo.content_type,
            },
            signature: UploadPart {
                data: signature_data,
                file_name: signature_name,
                content_type: "image/png".to_string(),
            },
        };

        let ack = self.api.submit_report(&token, upload).await?;

        // Success: local cleanup. A failed delete is logged, never surfaced.
        if let Err(e) = self.signatures.remove(&signature_path).await {
            tracing::warn!(error = %e, "Failed to delete staged signature after submission");
        }
        draft.reset();
        tracing::info!("Visit report submitted");

        Ok(ack)
    }

    /// End-of-session cleanup: sweep every file in the signature staging
    /// directory. Best-effort; failures are logged by the store.
    pub async fn teardown(&self) -> usize {
        self.signatures.sweep().await
    }

    /// Reports filed for the current placement, padded with empty slots up
    /// to the fixed display length.
    pub async fn reports_for_display(
        &self,
        slots: usize,
    ) -> Result<Vec<Option<VisitReportSummary>>, ReportError> {
        let token = self.ensure_session().await?;
        let magang_id = self
            .session_get(session_keys::CURRENT_MAGANG_ID)
            .await?
            .ok_or(ReportError::PlacementNotFound)?;

        let reports = self.api.list_reports(&token, &magang_id).await?;
        let slotted = reports.into_iter().map(Some).collect();
        Ok(internsight_core::pad_with(slotted, slots, None))
    }
}
