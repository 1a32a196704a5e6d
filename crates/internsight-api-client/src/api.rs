//! Domain methods and the `ReportApi` trait.
//!
//! Endpoint shapes follow the backend contract: `GET /validate-token`,
//! `GET /magang/find`, `POST /laporan` (multipart), `GET /laporan/magang/{id}`,
//! and `POST /login`. All but login carry `Authorization: Bearer <token>`.

use crate::{server_error, transport_error, ApiClient};
use async_trait::async_trait;
use internsight_core::{
    LoginResponse, PlacementRef, ReportError, ReportUpload, SubmitAck, VisitReportSummary,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Backend operations the submission pipeline depends on.
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Whether the backend still accepts the stored token.
    async fn validate_token(&self, token: &str) -> Result<bool, ReportError>;

    /// Resolve the placement for a teacher/host pair.
    async fn find_placement(
        &self,
        token: &str,
        guru_id: &str,
        dudika_id: &str,
    ) -> Result<PlacementRef, ReportError>;

    /// Submit a packaged report. This is the only call using the long
    /// upload timeout.
    async fn submit_report(
        &self,
        token: &str,
        upload: ReportUpload,
    ) -> Result<SubmitAck, ReportError>;

    /// Reports already filed for a placement.
    async fn list_reports(
        &self,
        token: &str,
        magang_id: &str,
    ) -> Result<Vec<VisitReportSummary>, ReportError>;

    /// Authenticate with email and password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ReportError>;
}

#[async_trait]
impl<T: ReportApi + ?Sized> ReportApi for std::sync::Arc<T> {
    async fn validate_token(&self, token: &str) -> Result<bool, ReportError> {
        (**self).validate_token(token).await
    }

    async fn find_placement(
        &self,
        token: &str,
        guru_id: &str,
        dudika_id: &str,
    ) -> Result<PlacementRef, ReportError> {
        (**self).find_placement(token, guru_id, dudika_id).await
    }

    async fn submit_report(
        &self,
        token: &str,
        upload: ReportUpload,
    ) -> Result<SubmitAck, ReportError> {
        (**self).submit_report(token, upload).await
    }

    async fn list_reports(
        &self,
        token: &str,
        magang_id: &str,
    ) -> Result<Vec<VisitReportSummary>, ReportError> {
        (**self).list_reports(token, magang_id).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ReportError> {
        (**self).login(email, password).await
    }
}

/// Assemble the `POST /laporan` multipart form. The text fields are
/// rendered before the binary parts consume the upload.
fn report_form(upload: ReportUpload) -> Result<Form, ReportError> {
    let tanggal = upload.visit_date_field();
    let notes = upload.student_notes_field()?;

    let photo_part = Part::bytes(upload.photo.data)
        .file_name(upload.photo.file_name)
        .mime_str(&upload.photo.content_type)
        .map_err(|e| ReportError::Unexpected(format!("Bad photo MIME type: {}", e)))?;
    let signature_part = Part::bytes(upload.signature.data)
        .file_name(upload.signature.file_name)
        .mime_str(&upload.signature.content_type)
        .map_err(|e| ReportError::Unexpected(format!("Bad signature MIME type: {}", e)))?;

    Ok(Form::new()
        .text("magang_id", upload.magang_id)
        .text("tanggal_kunjungan", tanggal)
        .text("keterangan", upload.description)
        .text("laporan_siswa", notes)
        .part("foto", photo_part)
        .part("tanda_tangan", signature_part))
}

#[derive(Deserialize)]
struct ValidateTokenResponse {
    #[serde(default)]
    valid: bool,
}

#[derive(Deserialize)]
struct ListReportsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Vec<VisitReportSummary>>,
}

#[async_trait]
impl ReportApi for ApiClient {
    async fn validate_token(&self, token: &str) -> Result<bool, ReportError> {
        let response = self
            .client()
            .get(self.build_url("/validate-token"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            // A definite answer from the backend: the token is not accepted.
            tracing::debug!(status = %response.status(), "Token validation rejected");
            return Ok(false);
        }

        let body: ValidateTokenResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Unexpected(format!("Bad validate-token response: {}", e)))?;
        Ok(body.valid)
    }

    async fn find_placement(
        &self,
        token: &str,
        guru_id: &str,
        dudika_id: &str,
    ) -> Result<PlacementRef, ReportError> {
        let response = self
            .client()
            .get(self.build_url("/magang/find"))
            .query(&[("guru_id", guru_id), ("dudika_id", dudika_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ReportError::Unexpected(format!("Bad placement response: {}", e)))
    }

    async fn submit_report(
        &self,
        token: &str,
        upload: ReportUpload,
    ) -> Result<SubmitAck, ReportError> {
        tracing::info!(magang_id = %upload.magang_id, "Submitting visit report");

        let form = report_form(upload)?;

        let response = self
            .client()
            .post(self.build_url("/laporan"))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .multipart(form)
            .timeout(self.upload_timeout())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ReportError::Unexpected(format!("Bad submission response: {}", e)))
    }

    async fn list_reports(
        &self,
        token: &str,
        magang_id: &str,
    ) -> Result<Vec<VisitReportSummary>, ReportError> {
        let response = self
            .client()
            .get(self.build_url(&format!("/laporan/magang/{}", magang_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let body: ListReportsResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Unexpected(format!("Bad report list response: {}", e)))?;

        if body.status.as_deref() == Some("success") {
            Ok(body.data.unwrap_or_default())
        } else {
            Ok(Vec::new())
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ReportError> {
        let response = self
            .client()
            .post(self.build_url("/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ReportError::Unexpected(format!("Bad login response: {}", e)))
    }
}
