//! Mock backend and fixtures for pipeline tests.
//!
//! The mock records every submission it receives and can be switched into
//! failure modes (rejected token, unreachable server, upload timeout, or a
//! submission held open until released).

use async_trait::async_trait;
use internsight_api_client::ReportApi;
use internsight_core::{
    LoginResponse, PlacementRef, ReportError, ReportUpload, SubmitAck, VisitReportSummary,
};
use internsight_core::models::LoginUser;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// 1x1 transparent PNG, used as a staged signature payload.
pub const PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Clone)]
pub enum SubmitBehavior {
    Success,
    ServerError(String),
    /// Simulates the 60 s upload timeout expiring.
    Timeout,
    /// Holds the submission open until the notify fires.
    WaitForRelease(Arc<Notify>),
}

pub struct MockApi {
    pub token_valid: AtomicBool,
    /// Fail token validation with a connectivity error instead of an answer.
    pub validation_unreachable: AtomicBool,
    pub validate_calls: AtomicUsize,
    pub submit_behavior: Mutex<SubmitBehavior>,
    /// Signals that a submission request has reached the backend.
    pub submit_started: Arc<Notify>,
    pub submissions: Mutex<Vec<ReportUpload>>,
    pub placement_id: i64,
    pub reports: Mutex<Vec<VisitReportSummary>>,
    pub login_response: Mutex<LoginResponse>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            token_valid: AtomicBool::new(true),
            validation_unreachable: AtomicBool::new(false),
            validate_calls: AtomicUsize::new(0),
            submit_behavior: Mutex::new(SubmitBehavior::Success),
            submit_started: Arc::new(Notify::new()),
            submissions: Mutex::new(Vec::new()),
            placement_id: 7,
            reports: Mutex::new(Vec::new()),
            login_response: Mutex::new(LoginResponse {
                success: true,
                message: None,
                token: Some("tok-login".to_string()),
                user: Some(LoginUser { id: 3 }),
            }),
        }
    }

    pub fn set_submit_behavior(&self, behavior: SubmitBehavior) {
        *self.submit_behavior.lock().unwrap() = behavior;
    }

    pub fn recorded_submissions(&self) -> Vec<ReportUpload> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportApi for MockApi {
    async fn validate_token(&self, _token: &str) -> Result<bool, ReportError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if self.validation_unreachable.load(Ordering::SeqCst) {
            return Err(ReportError::Connectivity("connection refused".into()));
        }
        Ok(self.token_valid.load(Ordering::SeqCst))
    }

    async fn find_placement(
        &self,
        _token: &str,
        _guru_id: &str,
        _dudika_id: &str,
    ) -> Result<PlacementRef, ReportError> {
        Ok(PlacementRef {
            id: self.placement_id,
        })
    }

    async fn submit_report(
        &self,
        _token: &str,
        upload: ReportUpload,
    ) -> Result<SubmitAck, ReportError> {
        self.submit_started.notify_one();
        let behavior = self.submit_behavior.lock().unwrap().clone();
        match behavior {
            SubmitBehavior::Success => {
                self.submissions.lock().unwrap().push(upload);
                Ok(SubmitAck {
                    status: Some("success".to_string()),
                    message: Some("Laporan berhasil dikirim".to_string()),
                })
            }
            SubmitBehavior::ServerError(message) => Err(ReportError::Server(message)),
            SubmitBehavior::Timeout => Err(ReportError::Connectivity(
                "Request timed out after 60 s".to_string(),
            )),
            SubmitBehavior::WaitForRelease(notify) => {
                notify.notified().await;
                self.submissions.lock().unwrap().push(upload);
                Ok(SubmitAck {
                    status: Some("success".to_string()),
                    message: None,
                })
            }
        }
    }

    async fn list_reports(
        &self,
        _token: &str,
        _magang_id: &str,
    ) -> Result<Vec<VisitReportSummary>, ReportError> {
        Ok(self.reports.lock().unwrap().clone())
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ReportError> {
        Ok(self.login_response.lock().unwrap().clone())
    }
}
