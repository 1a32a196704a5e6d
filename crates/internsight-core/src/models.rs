//! Domain models for the visit-report submission pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Mutable draft of a visit report, owned by the UI session.
///
/// A draft is created empty when the reporting screen mounts, mutated
/// through user interaction, and reset after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftReport {
    pub visit_date: Option<NaiveDate>,
    pub description: String,
    /// Ordered free-text notes, one per student. The list always holds at
    /// least one entry; the first entry is not removable.
    pub student_notes: Vec<String>,
    /// Locally picked photo file.
    pub photo: Option<PathBuf>,
    /// Staged signature file.
    pub signature: Option<PathBuf>,
}

impl DraftReport {
    pub fn new() -> Self {
        Self {
            visit_date: None,
            description: String::new(),
            student_notes: vec![String::new()],
            photo: None,
            signature: None,
        }
    }

    /// Clear every field back to the initial empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn add_student_note(&mut self) {
        self.student_notes.push(String::new());
    }

    /// Remove a note entry. The first entry is kept regardless of `index`.
    pub fn remove_student_note(&mut self, index: usize) {
        if index == 0 || index >= self.student_notes.len() {
            return;
        }
        self.student_notes.remove(index);
    }

    /// Non-empty notes in their original order, as sent to the backend.
    pub fn filled_student_notes(&self) -> Vec<String> {
        self.student_notes
            .iter()
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }
}

impl Default for DraftReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Placement resolved for the current teacher/host pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRef {
    pub id: i64,
}

/// Server acknowledgement for a submitted report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: i64,
}

/// One row of `GET /laporan/magang/{id}`.
///
/// The backend stores the per-student notes as a JSON array serialized into
/// a string column; it is decoded on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitReportSummary {
    pub id: i64,
    pub tanggal_kunjungan: String,
    pub keterangan: String,
    #[serde(deserialize_with = "notes_from_json_string")]
    pub laporan_siswa: Vec<String>,
    #[serde(default)]
    pub foto: Option<String>,
    #[serde(default)]
    pub tanda_tangan: Option<String>,
}

fn notes_from_json_string<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    serde_json::from_str(&raw).map_err(serde::de::Error::custom)
}

/// One binary part of the multipart submission.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Fully packaged report, ready to be sent as `POST /laporan` multipart.
#[derive(Debug, Clone)]
pub struct ReportUpload {
    pub magang_id: String,
    pub visit_date: NaiveDate,
    pub description: String,
    /// Non-empty notes, order preserved. Serialized as a JSON array string.
    pub student_notes: Vec<String>,
    pub photo: UploadPart,
    pub signature: UploadPart,
}

impl ReportUpload {
    /// `tanggal_kunjungan` field value, ISO `YYYY-MM-DD`.
    pub fn visit_date_field(&self) -> String {
        self.visit_date.format("%Y-%m-%d").to_string()
    }

    /// `laporan_siswa` field value: the notes as a JSON array string.
    pub fn student_notes_field(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.student_notes)
    }
}
