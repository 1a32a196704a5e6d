//! Configuration module
//!
//! Pipeline settings with environment overrides. Defaults match the observed
//! production values: 10 s timeout for lightweight calls, 60 s for the
//! multipart upload, and a 5120 KB photo ceiling with a three-step
//! compression ladder.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

const METADATA_TIMEOUT_SECS: u64 = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 60;
const PHOTO_CEILING_KB: u64 = 5120;

/// One attempt of the photo compression ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStep {
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// Output width cap in pixels; images are never upscaled.
    pub max_width: u32,
}

/// Allowed range for the visit date.
///
/// The shipped app pins both bounds to "today". Whether that is business
/// policy or an accident is unresolved, so the range is configurable rather
/// than hardcoded. `TodayOnly` reads the current local date each time a
/// date is checked, so a session kept open past midnight accepts the new
/// day without rebuilding the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// No restriction on the visit date.
    #[default]
    Unrestricted,
    /// Only the current local date, evaluated at check time.
    TodayOnly,
    /// Inclusive bounds; `None` leaves that side open.
    Range {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
}

impl DatePolicy {
    pub fn today_only() -> Self {
        Self::TodayOnly
    }

    pub fn unrestricted() -> Self {
        Self::Unrestricted
    }

    pub fn allows(&self, date: NaiveDate) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::TodayOnly => date == chrono::Local::now().date_naive(),
            Self::Range { min, max } => {
                min.map_or(true, |min| date >= min) && max.map_or(true, |max| date <= max)
            }
        }
    }
}

/// Settings for the report submission pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Backend base URL, e.g. `http://192.168.0.117:8000/api`.
    pub base_url: String,
    /// Timeout for token validation and other lightweight calls.
    pub metadata_timeout: Duration,
    /// Timeout for the multipart report upload.
    pub upload_timeout: Duration,
    /// Photo size ceiling in KB; larger photos go through the ladder.
    pub photo_ceiling_kb: u64,
    pub compression_ladder: Vec<CompressionStep>,
    /// Private app-scoped storage root (the app documents directory).
    pub storage_root: PathBuf,
    pub date_policy: DatePolicy,
}

impl PipelineConfig {
    pub fn new(base_url: impl Into<String>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            metadata_timeout: Duration::from_secs(METADATA_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
            photo_ceiling_kb: PHOTO_CEILING_KB,
            compression_ladder: default_ladder(),
            storage_root: storage_root.into(),
            date_policy: DatePolicy::today_only(),
        }
    }

    /// Build from environment variables, falling back to defaults.
    ///
    /// `INTERNSIGHT_API_URL`, `INTERNSIGHT_STORAGE_ROOT`,
    /// `INTERNSIGHT_PHOTO_CEILING_KB`, `INTERNSIGHT_UPLOAD_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = env::var("INTERNSIGHT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let storage_root = env::var("INTERNSIGHT_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let mut config = Self::new(base_url, storage_root);

        if let Ok(v) = env::var("INTERNSIGHT_PHOTO_CEILING_KB") {
            if let Ok(kb) = v.parse() {
                config.photo_ceiling_kb = kb;
            }
        }
        if let Ok(v) = env::var("INTERNSIGHT_UPLOAD_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                config.upload_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn photo_ceiling_bytes(&self) -> u64 {
        self.photo_ceiling_kb * 1024
    }
}

/// Ladder tried in order until one output fits under the ceiling.
fn default_ladder() -> Vec<CompressionStep> {
    vec![
        CompressionStep {
            quality: 0.8,
            max_width: 2500,
        },
        CompressionStep {
            quality: 0.6,
            max_width: 2000,
        },
        CompressionStep {
            quality: 0.4,
            max_width: 1500,
        },
    ]
}
