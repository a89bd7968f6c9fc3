//! # Pipeline Configuration
//!
//! Knobs for the export pipeline that are not part of a single request.
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | `filename_prefix` | `软考纪念章` | prefix of downloaded filenames |
//! | `resource_timeout` | 3 s | bound on the font/image wait before sampling |
//! | `strict_resources` | `false` | fail the capture instead of using fallbacks |
//! | `font_stack` | Noto Sans SC, Microsoft YaHei, sans-serif | families forced on the capture copy |
//! | `forced_fonts` | none | font files loaded into every capture |
//! | `quality_floor` | 0.5 | quality of the degraded retry |
//! | `min_artifact_bytes` | 100 | smallest artifact accepted |
//! | `fixed_date` | none | date used in filenames instead of today |
//!
//! ## Examples
//!
//! ```rust
//! use std::time::Duration;
//! use badge_export::config::PipelineConfig;
//!
//! let config = PipelineConfig {
//!     resource_timeout: Duration::from_millis(500),
//!     strict_resources: true,
//!     ..PipelineConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use chrono::NaiveDate;

use crate::capture::{CaptureOverrides, CaptureSettings, ResourcePolicy, ResourceRef, WaitMode};
use crate::error::{ExportError, ExportResult};
use crate::processing::delivery::DEFAULT_PREFIX;
use crate::processing::encoder::{DEGRADED_QUALITY_FLOOR, MIN_ARTIFACT_BYTES};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Prefix of `<prefix>_<date>.<ext>` download names.
    pub filename_prefix: String,

    /// How long capture waits for fonts and images to become ready.
    ///
    /// Must be greater than zero.
    pub resource_timeout: Duration,

    /// When `true`, resources that are not ready in time fail the capture.
    /// When `false`, capture proceeds with fallback fonts and blank images.
    pub strict_resources: bool,

    /// Font families declared on every node of the capture copy.
    pub font_stack: Vec<String>,

    /// Font files (paths or `file://` URLs) force-loaded into the capture
    /// context even if the live surface never loaded them.
    pub forced_fonts: Vec<String>,

    /// Quality of the single degraded retry on constrained devices.
    ///
    /// Must be in (0, 1].
    pub quality_floor: f32,

    /// Artifacts smaller than this are rejected as blank.
    pub min_artifact_bytes: usize,

    /// Date used in download filenames; today's local date when unset.
    pub fixed_date: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filename_prefix: DEFAULT_PREFIX.to_string(),
            resource_timeout: ResourcePolicy::default().timeout,
            strict_resources: false,
            font_stack: CaptureOverrides::default().font_stack,
            forced_fonts: Vec::new(),
            quality_floor: DEGRADED_QUALITY_FLOOR,
            min_artifact_bytes: MIN_ARTIFACT_BYTES,
            fixed_date: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ExportResult<()> {
        if self.filename_prefix.trim().is_empty() {
            return Err(ExportError::validation("filename_prefix", "must not be empty", ""));
        }
        if self.filename_prefix.contains(['/', '\\']) {
            return Err(ExportError::validation(
                "filename_prefix",
                "must not contain path separators",
                &self.filename_prefix,
            ));
        }
        if self.resource_timeout.is_zero() {
            return Err(ExportError::validation(
                "resource_timeout",
                "must be greater than 0",
                "0ms",
            ));
        }
        if !(self.quality_floor > 0.0 && self.quality_floor <= 1.0) {
            return Err(ExportError::validation(
                "quality_floor",
                "must be in (0, 1]",
                self.quality_floor.to_string(),
            ));
        }
        Ok(())
    }

    pub fn resource_policy(&self) -> ResourcePolicy {
        ResourcePolicy {
            timeout: self.resource_timeout,
            mode: if self.strict_resources {
                WaitMode::Strict
            } else {
                WaitMode::BestEffort
            },
        }
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            overrides: CaptureOverrides {
                font_stack: self.font_stack.clone(),
                ..CaptureOverrides::default()
            },
            forced_fonts: self.forced_fonts.iter().map(ResourceRef::font).collect(),
            resource_policy: self.resource_policy(),
        }
    }
}
