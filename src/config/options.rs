//! # Export Options
//!
//! The immutable request describing one export, plus the fixed option sets
//! offered by the options selector.
//!
//! ## Option Axes
//!
//! | Axis | Values | Notes |
//! |------|--------|-------|
//! | `format` | `png`, `jpeg` | quality only matters for `jpeg` |
//! | `resolution` | 1080², 1920², 2160² | final pixel size, independent of scale |
//! | `quality` | 0.8, 0.9, 0.95 | clamped further on constrained devices |
//! | `scale` | any positive factor | capture oversampling, default 3× |
//!
//! ## Examples
//!
//! ```rust
//! use badge_export::config::{ExportRequest, QualityPreset, Resolution};
//!
//! let request = ExportRequest::default()
//!     .with_resolution(Resolution::R1920)
//!     .with_quality(QualityPreset::High);
//!
//! assert_eq!((request.width, request.height), (1920, 1920));
//! assert!(request.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Output container format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, larger files, suited to printing
    Png,
    /// Lossy, smaller files, suited to sharing
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    /// Whether the quality setting changes the encoded output.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

/// Square output resolutions offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Resolution {
    /// 1080×1080, social media standard
    #[value(name = "1080")]
    R1080,
    /// 1920×1920, high definition
    #[value(name = "1920")]
    R1920,
    /// 2160×2160, 4K
    #[value(name = "2160")]
    R2160,
}

impl Resolution {
    pub fn side(self) -> u32 {
        match self {
            Resolution::R1080 => 1080,
            Resolution::R1920 => 1920,
            Resolution::R2160 => 2160,
        }
    }
}

/// Encoder quality presets offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum QualityPreset {
    /// 0.80, smaller files
    Standard,
    /// 0.90, balanced
    High,
    /// 0.95, best result
    Best,
}

impl QualityPreset {
    pub fn value(self) -> f32 {
        match self {
            QualityPreset::Standard => 0.8,
            QualityPreset::High => 0.9,
            QualityPreset::Best => 0.95,
        }
    }
}

/// Immutable description of a requested export.
///
/// Invariant (checked by [`ExportRequest::validate`]):
/// `width > 0 ∧ height > 0 ∧ 0 < quality ≤ 1 ∧ scale > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Encoder quality in (0, 1]; meaningful only for lossy formats
    pub quality: f32,
    /// Oversampling factor applied during capture
    pub scale: f64,
    /// Final output width in pixels
    pub width: u32,
    /// Final output height in pixels
    pub height: u32,
}

impl Default for ExportRequest {
    /// `png`, quality 0.95, 3× capture, 1080×1080.
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: QualityPreset::Best.value(),
            scale: 3.0,
            width: Resolution::R1080.side(),
            height: Resolution::R1080.side(),
        }
    }
}

impl ExportRequest {
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.width = resolution.side();
        self.height = resolution.side();
        self
    }

    pub fn with_quality(mut self, quality: QualityPreset) -> Self {
        self.quality = quality.value();
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Validates the request invariants.
    pub fn validate(&self) -> ExportResult<()> {
        if self.width == 0 {
            return Err(ExportError::validation("width", "must be greater than 0", "0"));
        }
        if self.height == 0 {
            return Err(ExportError::validation("height", "must be greater than 0", "0"));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ExportError::validation(
                "quality",
                "must be in (0, 1]",
                self.quality.to_string(),
            ));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(ExportError::validation(
                "scale",
                "must be a positive finite factor",
                self.scale.to_string(),
            ));
        }
        Ok(())
    }
}
