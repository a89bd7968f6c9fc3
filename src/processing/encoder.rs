//! # Encoder & Degradation Controller
//!
//! Serializes a [`FinalBitmap`] to PNG or JPEG and validates the result.
//!
//! ## Degradation Retry
//!
//! | Device | First attempt fails, quality > floor | Quality ≤ floor |
//! |--------|--------------------------------------|-----------------|
//! | constrained | one retry at the floor (0.5) | no retry |
//! | unconstrained | no retry | no retry |
//!
//! Only encoder failures are retried. An artifact that encodes but fails
//! validation (empty, wrong signature, implausibly small) is reported
//! straight away.

use std::sync::Arc;

use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use log::{debug, info, warn};

use crate::config::ExportFormat;
use crate::core::{DeviceProfile, ExportArtifact, FinalBitmap};
use crate::error::{ExportError, ExportResult, Retryable};

/// Quality used by the single degraded retry.
pub const DEGRADED_QUALITY_FLOOR: f32 = 0.5;

/// Smallest artifact accepted as a real image.
pub const MIN_ARTIFACT_BYTES: usize = 100;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

/// Turns a bitmap into encoded bytes. `quality` is in (0, 1] and is
/// ignored by lossless formats.
pub trait BitmapEncoder: Send + Sync {
    fn encode(&self, bitmap: &FinalBitmap, format: ExportFormat, quality: f32) -> Result<Vec<u8>>;
}

/// Encoder backed by the `image` crate codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateEncoder;

impl BitmapEncoder for ImageCrateEncoder {
    fn encode(&self, bitmap: &FinalBitmap, format: ExportFormat, quality: f32) -> Result<Vec<u8>> {
        let (width, height) = (bitmap.width(), bitmap.height());
        let mut out = Vec::new();
        match format {
            ExportFormat::Png => {
                PngEncoder::new(&mut out).write_image(bitmap.as_rgba(), width, height, ExtendedColorType::Rgba8)?;
            }
            ExportFormat::Jpeg => {
                // JPEG has no alpha channel: transparent padding becomes black
                let rgb = DynamicImage::ImageRgba8(bitmap.image().clone()).to_rgb8();
                let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
                JpegEncoder::new_with_quality(&mut out, q).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
        }
        Ok(out)
    }
}

#[derive(Clone)]
pub struct EncodeController {
    encoder: Arc<dyn BitmapEncoder>,
    quality_floor: f32,
    min_bytes: usize,
}

impl EncodeController {
    pub fn new(encoder: Arc<dyn BitmapEncoder>) -> Self {
        Self {
            encoder,
            quality_floor: DEGRADED_QUALITY_FLOOR,
            min_bytes: MIN_ARTIFACT_BYTES,
        }
    }

    pub fn with_quality_floor(mut self, floor: f32) -> Self {
        self.quality_floor = floor;
        self
    }

    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Encode `bitmap`, retrying once at the quality floor on constrained
    /// devices.
    pub fn encode(
        &self,
        bitmap: &FinalBitmap,
        format: ExportFormat,
        quality: f32,
        profile: &DeviceProfile,
    ) -> ExportResult<ExportArtifact> {
        let quality = quality.min(profile.max_quality);
        match self.attempt(bitmap, format, quality) {
            Ok(artifact) => Ok(artifact),
            Err(e) if e.is_retryable() && profile.is_constrained && quality > self.quality_floor => {
                warn!(
                    "Encoding {} at quality {:.2} failed ({}), retrying at {:.2}",
                    format.extension(),
                    quality,
                    e,
                    self.quality_floor
                );
                self.attempt(bitmap, format, self.quality_floor)
                    .map_err(|e| e.with_context("degraded retry also failed"))
            }
            Err(e) => Err(e),
        }
    }

    fn attempt(&self, bitmap: &FinalBitmap, format: ExportFormat, quality: f32) -> ExportResult<ExportArtifact> {
        debug!(
            "Encoding {}x{} as {} (quality {:.2})",
            bitmap.width(),
            bitmap.height(),
            format.extension(),
            quality
        );
        let data = self
            .encoder
            .encode(bitmap, format, quality)
            .map_err(|e| ExportError::encode(format.extension(), e.to_string()).retryable())
            .map_err(|e| e.with_metadata("quality", format!("{:.2}", quality)))?;
        self.validate(format, &data)
            .map_err(|e| e.with_metadata("bytes", data.len().to_string()))?;
        info!("Encoded {} artifact: {} bytes", format.extension(), data.len());
        Ok(ExportArtifact::new(data, format))
    }

    fn validate(&self, format: ExportFormat, data: &[u8]) -> ExportResult<()> {
        if data.is_empty() {
            return Err(ExportError::encode(format.extension(), "encoder produced no data"));
        }
        let signature = match format {
            ExportFormat::Png => PNG_SIGNATURE,
            ExportFormat::Jpeg => JPEG_SIGNATURE,
        };
        if !data.starts_with(signature) {
            return Err(ExportError::encode(
                format.extension(),
                "output does not carry the format signature",
            ));
        }
        if data.len() < self.min_bytes {
            return Err(ExportError::encode(
                format.extension(),
                format!("output is implausibly small ({} bytes)", data.len()),
            ));
        }
        Ok(())
    }
}
