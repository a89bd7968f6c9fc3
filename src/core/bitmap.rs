//! # Pipeline Bitmaps and Artifacts
//!
//! The three values an export invocation creates and then hands on:
//!
//! ```text
//! ┌─────────────┐ composite ┌─────────────┐  encode  ┌────────────────┐
//! │ RawCapture  │──────────▶│ FinalBitmap │─────────▶│ ExportArtifact │──▶ caller
//! │ natural×k   │           │ exact W×H   │          │ bytes + mime   │
//! └─────────────┘           └─────────────┘          └────────────────┘
//! ```
//!
//! Each is moved from stage to stage, so no bitmap is ever shared between
//! invocations and the pipeline keeps nothing once the artifact is returned.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::config::ExportFormat;

/// Raw snapshot of a surface at `natural size × effective scale`.
#[derive(Debug, Clone)]
pub struct RawCapture {
    image: RgbaImage,
}

impl RawCapture {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Tightly packed RGBA8 rows.
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Bitmap of exactly the requested output size, transparent where the
/// source aspect ratio leaves padding.
#[derive(Debug, Clone)]
pub struct FinalBitmap {
    image: RgbaImage,
}

impl FinalBitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Tightly packed RGBA8 rows.
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Encoded image handed to the caller. Ownership transfers on return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Self-describing encoded image bytes
    pub data: Vec<u8>,
    /// Container format the bytes are encoded in
    pub format: ExportFormat,
    /// MIME type matching `format`
    pub mime_type: &'static str,
    /// `data.len()`, kept alongside for display
    pub size_bytes: usize,
}

impl ExportArtifact {
    pub fn new(data: Vec<u8>, format: ExportFormat) -> Self {
        let size_bytes = data.len();
        Self {
            data,
            format,
            mime_type: format.mime_type(),
            size_bytes,
        }
    }

    /// File extension used when the artifact is saved.
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// `data:<mime>;base64,<payload>`, the form an in-app preview displays.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_metadata_follows_format() {
        let a = ExportArtifact::new(vec![1, 2, 3], ExportFormat::Jpeg);
        assert_eq!(a.mime_type, "image/jpeg");
        assert_eq!(a.extension(), "jpeg");
        assert_eq!(a.size_bytes, 3);
    }

    #[test]
    fn data_url_is_base64() {
        let a = ExportArtifact::new(b"hi".to_vec(), ExportFormat::Png);
        assert_eq!(a.to_data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn raw_capture_reports_image_size() {
        let raw = RawCapture::new(RgbaImage::new(9, 4));
        assert_eq!((raw.width(), raw.height()), (9, 4));
        assert_eq!(raw.as_rgba().len(), 9 * 4 * 4);
    }
}
