//! # Renderable Surfaces
//!
//! The presentation layer owns the live element; the export core only sees
//! it through [`Surface`]. Every method takes `&self`: capturing can read
//! the live element but has no way to mutate, scroll or restyle it.
//!
//! ```text
//!   live Surface ──inert_copy(overrides)──▶ InertSurface ──rasterize(w, h)──▶ RGBA
//!   (animating)                             (frozen copy)
//! ```

use anyhow::Result;
use image::RgbaImage;

use super::resources::{ResolvedResources, ResourceRef};

/// Natural on-screen size of a surface in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    pub width: f64,
    pub height: f64,
}

impl SurfaceLayout {
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Style overrides applied to the inert copy used for capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOverrides {
    /// Force every animation and transition duration and delay to zero
    pub freeze_animations: bool,
    /// Font families declared on every node of the copy, in fallback order
    pub font_stack: Vec<String>,
    /// Request antialiased glyph rendering
    pub font_smoothing: bool,
}

impl Default for CaptureOverrides {
    fn default() -> Self {
        Self {
            freeze_animations: true,
            font_stack: vec![
                "Noto Sans SC".to_string(),
                "Microsoft YaHei".to_string(),
                "sans-serif".to_string(),
            ],
            font_smoothing: true,
        }
    }
}

/// A live visual element that can be captured.
pub trait Surface: Send + Sync {
    /// Short name for logs.
    fn label(&self) -> String;

    /// Natural size, or `None` when the element is detached from the visual tree.
    fn layout(&self) -> Option<SurfaceLayout>;

    /// External resources (fonts, images) the element paints with.
    fn resources(&self) -> Vec<ResourceRef>;

    /// Produce an isolated, inert copy with `overrides` applied. Changes to
    /// the copy must never be observable on the live element.
    fn inert_copy(&self, overrides: &CaptureOverrides) -> Result<Box<dyn InertSurface>>;
}

/// Offscreen copy of a surface, ready to be sampled.
pub trait InertSurface: Send {
    /// Paint the copy into a `width × height` RGBA bitmap.
    fn rasterize(&self, width: u32, height: u32, resources: &ResolvedResources) -> Result<RgbaImage>;
}
