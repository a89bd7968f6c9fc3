//! # Surface Capturer
//!
//! Produces a [`RawCapture`] of a live surface at its natural size times the
//! effective (device-clamped) scale:
//!
//! ```text
//! raw_width  = round(layout.width  × scale)
//! raw_height = round(layout.height × scale)
//! ```
//!
//! ## Capture Sequence
//!
//! 1. Read the live layout; a detached or zero-sized surface is a capture error
//! 2. Build the inert copy with animations frozen and the font stack forced
//! 3. Await font/image readiness (bounded, see [`ResourcePolicy`])
//! 4. Rasterize the copy on a blocking worker and verify the output size
//!
//! Nothing is retried here: a failed capture propagates to the caller.

use std::sync::Arc;

use log::{debug, info};

use super::resources::{ResourceLoader, ResourcePolicy, ResourceRef, resolve_resources};
use super::surface::{CaptureOverrides, Surface};
use crate::core::RawCapture;
use crate::error::{ExportError, ExportResult};

/// Everything the capturer applies to each capture besides the scale.
#[derive(Debug, Clone, Default)]
pub struct CaptureSettings {
    pub overrides: CaptureOverrides,
    /// Fonts force-loaded into the capture context even when the live
    /// surface hasn't loaded them yet
    pub forced_fonts: Vec<ResourceRef>,
    pub resource_policy: ResourcePolicy,
}

pub struct SurfaceCapturer {
    loader: Arc<dyn ResourceLoader>,
    settings: CaptureSettings,
}

impl SurfaceCapturer {
    pub fn new(loader: Arc<dyn ResourceLoader>, settings: CaptureSettings) -> Self {
        Self { loader, settings }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Rasterize `surface` at `effective_scale`.
    pub async fn capture(&self, surface: &dyn Surface, effective_scale: f64) -> ExportResult<RawCapture> {
        let label = surface.label();

        let layout = surface.layout().ok_or_else(|| {
            ExportError::capture("layout", "surface is detached from the visual tree")
                .with_context(label.clone())
        })?;
        if layout.is_empty() {
            return Err(ExportError::capture(
                "layout",
                format!("surface has no area ({}x{})", layout.width, layout.height),
            )
            .with_context(label));
        }
        if !(effective_scale.is_finite() && effective_scale > 0.0) {
            return Err(ExportError::capture(
                "layout",
                format!("invalid capture scale {}", effective_scale),
            ));
        }

        let raw_width = (layout.width * effective_scale).round();
        let raw_height = (layout.height * effective_scale).round();
        if raw_width < 1.0 || raw_height < 1.0 || raw_width > u32::MAX as f64 || raw_height > u32::MAX as f64 {
            return Err(ExportError::capture(
                "layout",
                format!("capture size {}x{} is out of range", raw_width, raw_height),
            )
            .with_context(label));
        }
        let (raw_width, raw_height) = (raw_width as u32, raw_height as u32);

        info!(
            "Capturing {} at {}x{} ({}x{} × {})",
            label, raw_width, raw_height, layout.width, layout.height, effective_scale
        );

        let inert = surface.inert_copy(&self.settings.overrides).map_err(|e| {
            ExportError::capture("clone", e.to_string()).with_context(label.clone())
        })?;

        let mut refs = surface.resources();
        refs.extend(self.settings.forced_fonts.iter().cloned());
        let resources = resolve_resources(self.loader.as_ref(), refs, &self.settings.resource_policy).await?;
        debug!(
            "Capture resources: {} loaded, {} missing",
            resources.loaded().len(),
            resources.missing().len()
        );

        let image = tokio::task::spawn_blocking(move || inert.rasterize(raw_width, raw_height, &resources))
            .await
            .map_err(|e| ExportError::capture("rasterize", format!("rasterizer task failed: {}", e)))?
            .map_err(|e| ExportError::capture("rasterize", e.to_string()).with_context(label.clone()))?;

        if image.width() != raw_width || image.height() != raw_height {
            return Err(ExportError::capture(
                "rasterize",
                format!(
                    "rasterizer returned {}x{}, expected {}x{}",
                    image.width(),
                    image.height(),
                    raw_width,
                    raw_height
                ),
            )
            .with_context(label));
        }

        Ok(RawCapture::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};

    use crate::capture::resources::ResolvedResources;
    use crate::capture::surface::{InertSurface, SurfaceLayout};
    use crate::error::ErrorKind;

    struct NoLoader;

    #[async_trait]
    impl ResourceLoader for NoLoader {
        async fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
            Err(anyhow!("unexpected load of {}", resource.url))
        }
    }

    /// Records the overrides it was copied with.
    struct StubSurface {
        layout: Option<SurfaceLayout>,
        seen: Mutex<Option<CaptureOverrides>>,
        fail_raster: bool,
        wrong_size: bool,
    }

    impl StubSurface {
        fn sized(w: f64, h: f64) -> Self {
            Self {
                layout: Some(SurfaceLayout { width: w, height: h }),
                seen: Mutex::new(None),
                fail_raster: false,
                wrong_size: false,
            }
        }
    }

    struct StubCopy {
        fail: bool,
        wrong_size: bool,
    }

    impl InertSurface for StubCopy {
        fn rasterize(&self, width: u32, height: u32, _: &ResolvedResources) -> Result<RgbaImage> {
            if self.fail {
                return Err(anyhow!("context unavailable"));
            }
            let w = if self.wrong_size { width + 1 } else { width };
            Ok(RgbaImage::from_pixel(w, height, Rgba([10, 20, 30, 255])))
        }
    }

    impl Surface for StubSurface {
        fn label(&self) -> String {
            "stub".into()
        }
        fn layout(&self) -> Option<SurfaceLayout> {
            self.layout
        }
        fn resources(&self) -> Vec<ResourceRef> {
            Vec::new()
        }
        fn inert_copy(&self, overrides: &CaptureOverrides) -> Result<Box<dyn InertSurface>> {
            *self.seen.lock().unwrap() = Some(overrides.clone());
            Ok(Box::new(StubCopy {
                fail: self.fail_raster,
                wrong_size: self.wrong_size,
            }))
        }
    }

    fn capturer() -> SurfaceCapturer {
        SurfaceCapturer::new(Arc::new(NoLoader), CaptureSettings::default())
    }

    #[tokio::test]
    async fn raw_size_is_natural_size_times_scale() {
        let surface = StubSurface::sized(300.0, 300.0);
        let raw = capturer().capture(&surface, 3.0).await.unwrap();
        assert_eq!((raw.width(), raw.height()), (900, 900));

        let raw = capturer().capture(&StubSurface::sized(100.5, 33.3), 2.0).await.unwrap();
        assert_eq!((raw.width(), raw.height()), (201, 67));
    }

    #[tokio::test]
    async fn copy_is_frozen() {
        let surface = StubSurface::sized(10.0, 10.0);
        capturer().capture(&surface, 1.0).await.unwrap();
        let seen = surface.seen.lock().unwrap().clone().unwrap();
        assert!(seen.freeze_animations);
        assert!(!seen.font_stack.is_empty());
    }

    #[tokio::test]
    async fn detached_and_empty_surfaces_fail() {
        let mut detached = StubSurface::sized(1.0, 1.0);
        detached.layout = None;
        let err = capturer().capture(&detached, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capture);

        let err = capturer().capture(&StubSurface::sized(0.0, 300.0), 3.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capture);
    }

    #[tokio::test]
    async fn rasterizer_failures_become_capture_errors() {
        let mut surface = StubSurface::sized(50.0, 50.0);
        surface.fail_raster = true;
        let err = capturer().capture(&surface, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capture);

        let mut surface = StubSurface::sized(50.0, 50.0);
        surface.wrong_size = true;
        let err = capturer().capture(&surface, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capture);
    }
}
