//! Raster compositor: "contain" fit of a raw capture into an exact
//! `target_w × target_h` canvas, padding with fully transparent pixels.

use badge_scale::cpu::compose_rgba_cpu;
use badge_scale::plan::{FitPlan, Size, contain_plan};
use fast_image_resize::Resizer;
use image::RgbaImage;
use log::debug;

use crate::core::{FinalBitmap, RawCapture};
use crate::error::{ErrorSeverity, ExportError, ExportResult};

/// Largest output side the compositor will allocate a canvas for.
pub const MAX_TARGET_SIDE: u32 = 16_384;

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCompositor;

impl RasterCompositor {
    pub fn new() -> Self {
        Self
    }

    /// Where `raw` would land inside a `target_w × target_h` canvas.
    pub fn plan(&self, raw: &RawCapture, target_w: u32, target_h: u32) -> FitPlan {
        contain_plan(
            Size {
                w: raw.width(),
                h: raw.height(),
            },
            Size {
                w: target_w,
                h: target_h,
            },
        )
    }

    /// Fit `raw` into an exact `target_w × target_h` bitmap. Consumes the
    /// capture; it is not needed once composited.
    pub fn composite(&self, raw: RawCapture, target_w: u32, target_h: u32) -> ExportResult<FinalBitmap> {
        if target_w == 0 || target_h == 0 {
            return Err(ExportError::validation(
                "target",
                "dimensions must be greater than 0",
                format!("{}x{}", target_w, target_h),
            ));
        }
        if target_w > MAX_TARGET_SIDE || target_h > MAX_TARGET_SIDE {
            return Err(oversized(target_w, target_h));
        }
        let len = (target_w as usize)
            .checked_mul(target_h as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| oversized(target_w, target_h))?;

        let plan = self.plan(&raw, target_w, target_h);
        debug!(
            "Fit {}x{} into {}x{}: draw {}x{} at ({}, {})",
            plan.src.w, plan.src.h, plan.out.w, plan.out.h, plan.dst.w, plan.dst.h, plan.dst.x, plan.dst.y
        );

        let mut canvas = vec![0u8; len];
        compose_rgba_cpu(&mut Resizer::new(), raw.as_rgba(), &plan, &mut canvas)
            .map_err(|e| ExportError::capture("composite", e.to_string()))?;

        let image = RgbaImage::from_raw(target_w, target_h, canvas).ok_or_else(|| {
            ExportError::capture("composite", "canvas buffer does not match target size")
        })?;
        Ok(FinalBitmap::new(image))
    }
}

fn oversized(target_w: u32, target_h: u32) -> ExportError {
    ExportError::capture(
        "composite",
        format!(
            "target {}x{} exceeds the {} px canvas limit",
            target_w, target_h, MAX_TARGET_SIDE
        ),
    )
    .with_severity(ErrorSeverity::Critical)
    .with_recovery_suggestion("请选择较小的分辨率")
    .with_metadata("target", format!("{}x{}", target_w, target_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    use crate::error::ErrorKind;

    fn raw(w: u32, h: u32) -> RawCapture {
        RawCapture::new(RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255])))
    }

    /// Bounding box of pixels with non-zero alpha: (x, y, w, h).
    fn drawn_region(bitmap: &FinalBitmap) -> (u32, u32, u32, u32) {
        let img = bitmap.image();
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
        for (x, y, px) in img.enumerate_pixels() {
            if px[3] > 0 {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
        (x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    #[test]
    fn square_into_square_fills_canvas() {
        let out = RasterCompositor::new().composite(raw(90, 90), 108, 108).unwrap();
        assert_eq!((out.width(), out.height()), (108, 108));
        assert!(out.image().pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn wide_source_is_letterboxed() {
        let c = RasterCompositor::new();
        let plan = c.plan(&raw(400, 200), 1080, 1080);
        assert_eq!((plan.dst.x, plan.dst.y, plan.dst.w, plan.dst.h), (0, 270, 1080, 540));

        let out = c.composite(raw(40, 20), 108, 108).unwrap();
        assert_eq!(drawn_region(&out), (0, 27, 108, 54));
        assert_eq!(out.image().get_pixel(50, 0)[3], 0);
    }

    #[test]
    fn tall_source_is_pillarboxed() {
        let out = RasterCompositor::new().composite(raw(30, 60), 120, 120).unwrap();
        assert_eq!(drawn_region(&out), (30, 0, 60, 120));
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(RasterCompositor::new().composite(raw(10, 10), 0, 10).is_err());
    }

    #[test]
    fn huge_target_is_rejected_without_allocating() {
        let c = RasterCompositor::new();
        let err = c.composite(raw(2, 2), u32::MAX, u32::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capture);
        assert_eq!(err.context().metadata.get("target").map(String::as_str), Some("4294967295x4294967295"));

        assert!(c.composite(raw(2, 2), MAX_TARGET_SIDE + 1, 8).is_err());
        assert!(c.composite(raw(2, 2), 8, MAX_TARGET_SIDE + 1).is_err());
    }
}
