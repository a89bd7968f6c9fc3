// SPDX-License-Identifier: MIT
// CPU compositor built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, drawn into a transparent caller-provided canvas.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::plan::FitPlan;

#[derive(Debug)]
pub enum ScaleError {
    SourceTooSmall,
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<fir::CropBoxError> for ScaleError { fn from(e: fir::CropBoxError) -> Self { Self::Crop(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::SourceTooSmall => write!(f, "Source buffer smaller than planned source size"),
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            ScaleError::Crop(e) => write!(f, "Crop error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Resize options used for every composite: Lanczos3 convolution with
/// alpha-aware (premultiplied) filtering so transparent edges don't bleed.
pub fn high_quality_options() -> ResizeOptions {
    ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        .use_alpha(true)
}

/// Main compositing entry point.
/// `src_rgba` must hold `plan.src.w * plan.src.h * 4` tightly packed bytes.
/// `dst` must be at least `plan.out.w * plan.out.h * 4` bytes; it is cleared
/// to transparent before the source is drawn into `plan.dst`.
pub fn compose_rgba_cpu(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    plan: &FitPlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let src_len = (plan.src.w as usize) * (plan.src.h as usize) * 4;
    if src_rgba.len() < src_len {
        return Err(ScaleError::SourceTooSmall);
    }
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 4;
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(plan.src.w, plan.src.h, &src_rgba[..src_len])?;

    // Padding must be fully transparent, never a fill colour.
    dst[..dst_len].fill(0);
    let mut canvas = TypedImage::<U8x4>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;

    let opts = high_quality_options();
    if plan.is_exact_fit() {
        resizer.resize_typed::<U8x4>(&src_view, &mut canvas, &opts)?;
    } else {
        let (x, y, w, h) = (plan.dst.x, plan.dst.y, plan.dst.w, plan.dst.h);
        let mut roi = TypedCroppedImageMut::from_ref(&mut canvas, x, y, w, h)?;
        resizer.resize_typed::<U8x4>(&src_view, &mut roi, &opts)?;
    }

    Ok(())
}
