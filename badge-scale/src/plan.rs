// SPDX-License-Identifier: MIT
//! # Contain Fit Planning
//!
//! Computes the destination rectangle for drawing a source bitmap into a
//! target canvas of exact size while preserving the source aspect ratio.
//!
//! The binding dimension (the one the source fills completely) is chosen by
//! comparing ratios:
//!
//! | Case | Draw size | Offset |
//! |------|-----------|--------|
//! | `src_ratio > dst_ratio` (source wider) | `target.w × target.w / src_ratio` | vertical only |
//! | otherwise | `target.h × src_ratio × target.h` | horizontal only |
//!
//! Fractional geometry is rounded to whole pixels. The free axis is clamped
//! to `1..=target` so a degenerate ratio never produces an empty or
//! overflowing rectangle.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        self.w as f64 / self.h as f64
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Destination rectangle in target coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Complete fit plan computed from the source and target sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitPlan {
    /// Source bitmap dimensions
    pub src: Size,
    /// Exact canvas dimensions
    pub out: Size,
    /// Where the resampled source is drawn; everything outside stays transparent
    pub dst: Rect,
}

impl FitPlan {
    /// True when the source covers the whole canvas (no padding).
    pub fn is_exact_fit(&self) -> bool {
        self.dst.x == 0 && self.dst.y == 0 && self.dst.w == self.out.w && self.dst.h == self.out.h
    }
}

/// Compute a "contain" plan: the source is scaled up or down until its
/// binding side equals the canvas side, then centered on the free axis.
///
/// Both sizes must be non-empty; callers guarantee this.
///
/// # Performance
/// O(1), a handful of floating-point operations.
pub fn contain_plan(src: Size, out: Size) -> FitPlan {
    debug_assert!(!src.is_empty() && !out.is_empty());

    let src_ratio = src.ratio();
    let dst_ratio = out.ratio();

    let dst = if src_ratio > dst_ratio {
        let draw_h = ((out.w as f64 / src_ratio).round() as u32).clamp(1, out.h);
        Rect {
            x: 0,
            y: (out.h - draw_h) / 2,
            w: out.w,
            h: draw_h,
        }
    } else {
        let draw_w = ((out.h as f64 * src_ratio).round() as u32).clamp(1, out.w);
        Rect {
            x: (out.w - draw_w) / 2,
            y: 0,
            w: draw_w,
            h: out.h,
        }
    };

    FitPlan { src, out, dst }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(sw: u32, sh: u32, tw: u32, th: u32) -> FitPlan {
        contain_plan(Size { w: sw, h: sh }, Size { w: tw, h: th })
    }

    #[test]
    fn square_into_square_is_exact() {
        let p = plan(900, 900, 1080, 1080);
        assert!(p.is_exact_fit());
        assert_eq!(p.dst, Rect { x: 0, y: 0, w: 1080, h: 1080 });
    }

    #[test]
    fn wide_source_letterboxes_vertically() {
        let p = plan(400, 200, 1080, 1080);
        assert_eq!(p.dst, Rect { x: 0, y: 270, w: 1080, h: 540 });
    }

    #[test]
    fn tall_source_pillarboxes_horizontally() {
        let p = plan(300, 600, 1080, 1080);
        assert_eq!(p.dst, Rect { x: 270, y: 0, w: 540, h: 1080 });
    }

    #[test]
    fn downscale_keeps_binding_axis() {
        let p = plan(3000, 1000, 1920, 1080);
        assert_eq!(p.dst.w, 1920);
        assert_eq!(p.dst.h, 640);
        assert_eq!(p.dst.y, 220);
    }

    #[test]
    fn extreme_ratio_never_collapses() {
        let p = plan(10_000, 1, 100, 100);
        assert_eq!(p.dst.h, 1);
        assert_eq!(p.dst.w, 100);
        assert!(p.dst.y + p.dst.h <= 100);
    }

    #[test]
    fn offsets_and_aspect_hold_across_sizes() {
        let sizes = [1u32, 3, 7, 64, 300, 599, 900, 1080, 2048];
        for &sw in &sizes {
            for &sh in &sizes {
                for &(tw, th) in &[(1080u32, 1080u32), (1920, 1080), (640, 2160), (5, 3)] {
                    let p = plan(sw, sh, tw, th);
                    // canvas is exact and the rect stays inside it
                    assert!(p.dst.x + p.dst.w <= tw && p.dst.y + p.dst.h <= th);
                    // at most one axis is offset
                    assert!(p.dst.x == 0 || p.dst.y == 0, "{sw}x{sh} -> {tw}x{th}: {:?}", p.dst);
                    // one side is binding
                    assert!(p.dst.w == tw || p.dst.h == th);
                    // aspect within one pixel on the free axis
                    let ratio = sw as f64 / sh as f64;
                    if ratio > tw as f64 / th as f64 {
                        let ideal = tw as f64 / ratio;
                        assert!((p.dst.h as f64 - ideal.clamp(1.0, th as f64)).abs() <= 1.0);
                    } else {
                        let ideal = th as f64 * ratio;
                        assert!((p.dst.w as f64 - ideal.clamp(1.0, tw as f64)).abs() <= 1.0);
                    }
                }
            }
        }
    }
}
