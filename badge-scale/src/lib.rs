// SPDX-License-Identifier: MIT
//! # badge-scale: Exact-Size Aspect-Preserving Fit
//!
//! This crate turns an RGBA bitmap of any size into a bitmap of an exact,
//! independently chosen size without stretching or cropping the source.
//!
//! ## Architecture Overview
//!
//! Fitting is split into two steps:
//! 1. **Planning** ([`plan`]): pure geometry. Given source and target sizes,
//!    compute where the source lands inside the target ("contain" semantics).
//! 2. **Resampling** ([`cpu`]): draw the source into a fully transparent
//!    canvas at the planned rectangle using fast_image_resize.
//!
//! Keeping the geometry pure means the centering and aspect invariants can
//! be tested without touching pixels.
//!
//! ## Usage Example
//!
//! ```rust
//! use badge_scale::{cpu::compose_rgba_cpu, plan::{contain_plan, Size}};
//!
//! let src = vec![255u8; 400 * 200 * 4];
//! let plan = contain_plan(Size { w: 400, h: 200 }, Size { w: 1080, h: 1080 });
//! assert_eq!((plan.dst.x, plan.dst.y, plan.dst.w, plan.dst.h), (0, 270, 1080, 540));
//!
//! let mut resizer = fast_image_resize::Resizer::new();
//! let mut out = vec![0u8; 1080 * 1080 * 4];
//! compose_rgba_cpu(&mut resizer, &src, &plan, &mut out).unwrap();
//! ```

pub mod cpu;
pub mod plan;
