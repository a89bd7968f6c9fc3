//! # Capture Module
//!
//! Turns a live, possibly animating surface into a raw bitmap at
//! `natural size × scale`. Capture always works on an inert copy of the
//! surface, so the interactive element keeps animating and is never
//! scrolled, resized or restyled by an export.

pub mod capturer;
pub mod resources;
pub mod surface;

pub use capturer::{CaptureSettings, SurfaceCapturer};
pub use resources::{
    FsResourceLoader, ResolvedResources, ResourceKind, ResourceLoader, ResourcePolicy, ResourceRef,
    WaitMode,
};
pub use surface::{CaptureOverrides, InertSurface, Surface, SurfaceLayout};
