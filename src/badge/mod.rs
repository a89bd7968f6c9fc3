//! # Badge Surface
//!
//! The circular badge the export pipeline captures: a theme catalog and a
//! live, animated [`BadgeSurface`] implementing the capture
//! [`Surface`](crate::capture::Surface) trait.

pub mod surface;
pub mod theme;

pub use surface::BadgeSurface;
pub use theme::Theme;
