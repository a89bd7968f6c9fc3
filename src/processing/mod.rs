//! # Processing Module
//!
//! The stages that run after capture: fit the raw bitmap to the requested
//! size, encode it (with the constrained-device quality retry), and hand the
//! artifact to delivery.

pub mod compositor;
pub mod delivery;
pub mod encoder;

pub use compositor::{MAX_TARGET_SIDE, RasterCompositor};
pub use delivery::{Delivery, DeliveryDispatcher, DirectorySink, DownloadSink};
pub use encoder::{BitmapEncoder, EncodeController, ImageCrateEncoder};
