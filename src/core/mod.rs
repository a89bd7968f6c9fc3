//! # Core Types Module
//!
//! Value types that flow through the export pipeline and the device
//! profiler that decides how hard the pipeline may push the host.

pub mod bitmap;
pub mod device;

pub use bitmap::{ExportArtifact, FinalBitmap, RawCapture};
pub use device::{
    AmbientProfiler, DeviceProfile, DeviceProfiler, Environment, EnvironmentProfiler, FixedProfiler,
};
