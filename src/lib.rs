//! # Badge Export Library
//!
//! Turns a live, animated certificate badge into an image file at a chosen
//! resolution, quality and format, adapting to the capabilities of the
//! device it runs on.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `core`: device profiling and the bitmap/artifact value types
//! - `capture`: the surface abstraction, resource resolution and capturer
//! - `processing`: compositing, encoding with degradation, delivery
//! - `session`: the export pipeline and its builder
//! - `app`: the application-layer export controller
//! - `badge`: the themed badge surface
//! - `config`: export options, the certificate record, persisted state
//!
//! ## Features
//!
//! - **Scale-independent output**: capture at natural size × scale, then fit
//!   to an independently chosen resolution
//! - **Aspect preserving**: letterboxed with transparent padding, never stretched
//! - **Device aware**: constrained devices get lower scale, size and quality caps
//! - **Graceful degradation**: one reduced-quality retry on constrained devices
//! - **Non-intrusive**: capture works on an inert copy; the live badge keeps animating
//!
//! ## Example
//!
//! ```rust,no_run
//! use badge_export::config::{CertificateData, ExportRequest};
//! use badge_export::export_badge;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let report = export_badge(&CertificateData::default(), ExportRequest::default(), "exports").await?;
//! println!("{} bytes, {:?}", report.artifact.size_bytes, report.filename());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use anyhow::Result;

pub mod app;
pub mod badge;
pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{ErrorKind, ExportError, ExportResult, HasRecoverySuggestion, HasSeverity, Retryable};

pub use app::{ExportController, user_message};
pub use session::{ExportPipeline, ExportPipelineBuilder, ExportReport};

use badge::BadgeSurface;
use config::{CertificateData, ExportRequest};
use processing::DirectorySink;

/// Export the badge for `record` with default pipeline settings, saving
/// into `output_dir` on unconstrained devices.
///
/// The device profile is read from the process environment
/// (`BADGE_EXPORT_USER_AGENT`).
pub async fn export_badge(
    record: &CertificateData,
    request: ExportRequest,
    output_dir: impl Into<PathBuf>,
) -> Result<ExportReport> {
    record.validate()?;
    let pipeline = ExportPipeline::builder()
        .with_sink(DirectorySink::new(output_dir))
        .build()?;
    let surface = BadgeSurface::new(record.clone());
    let report = ExportController::new(pipeline)
        .export(record, &surface, request)
        .await?;
    Ok(report)
}
