//! # Configuration Module
//!
//! Export options chosen by the user, the validated certificate record the
//! badge is drawn from, and the key-value store that persists that record
//! between sessions, plus the pipeline-wide configuration.

pub mod options;
pub mod pipeline;
pub mod record;
pub mod store;

pub use options::{ExportFormat, ExportRequest, QualityPreset, Resolution};
pub use pipeline::PipelineConfig;
pub use record::{CertificateData, CertificateType, ThemeId};
pub use store::JsonFileStore;
