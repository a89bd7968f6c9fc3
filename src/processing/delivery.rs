//! # Delivery Dispatcher
//!
//! Hands the finished artifact to the user. On unconstrained devices the
//! artifact is saved straight away under a dated filename; on constrained
//! devices automatic saving is unreliable, so nothing is written and the
//! caller presents the artifact for a manual save instead.
//!
//! Both paths return the artifact unchanged, together with a [`Delivery`]
//! saying what happened to it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::config::ExportFormat;
use crate::core::ExportArtifact;

/// Filename prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "软考纪念章";

/// Native "save this file" mechanism.
pub trait DownloadSink: Send + Sync {
    fn trigger(&self, filename: &str, artifact: &ExportArtifact) -> Result<()>;
}

/// Saves downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn trigger(&self, filename: &str, artifact: &ExportArtifact) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating download directory {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &artifact.data).with_context(|| format!("writing {}", path.display()))?;
        info!("Saved {} ({} bytes)", path.display(), artifact.size_bytes);
        Ok(())
    }
}

/// Outcome of handing an artifact to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Constrained device: nothing was saved, the caller offers a manual save
    Manual,
    /// The sink stored the artifact under `filename`
    Saved { filename: String },
    /// The sink was asked to store `filename` and failed
    Failed { filename: String, reason: String },
}

impl Delivery {
    /// Name of the file that was actually written.
    pub fn saved_filename(&self) -> Option<&str> {
        match self {
            Delivery::Saved { filename } => Some(filename),
            _ => None,
        }
    }
}

pub struct DeliveryDispatcher {
    prefix: String,
    fixed_date: Option<NaiveDate>,
    sink: Box<dyn DownloadSink>,
}

impl DeliveryDispatcher {
    pub fn new(sink: Box<dyn DownloadSink>) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            fixed_date: None,
            sink,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use `date` in filenames instead of today's local date.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    /// `<prefix>_<YYYY-MM-DD>.<ext>`
    pub fn filename_for(&self, format: ExportFormat) -> String {
        let date = self.fixed_date.unwrap_or_else(|| chrono::Local::now().date_naive());
        format!("{}_{}.{}", self.prefix, date.format("%Y-%m-%d"), format.extension())
    }

    /// Trigger a download on unconstrained devices, then return the artifact.
    /// A failed download is logged and reported as [`Delivery::Failed`]; it
    /// does not fail the export.
    pub fn deliver(&self, artifact: ExportArtifact, is_constrained: bool) -> (ExportArtifact, Delivery) {
        if is_constrained {
            debug!("Constrained device: returning artifact for manual save");
            return (artifact, Delivery::Manual);
        }
        let filename = self.filename_for(artifact.format);
        let delivery = match self.sink.trigger(&filename, &artifact) {
            Ok(()) => Delivery::Saved { filename },
            Err(e) => {
                warn!("Download of {} failed: {:#}", filename, e);
                Delivery::Failed {
                    filename,
                    reason: format!("{:#}", e),
                }
            }
        };
        (artifact, delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl DownloadSink for Recording {
        fn trigger(&self, filename: &str, _: &ExportArtifact) -> Result<()> {
            self.0.lock().unwrap().push(filename.to_string());
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn filename_uses_prefix_date_and_extension() {
        let d = DeliveryDispatcher::new(Box::new(Recording::default()))
            .with_prefix("badge")
            .with_fixed_date(date());
        assert_eq!(d.filename_for(ExportFormat::Png), "badge_2025-06-01.png");
        assert_eq!(d.filename_for(ExportFormat::Jpeg), "badge_2025-06-01.jpeg");
    }

    #[test]
    fn unconstrained_triggers_exactly_one_download() {
        let sink = Recording::default();
        let d = DeliveryDispatcher::new(Box::new(sink.clone()))
            .with_prefix("badge")
            .with_fixed_date(date());
        let artifact = ExportArtifact::new(vec![1; 200], ExportFormat::Png);
        let (out, delivery) = d.deliver(artifact.clone(), false);
        assert_eq!(out, artifact);
        assert_eq!(delivery.saved_filename(), Some("badge_2025-06-01.png"));
        assert_eq!(*sink.0.lock().unwrap(), vec!["badge_2025-06-01.png".to_string()]);
    }

    #[test]
    fn constrained_returns_without_download() {
        let sink = Recording::default();
        let d = DeliveryDispatcher::new(Box::new(sink.clone()));
        let artifact = ExportArtifact::new(vec![7; 200], ExportFormat::Jpeg);
        assert_eq!(d.deliver(artifact.clone(), true), (artifact, Delivery::Manual));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    struct Broken;

    impl DownloadSink for Broken {
        fn trigger(&self, _: &str, _: &ExportArtifact) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn sink_failure_still_returns_artifact() {
        let d = DeliveryDispatcher::new(Box::new(Broken))
            .with_prefix("badge")
            .with_fixed_date(date());
        let artifact = ExportArtifact::new(vec![9; 200], ExportFormat::Png);
        let (out, delivery) = d.deliver(artifact.clone(), false);
        assert_eq!(out, artifact);
        assert_eq!(delivery.saved_filename(), None);
        match delivery {
            Delivery::Failed { filename, reason } => {
                assert_eq!(filename, "badge_2025-06-01.png");
                assert!(reason.contains("disk full"));
            }
            other => panic!("expected a failed delivery, got {:?}", other),
        }
    }

    #[test]
    fn directory_sink_over_a_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let d = DeliveryDispatcher::new(Box::new(DirectorySink::new(&blocker))).with_fixed_date(date());
        let artifact = ExportArtifact::new(vec![3; 150], ExportFormat::Png);

        let (_, delivery) = d.deliver(artifact, false);

        assert!(matches!(delivery, Delivery::Failed { .. }));
        assert!(blocker.is_file());
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let artifact = ExportArtifact::new(vec![3; 150], ExportFormat::Png);
        sink.trigger("a.png", &artifact).unwrap();
        assert_eq!(std::fs::read(dir.path().join("out/a.png")).unwrap(), artifact.data);
    }
}
