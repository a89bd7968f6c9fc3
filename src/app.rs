//! # Export Controller
//!
//! The application-layer entry point the UI calls when the user presses
//! "export". It owns the in-progress flag and turns failures into the
//! notices the user sees.
//!
//! - a blank name is reported as a field error and the pipeline is not run
//! - a second export while one is in flight is rejected, not queued
//! - the in-progress flag is cleared however the export ends

use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, warn};

use crate::capture::Surface;
use crate::config::{CertificateData, ExportRequest};
use crate::error::{ExportError, ExportResult, HasRecoverySuggestion, classify};
use crate::session::{ExportPipeline, ExportReport};

pub struct ExportController {
    pipeline: ExportPipeline,
    busy: AtomicBool,
}

/// Clears the busy flag when the export ends, including by unwinding.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ExportController {
    pub fn new(pipeline: ExportPipeline) -> Self {
        Self {
            pipeline,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Export the badge drawn from `record`.
    pub async fn export(
        &self,
        record: &CertificateData,
        surface: &dyn Surface,
        request: ExportRequest,
    ) -> ExportResult<ExportReport> {
        if record.name.trim().is_empty() {
            return Err(ExportError::validation("name", "is required", &record.name)
                .with_recovery_suggestion("请输入姓名"));
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::state(
                "exporting",
                "export",
                "an export is already in progress",
            ));
        }
        let _guard = BusyGuard(&self.busy);

        self.pipeline.run(surface, request).await.inspect_err(|e| {
            if classify::is_export_failure(e) {
                error!("Export failed [{}]: {}{}", e.category(), e, log_fields(e));
            } else {
                warn!("Export rejected [{}]: {}{}", e.category(), e, log_fields(e));
            }
        })
    }
}

/// ` key=value` pairs from the error metadata, sorted.
fn log_fields(error: &ExportError) -> String {
    let mut fields: Vec<String> = error
        .context()
        .metadata
        .iter()
        .map(|(k, v)| format!(" {}={}", k, v))
        .collect();
    fields.sort();
    fields.concat()
}

/// Human-readable notice for an export failure.
pub fn user_message(error: &ExportError) -> String {
    if classify::is_field_error(error) {
        return error.recovery_suggestion().unwrap_or("请检查输入内容").to_string();
    }
    if classify::requires_user_intervention(error) {
        if let Some(suggestion) = error.recovery_suggestion() {
            return suggestion.to_string();
        }
    }
    match error {
        ExportError::State { .. } => "正在导出，请稍候".to_string(),
        _ => "导出失败，请重试".to_string(),
    }
}
