//! # Export Pipeline
//!
//! Orchestrates one export from a live surface to a delivered artifact.
//! Built with a fluent builder; each collaborator sits behind a trait so
//! tests can substitute it.
//!
//! ## Stages
//!
//! ```text
//! ExportRequest ─validate─▶ DeviceProfiler ─clamp─▶ SurfaceCapturer ─▶ RawCapture
//!                                                                      │
//!   ExportArtifact ◀─deliver── EncodeController ◀── FinalBitmap ◀─composite
//! ```
//!
//! 1. **Profile**: recomputed on every call, never cached
//! 2. **Capture**: natural size × clamped scale, on an inert copy
//! 3. **Composite**: exact output size, aspect preserved, transparent padding
//! 4. **Encode**: device-clamped quality, one degraded retry on constrained devices
//! 5. **Deliver**: download on unconstrained devices, pass-through either way
//!
//! Rasterizing, compositing and encoding run on the blocking thread pool.
//! The raw and final bitmaps are owned by the call and dropped as soon as
//! the next stage has consumed them. Any stage failure ends the call; no
//! partial artifact is returned. A failed download is not a stage failure:
//! it is reported in [`ExportReport::delivery`].
//!
//! The pipeline does not guard against concurrent calls. The application
//! layer ([`crate::app::ExportController`]) does.

use std::sync::Arc;

use log::info;

use crate::capture::{FsResourceLoader, ResourceLoader, Surface, SurfaceCapturer};
use crate::config::{ExportRequest, PipelineConfig};
use crate::core::{AmbientProfiler, DeviceProfile, DeviceProfiler, ExportArtifact};
use crate::error::{ExportError, ExportResult};
use crate::processing::{
    BitmapEncoder, Delivery, DeliveryDispatcher, DownloadSink, EncodeController, ImageCrateEncoder,
    RasterCompositor,
};

/// Everything one export produced, for callers that need more than the
/// artifact.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub artifact: ExportArtifact,
    /// Profile the export ran under
    pub profile: DeviceProfile,
    /// Request after device clamping
    pub effective: ExportRequest,
    /// What happened to the artifact after encoding
    pub delivery: Delivery,
}

impl ExportReport {
    /// Name of the downloaded file, when the download succeeded.
    pub fn filename(&self) -> Option<&str> {
        self.delivery.saved_filename()
    }
}

pub struct ExportPipeline {
    profiler: Arc<dyn DeviceProfiler>,
    capturer: SurfaceCapturer,
    compositor: RasterCompositor,
    encoder: EncodeController,
    dispatcher: DeliveryDispatcher,
}

impl ExportPipeline {
    pub fn builder() -> ExportPipelineBuilder {
        ExportPipelineBuilder::new()
    }

    /// Export `surface` and return the artifact.
    pub async fn export(&self, surface: &dyn Surface, request: ExportRequest) -> ExportResult<ExportArtifact> {
        self.run(surface, request).await.map(|report| report.artifact)
    }

    /// Export `surface` and report how the export ran.
    pub async fn run(&self, surface: &dyn Surface, request: ExportRequest) -> ExportResult<ExportReport> {
        request.validate()?;

        let profile = self.profiler.profile();
        info!(
            "Export {}: {} {}x{} quality {:.2} scale {} on {} device",
            surface.label(),
            request.format.extension(),
            request.width,
            request.height,
            request.quality,
            request.scale,
            if profile.is_constrained { "constrained" } else { "unconstrained" }
        );
        let effective = profile.clamp(&request);

        let raw = self.capturer.capture(surface, effective.scale).await?;

        let compositor = self.compositor;
        let encoder = self.encoder.clone();
        let artifact = tokio::task::spawn_blocking(move || -> ExportResult<ExportArtifact> {
            let bitmap = compositor.composite(raw, effective.width, effective.height)?;
            encoder.encode(&bitmap, effective.format, effective.quality, &profile)
        })
        .await
        .map_err(|e| {
            ExportError::encode(effective.format.extension(), format!("encoder task failed: {}", e))
        })??;

        let (artifact, delivery) = self.dispatcher.deliver(artifact, profile.is_constrained);
        info!("Export finished: {} bytes {}", artifact.size_bytes, artifact.mime_type);

        Ok(ExportReport {
            artifact,
            profile,
            effective,
            delivery,
        })
    }
}

/// Builder for [`ExportPipeline`].
pub struct ExportPipelineBuilder {
    profiler: Option<Arc<dyn DeviceProfiler>>,
    loader: Option<Arc<dyn ResourceLoader>>,
    encoder: Option<Arc<dyn BitmapEncoder>>,
    sink: Option<Box<dyn DownloadSink>>,
    config: PipelineConfig,
}

impl Default for ExportPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPipelineBuilder {
    pub fn new() -> Self {
        Self {
            profiler: None,
            loader: None,
            encoder: None,
            sink: None,
            config: PipelineConfig::default(),
        }
    }

    /// Where device profiles come from. Defaults to the process environment.
    pub fn with_profiler<P: DeviceProfiler + 'static>(mut self, profiler: P) -> Self {
        self.profiler = Some(Arc::new(profiler));
        self
    }

    /// How capture resources are fetched. Defaults to the filesystem,
    /// relative to the working directory.
    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Encoder used by the degradation controller. Defaults to the `image`
    /// crate codecs.
    pub fn with_encoder(mut self, encoder: Arc<dyn BitmapEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Where downloads go. Required.
    pub fn with_sink<S: DownloadSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ExportResult<ExportPipeline> {
        self.config.validate()?;

        let sink = self.sink.ok_or_else(|| {
            ExportError::state("unconfigured", "build pipeline", "no download sink configured")
        })?;
        let profiler = self.profiler.unwrap_or_else(|| Arc::new(AmbientProfiler));
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(FsResourceLoader::new(".")));
        let encoder = self.encoder.unwrap_or_else(|| Arc::new(ImageCrateEncoder));

        let mut dispatcher = DeliveryDispatcher::new(sink).with_prefix(self.config.filename_prefix.clone());
        if let Some(date) = self.config.fixed_date {
            dispatcher = dispatcher.with_fixed_date(date);
        }

        Ok(ExportPipeline {
            profiler,
            capturer: SurfaceCapturer::new(loader, self.config.capture_settings()),
            compositor: RasterCompositor::new(),
            encoder: EncodeController::new(encoder)
                .with_quality_floor(self.config.quality_floor)
                .with_min_bytes(self.config.min_artifact_bytes),
            dispatcher,
        })
    }
}
