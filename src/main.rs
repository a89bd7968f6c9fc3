use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use badge_export::badge::BadgeSurface;
use badge_export::capture::FsResourceLoader;
use badge_export::config::store::CERTIFICATE_DATA_KEY;
use badge_export::config::{
    CertificateData, CertificateType, ExportFormat, ExportRequest, JsonFileStore, PipelineConfig,
    QualityPreset, Resolution, ThemeId,
};
use badge_export::core::{AmbientProfiler, Environment, EnvironmentProfiler};
use badge_export::processing::{Delivery, DirectorySink};
use badge_export::{ExportController, ExportPipeline, user_message};
use chrono::NaiveDate;
use clap::Parser;

/// Render a certificate badge and export it as PNG or JPEG.
///
/// The form is remembered between runs: flags override the stored values
/// and the result is written back.
#[derive(Parser, Debug)]
#[command(name = "badge-export")]
#[command(about = "🏅 Export your certificate badge as an image")]
#[command(long_about = "Export your certificate badge as an image at a chosen resolution, quality and format.
On mobile-class devices (set BADGE_EXPORT_USER_AGENT or --user-agent) nothing is saved automatically;
use --preview to receive the image for a manual save.")]
struct Args {
    /// Name printed on the badge (1-10 characters)
    #[arg(short, long)]
    name: Option<String>,

    /// Certificate the badge commemorates
    #[arg(short, long, value_enum)]
    certificate: Option<CertificateType>,

    /// Issue date, YYYY-MM-DD
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Visual theme
    #[arg(short, long, value_enum)]
    theme: Option<ThemeId>,

    /// Custom message (at most 50 characters)
    #[arg(short, long, conflicts_with = "no_message")]
    message: Option<String>,

    /// Drop the custom message
    #[arg(long)]
    no_message: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "png")]
    format: ExportFormat,

    /// Output resolution (square)
    #[arg(short, long, value_enum, default_value = "1080")]
    resolution: Resolution,

    /// Encoder quality preset (JPEG only)
    #[arg(short, long, value_enum, default_value = "best")]
    quality: QualityPreset,

    /// Capture oversampling factor
    #[arg(short, long, default_value_t = 3.0)]
    scale: f64,

    /// Directory downloads are saved into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File remembering the last form values
    #[arg(long, default_value = "badge-export.json")]
    store: PathBuf,

    /// Platform identification string used to classify the device
    #[arg(long)]
    user_agent: Option<String>,

    /// Where to write the image when it was not saved automatically
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write the preview as a base64 data URL instead of raw bytes
    #[arg(long, requires = "preview")]
    data_url: bool,

    /// Font file to load into the capture context (repeatable)
    #[arg(long = "font")]
    fonts: Vec<String>,

    /// Fail instead of using fallbacks when fonts are not ready in time
    #[arg(long)]
    strict_resources: bool,

    /// How long to wait for fonts, in milliseconds
    #[arg(long, default_value_t = 3000)]
    resource_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = JsonFileStore::new(&args.store);
    let mut record: CertificateData = store.load_or(CERTIFICATE_DATA_KEY, CertificateData::default());
    apply_overrides(&mut record, &args);
    if let Err(e) = record.validate() {
        eprintln!("❌ {}: {}", user_message(&e), e);
        return Err(e.into());
    }
    store.save(CERTIFICATE_DATA_KEY, &record)?;

    let config = PipelineConfig {
        resource_timeout: Duration::from_millis(args.resource_timeout_ms),
        strict_resources: args.strict_resources,
        forced_fonts: args.fonts.clone(),
        ..PipelineConfig::default()
    };
    let builder = ExportPipeline::builder()
        .with_config(config)
        .with_resource_loader(Arc::new(FsResourceLoader::new(".")))
        .with_sink(DirectorySink::new(&args.output_dir));
    let builder = match &args.user_agent {
        Some(ua) => builder.with_profiler(EnvironmentProfiler::new(Environment::with_user_agent(ua))),
        None => builder.with_profiler(AmbientProfiler),
    };
    let controller = ExportController::new(builder.build()?);

    let request = ExportRequest::default()
        .with_format(args.format)
        .with_resolution(args.resolution)
        .with_quality(args.quality)
        .with_scale(args.scale);

    let surface = BadgeSurface::new(record.clone());
    let report = match controller.export(&record, &surface, request).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ {}", user_message(&e));
            return Err(e.into());
        }
    };

    let artifact = &report.artifact;
    match &report.delivery {
        Delivery::Saved { filename } => {
            println!(
                "✅ Saved {} ({} bytes, {}x{})",
                args.output_dir.join(filename).display(),
                artifact.size_bytes,
                report.effective.width,
                report.effective.height
            );
            return Ok(());
        }
        Delivery::Failed { filename, reason } => {
            eprintln!(
                "⚠️  Could not save {}: {}",
                args.output_dir.join(filename).display(),
                reason
            );
        }
        Delivery::Manual => {}
    }

    match &args.preview {
        Some(path) => {
            let written = if args.data_url {
                std::fs::write(path, artifact.to_data_url())
            } else {
                std::fs::write(path, &artifact.data)
            };
            written.with_context(|| format!("writing preview {}", path.display()))?;
            println!("📱 Preview written to {}, save it from there", path.display());
        }
        None => {
            println!(
                "📱 {} bytes of {} ready; pass --preview to receive them",
                artifact.size_bytes, artifact.mime_type
            );
        }
    }
    Ok(())
}

/// Apply command-line values on top of the stored record.
fn apply_overrides(record: &mut CertificateData, args: &Args) {
    if let Some(name) = &args.name {
        record.name = name.clone();
    }
    if let Some(certificate) = args.certificate {
        record.certificate_type = certificate;
    }
    if let Some(date) = args.date {
        record.issue_date = date;
    }
    if let Some(theme) = args.theme {
        record.theme = theme;
    }
    if args.no_message {
        record.custom_message = None;
    } else if let Some(message) = &args.message {
        record.custom_message = Some(message.clone());
    }
}
