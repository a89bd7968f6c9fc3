//! Encode degradation through the pipeline: the single reduced-quality
//! retry exists only on constrained devices and only above the floor.

mod common;

use std::sync::Arc;

use badge_export::config::{ExportFormat, ExportRequest};
use badge_export::core::{DeviceProfile, FixedProfiler};
use badge_export::{ErrorKind, ExportPipeline};
use common::{CountingEncoder, PlainSurface, RecordingSink};

fn jpeg(quality: f32) -> ExportRequest {
    ExportRequest {
        format: ExportFormat::Jpeg,
        quality,
        scale: 1.0,
        width: 160,
        height: 160,
    }
}

fn pipeline(profile: DeviceProfile, encoder: Arc<CountingEncoder>, sink: RecordingSink) -> ExportPipeline {
    ExportPipeline::builder()
        .with_profiler(FixedProfiler(profile))
        .with_encoder(encoder)
        .with_sink(sink)
        .build()
        .unwrap()
}

#[tokio::test]
async fn constrained_first_attempt_is_clamped() {
    let encoder = CountingEncoder::new();
    let p = pipeline(DeviceProfile::constrained(), encoder.clone(), RecordingSink::default());
    p.export(&PlainSurface::new(100.0, 100.0), jpeg(0.95)).await.unwrap();
    assert_eq!(encoder.attempts(), vec![0.8]);
}

#[tokio::test]
async fn constrained_failure_degrades_to_floor() {
    let encoder = CountingEncoder::failing_above(0.6);
    let p = pipeline(DeviceProfile::constrained(), encoder.clone(), RecordingSink::default());

    let artifact = p.export(&PlainSurface::new(100.0, 100.0), jpeg(0.95)).await.unwrap();

    assert_eq!(encoder.attempts(), vec![0.8, 0.5]);
    assert_eq!(artifact.mime_type, "image/jpeg");
}

#[tokio::test]
async fn constrained_retry_failure_is_an_encode_error() {
    let encoder = CountingEncoder::failing_above(0.1);
    let sink = RecordingSink::default();
    let p = pipeline(DeviceProfile::constrained(), encoder.clone(), sink.clone());

    let err = p.export(&PlainSurface::new(100.0, 100.0), jpeg(0.9)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encode);
    assert_eq!(encoder.attempts(), vec![0.8, 0.5]);
    assert!(sink.downloads().is_empty());
}

#[tokio::test]
async fn at_floor_exactly_one_attempt() {
    let encoder = CountingEncoder::failing_above(0.1);
    let p = pipeline(DeviceProfile::constrained(), encoder.clone(), RecordingSink::default());

    let err = p.export(&PlainSurface::new(100.0, 100.0), jpeg(0.5)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encode);
    assert_eq!(encoder.attempts(), vec![0.5]);
}

#[tokio::test]
async fn unconstrained_failure_is_never_retried() {
    let encoder = CountingEncoder::failing_above(0.6);
    let sink = RecordingSink::default();
    let p = pipeline(DeviceProfile::unconstrained(), encoder.clone(), sink.clone());

    let err = p.export(&PlainSurface::new(100.0, 100.0), jpeg(0.95)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encode);
    assert_eq!(encoder.attempts(), vec![0.95]);
    assert!(sink.downloads().is_empty());
}
