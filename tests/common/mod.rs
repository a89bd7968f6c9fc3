//! Shared mocks for the export pipeline integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use badge_export::capture::{
    CaptureOverrides, InertSurface, ResolvedResources, ResourceLoader, ResourceRef, Surface, SurfaceLayout,
};
use badge_export::config::ExportFormat;
use badge_export::core::{ExportArtifact, FinalBitmap};
use badge_export::processing::{BitmapEncoder, DownloadSink, ImageCrateEncoder};
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};

pub fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

/// Opaque gradient surface of any size. Records every raster size it was
/// asked for.
pub struct PlainSurface {
    pub width: f64,
    pub height: f64,
    pub attached: bool,
    pub resources: Vec<ResourceRef>,
    pub raster_sizes: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl PlainSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            attached: true,
            resources: Vec::new(),
            raster_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_resources(mut self, resources: Vec<ResourceRef>) -> Self {
        self.resources = resources;
        self
    }

    pub fn raster_sizes(&self) -> Vec<(u32, u32)> {
        self.raster_sizes.lock().unwrap().clone()
    }
}

struct PlainCopy {
    raster_sizes: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl InertSurface for PlainCopy {
    fn rasterize(&self, width: u32, height: u32, _: &ResolvedResources) -> Result<RgbaImage> {
        self.raster_sizes.lock().unwrap().push((width, height));
        Ok(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }
}

impl Surface for PlainSurface {
    fn label(&self) -> String {
        format!("plain {}x{}", self.width, self.height)
    }

    fn layout(&self) -> Option<SurfaceLayout> {
        self.attached.then_some(SurfaceLayout {
            width: self.width,
            height: self.height,
        })
    }

    fn resources(&self) -> Vec<ResourceRef> {
        self.resources.clone()
    }

    fn inert_copy(&self, _: &CaptureOverrides) -> Result<Box<dyn InertSurface>> {
        Ok(Box::new(PlainCopy {
            raster_sizes: self.raster_sizes.clone(),
        }))
    }
}

/// Real encoder that records the quality of every attempt and fails any
/// attempt above `fail_above`.
#[derive(Default)]
pub struct CountingEncoder {
    pub fail_above: Option<f32>,
    attempts: Mutex<Vec<f32>>,
}

impl CountingEncoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_above(quality: f32) -> Arc<Self> {
        Arc::new(Self {
            fail_above: Some(quality),
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> Vec<f32> {
        self.attempts.lock().unwrap().clone()
    }
}

impl BitmapEncoder for CountingEncoder {
    fn encode(&self, bitmap: &FinalBitmap, format: ExportFormat, quality: f32) -> Result<Vec<u8>> {
        self.attempts.lock().unwrap().push(quality);
        if self.fail_above.is_some_and(|limit| quality > limit) {
            return Err(anyhow!("canvas ran out of memory"));
        }
        ImageCrateEncoder.encode(bitmap, format, quality)
    }
}

/// Download sink recording `(filename, size)` of each trigger.
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<(String, usize)>>>);

impl RecordingSink {
    pub fn downloads(&self) -> Vec<(String, usize)> {
        self.0.lock().unwrap().clone()
    }
}

impl DownloadSink for RecordingSink {
    fn trigger(&self, filename: &str, artifact: &ExportArtifact) -> Result<()> {
        self.0.lock().unwrap().push((filename.to_string(), artifact.size_bytes));
        Ok(())
    }
}

/// Loader that takes `delay` per resource and counts calls.
pub struct SlowLoader {
    pub delay: Duration,
    calls: AtomicUsize,
}

impl SlowLoader {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLoader for SlowLoader {
    async fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(resource.url.as_bytes().to_vec())
    }
}
