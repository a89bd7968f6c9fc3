//! # Live Badge Surface
//!
//! A circular badge drawn from a [`CertificateData`] record and a [`Theme`]:
//!
//! ```text
//!        .-~~~~~-.
//!      /  * title *  \        135° gradient disc
//!     |  ███ name ███ |       pulsing outer ring
//!     |   ▬ cert ▬    |       star ring orbiting every 20 s
//!      \   ▬ date ▬  /        text rows as glyph bars
//!        `-._____.-'
//! ```
//!
//! The live surface keeps an animation clock that starts when it is built.
//! An inert copy samples that clock once; with animations frozen the copy is
//! pinned to the rest pose, so the same record, theme and pixel size always
//! paint the same bitmap. Pixels outside the disc are fully transparent.

use std::f32::consts::{PI, TAU};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Result, bail};
use image::{Rgb, Rgba, RgbaImage};

use super::theme::{Theme, lerp};
use crate::capture::{CaptureOverrides, InertSurface, ResolvedResources, ResourceRef, Surface, SurfaceLayout};
use crate::config::CertificateData;

/// On-screen diameter in layout pixels on wide screens.
pub const DEFAULT_SIZE: f64 = 320.0;

/// Largest side the offscreen rasterizer will allocate.
pub const MAX_RASTER_SIDE: u32 = 16_384;

const STAR_COUNT: usize = 12;
const STAR_ORBIT: f32 = 0.8;
const STAR_RADIUS: f32 = 0.035;
const STAR_PERIOD_SECS: f32 = 20.0;
const RING_WIDTH: f32 = 0.025;
const RING_PERIOD_SECS: f32 = 4.0;
const RING_REST_OPACITY: f32 = 0.3;

pub struct BadgeSurface {
    record: CertificateData,
    theme: Theme,
    size: f64,
    started: Instant,
    attached: AtomicBool,
    resources: Vec<ResourceRef>,
}

impl BadgeSurface {
    pub fn new(record: CertificateData) -> Self {
        let theme = Theme::get(record.theme);
        Self {
            record,
            theme,
            size: DEFAULT_SIZE,
            started: Instant::now(),
            attached: AtomicBool::new(true),
            resources: Vec::new(),
        }
    }

    /// Set the on-screen diameter (layout pixels).
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Declare fonts/images the badge paints with.
    pub fn with_resources(mut self, resources: Vec<ResourceRef>) -> Self {
        self.resources = resources;
        self
    }

    pub fn record(&self) -> &CertificateData {
        &self.record
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Remove the badge from the visual tree.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// The live badge animates for as long as it is on screen.
    pub fn is_animating(&self) -> bool {
        self.is_attached()
    }

    /// Seconds on the live animation clock.
    pub fn animation_time(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

impl Surface for BadgeSurface {
    fn label(&self) -> String {
        format!("badge({:?})", self.record.theme)
    }

    fn layout(&self) -> Option<SurfaceLayout> {
        self.is_attached().then_some(SurfaceLayout {
            width: self.size,
            height: self.size,
        })
    }

    fn resources(&self) -> Vec<ResourceRef> {
        self.resources.clone()
    }

    fn inert_copy(&self, overrides: &CaptureOverrides) -> Result<Box<dyn InertSurface>> {
        let time = if overrides.freeze_animations {
            None
        } else {
            Some(self.animation_time())
        };
        Ok(Box::new(BadgeFrame {
            theme: self.theme.clone(),
            time,
            smooth_text: overrides.font_smoothing,
            name_chars: self.record.name.trim().chars().count(),
            cert_chars: self.record.certificate_type.label().chars().count(),
            message_chars: self
                .record
                .custom_message
                .as_deref()
                .map(|m| m.chars().count())
                .unwrap_or(0),
        }))
    }
}

/// A frozen snapshot of the badge, independent of the live surface.
struct BadgeFrame {
    theme: Theme,
    /// Animation clock at copy time; `None` when pinned to the rest pose
    time: Option<f32>,
    smooth_text: bool,
    name_chars: usize,
    cert_chars: usize,
    message_chars: usize,
}

/// A horizontal glyph bar centred on the disc's vertical axis, in unit-disc
/// coordinates.
struct TextRow {
    color: Rgb<u8>,
    center_y: f32,
    half_width: f32,
    half_height: f32,
}

impl BadgeFrame {
    fn star_rotation(&self) -> f32 {
        self.time.map_or(0.0, |t| (t / STAR_PERIOD_SECS).fract() * TAU)
    }

    fn ring_opacity(&self) -> f32 {
        self.time.map_or(RING_REST_OPACITY, |t| {
            RING_REST_OPACITY * (PI * (t / RING_PERIOD_SECS).fract()).sin()
        })
    }

    fn rows(&self) -> Vec<TextRow> {
        let bar = |chars: usize, per_char: f32, max: f32| (chars as f32 * per_char).clamp(per_char, max);
        let mut rows = vec![
            TextRow {
                color: self.theme.text_color,
                center_y: -0.38,
                half_width: 0.3,
                half_height: 0.035,
            },
            TextRow {
                color: self.theme.name_color,
                center_y: -0.08,
                half_width: bar(self.name_chars, 0.07, 0.6),
                half_height: 0.09,
            },
            TextRow {
                color: self.theme.cert_color,
                center_y: 0.16,
                half_width: bar(self.cert_chars, 0.045, 0.6),
                half_height: 0.04,
            },
            TextRow {
                color: self.theme.date_color,
                center_y: 0.32,
                half_width: 0.28,
                half_height: 0.03,
            },
        ];
        if self.message_chars > 0 {
            rows.push(TextRow {
                color: self.theme.text_color,
                center_y: 0.48,
                half_width: bar(self.message_chars, 0.012, 0.45),
                half_height: 0.022,
            });
        }
        rows
    }
}

impl InertSurface for BadgeFrame {
    fn rasterize(&self, width: u32, height: u32, resources: &ResolvedResources) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            bail!("cannot allocate a {}x{} canvas", width, height);
        }
        if width > MAX_RASTER_SIDE || height > MAX_RASTER_SIDE {
            bail!(
                "canvas {}x{} exceeds the {} px rasterizer limit",
                width,
                height,
                MAX_RASTER_SIDE
            );
        }

        let (w, h) = (width as f32, height as f32);
        // one device pixel in unit-disc coordinates
        let pixel = 2.0 / w.min(h);
        let rotation = self.star_rotation();
        let ring = self.ring_opacity();
        let rows = self.rows();
        let stars: Vec<(f32, f32)> = (0..STAR_COUNT)
            .map(|k| {
                let angle = rotation + k as f32 * TAU / STAR_COUNT as f32;
                (STAR_ORBIT * angle.cos(), STAR_ORBIT * angle.sin())
            })
            .collect();
        // fallback glyphs paint lighter than the real font
        let glyph_opacity = if resources.fonts().next().is_some() { 0.95 } else { 0.8 };

        let mut image = RgbaImage::new(width, height);
        for (x, y, px) in image.enumerate_pixels_mut() {
            let u = (x as f32 + 0.5) / w;
            let v = (y as f32 + 0.5) / h;
            let dx = u * 2.0 - 1.0;
            let dy = v * 2.0 - 1.0;
            let r = (dx * dx + dy * dy).sqrt();

            let coverage = ((1.0 - r) / pixel + 0.5).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }

            let mut color = self.theme.gradient_at((u + v) / 2.0);

            if r > 1.0 - RING_WIDTH {
                color = lerp(color, self.theme.star_color, ring);
            }

            for &(sx, sy) in &stars {
                let d = ((dx - sx).powi(2) + (dy - sy).powi(2)).sqrt();
                let a = ((STAR_RADIUS - d) / pixel + 0.5).clamp(0.0, 1.0);
                if a > 0.0 {
                    color = lerp(color, self.theme.star_color, a);
                }
            }

            for row in &rows {
                let ex = row.half_width - dx.abs();
                let ey = row.half_height - (dy - row.center_y).abs();
                let a = if self.smooth_text {
                    (ex / pixel + 0.5).clamp(0.0, 1.0) * (ey / pixel + 0.5).clamp(0.0, 1.0)
                } else if ex >= 0.0 && ey >= 0.0 {
                    1.0
                } else {
                    0.0
                };
                if a > 0.0 {
                    color = lerp(color, row.color, a * glyph_opacity);
                }
            }

            *px = Rgba([color[0], color[1], color[2], (coverage * 255.0).round() as u8]);
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeId;

    fn badge() -> BadgeSurface {
        let record = CertificateData {
            theme: ThemeId::DigitalOcean,
            ..CertificateData::default()
        };
        BadgeSurface::new(record).with_size(64.0)
    }

    fn frozen() -> CaptureOverrides {
        CaptureOverrides::default()
    }

    #[test]
    fn detached_badge_has_no_layout() {
        let surface = badge();
        assert_eq!(surface.layout(), Some(SurfaceLayout { width: 64.0, height: 64.0 }));
        surface.detach();
        assert!(surface.layout().is_none());
        assert!(!surface.is_animating());
        surface.attach();
        assert!(surface.layout().is_some());
    }

    #[test]
    fn disc_is_opaque_and_corners_transparent() {
        let surface = badge();
        let copy = surface.inert_copy(&frozen()).unwrap();
        let img = copy.rasterize(128, 128, &ResolvedResources::default()).unwrap();
        assert_eq!(img.get_pixel(64, 64)[3], 255);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(127, 127)[3], 0);
        assert_eq!(img.get_pixel(127, 0)[3], 0);
    }

    #[test]
    fn frozen_copies_are_deterministic() {
        let surface = badge();
        let a = surface.inert_copy(&frozen()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let b = surface.inert_copy(&frozen()).unwrap();
        let res = ResolvedResources::default();
        assert_eq!(a.rasterize(96, 96, &res).unwrap(), b.rasterize(96, 96, &res).unwrap());
    }

    #[test]
    fn freezing_leaves_the_live_badge_animating() {
        let surface = badge();
        let before = surface.animation_time();
        surface.inert_copy(&frozen()).unwrap();
        assert!(surface.is_animating());
        assert!(surface.animation_time() >= before);
    }

    #[test]
    fn oversized_canvas_is_refused() {
        let copy = badge().inert_copy(&frozen()).unwrap();
        let res = ResolvedResources::default();
        assert!(copy.rasterize(0, 10, &res).is_err());
        assert!(copy.rasterize(MAX_RASTER_SIDE + 1, 10, &res).is_err());
    }
}
