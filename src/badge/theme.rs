//! Theme catalog. Each theme is a 135° gradient for the disc plus accent
//! colours for the text rows and star decorations.

use image::Rgb;

use crate::config::ThemeId;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub id: ThemeId,
    pub name: &'static str,
    /// Gradient stops as (offset in 0..=1, colour), ascending offsets
    pub gradient: &'static [(f32, Rgb<u8>)],
    pub text_color: Rgb<u8>,
    pub name_color: Rgb<u8>,
    pub cert_color: Rgb<u8>,
    pub date_color: Rgb<u8>,
    pub star_color: Rgb<u8>,
}

const fn hex(v: u32) -> Rgb<u8> {
    Rgb([(v >> 16) as u8, (v >> 8) as u8, v as u8])
}

const WHITE: Rgb<u8> = hex(0xffffff);

const TITANIUM_ROSE: &[(f32, Rgb<u8>)] = &[
    (0.0, hex(0x2d1b2e)),
    (0.25, hex(0x5d4e75)),
    (0.5, hex(0x8b7ca6)),
    (0.75, hex(0xc8b2db)),
    (1.0, hex(0xf3e8ff)),
];

const CRIMSON_CORE: &[(f32, Rgb<u8>)] = &[
    (0.0, hex(0x1a0404)),
    (0.25, hex(0x8b0000)),
    (0.5, hex(0xdc143c)),
    (0.75, hex(0xff6347)),
    (1.0, hex(0xffd700)),
];

const DIGITAL_OCEAN: &[(f32, Rgb<u8>)] = &[
    (0.0, hex(0x0a0a23)),
    (0.25, hex(0x1e3a8a)),
    (0.5, hex(0x1e40af)),
    (0.75, hex(0x3b82f6)),
    (1.0, hex(0x60a5fa)),
];

const CHERRY_BLOSSOM: &[(f32, Rgb<u8>)] = &[
    (0.0, hex(0x4a0e2e)),
    (0.5, hex(0x8b2252)),
    (1.0, hex(0xc75a8a)),
];

impl Theme {
    pub fn get(id: ThemeId) -> Theme {
        match id {
            ThemeId::TitaniumRose => Theme {
                id,
                name: "星辰玫瑰",
                gradient: TITANIUM_ROSE,
                text_color: WHITE,
                name_color: hex(0xf8bbd9),
                cert_color: hex(0xe879f9),
                date_color: hex(0xddd6fe),
                star_color: hex(0xc084fc),
            },
            ThemeId::CrimsonCore => Theme {
                id,
                name: "赤金荣耀",
                gradient: CRIMSON_CORE,
                text_color: WHITE,
                name_color: hex(0xffd700),
                cert_color: hex(0xff8c00),
                date_color: hex(0xffa07a),
                star_color: hex(0xff4500),
            },
            ThemeId::DigitalOcean => Theme {
                id,
                name: "静谧深蓝",
                gradient: DIGITAL_OCEAN,
                text_color: WHITE,
                name_color: hex(0x00d4ff),
                cert_color: hex(0x38bdf8),
                date_color: hex(0x7dd3fc),
                star_color: hex(0x0ea5e9),
            },
            ThemeId::CherryBlossom => Theme {
                id,
                name: "春日序曲",
                gradient: CHERRY_BLOSSOM,
                text_color: WHITE,
                name_color: hex(0xffb6c1),
                cert_color: hex(0xffc0cb),
                date_color: hex(0xffd1dc),
                star_color: hex(0xffe4e1),
            },
        }
    }

    /// Sample the gradient at `t`, clamped to `0..=1`.
    pub fn gradient_at(&self, t: f32) -> Rgb<u8> {
        let t = t.clamp(0.0, 1.0);
        let stops = self.gradient;
        let Some(first) = stops.first() else {
            return WHITE;
        };
        if t <= first.0 {
            return first.1;
        }
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.0 {
                let span = (b.0 - a.0).max(f32::EPSILON);
                return lerp(a.1, b.1, (t - a.0) / span);
            }
        }
        stops[stops.len() - 1].1
    }
}

pub(crate) fn lerp(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}
