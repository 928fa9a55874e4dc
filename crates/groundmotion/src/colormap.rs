//! Colormaps and value normalisation for filled contour panels.
//!
//! Colormaps are sampled into fixed lookup tables so that palette sub-ranges
//! (see the elevation levels) can be addressed by integer index.

use crate::constants::COLORMAP_SIZE;
use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColormapName {
    YlOrRd,
    OrRd,
    #[serde(rename = "Spectral_r")]
    SpectralR,
    #[serde(rename = "turbo")]
    Turbo,
    #[serde(rename = "terrain")]
    Terrain,
}

impl ColormapName {
    pub fn as_str(self) -> &'static str {
        match self {
            ColormapName::YlOrRd => "YlOrRd",
            ColormapName::OrRd => "OrRd",
            ColormapName::SpectralR => "Spectral_r",
            ColormapName::Turbo => "turbo",
            ColormapName::Terrain => "terrain",
        }
    }
}

// ColorBrewer sequential/diverging schemes, evenly spaced anchors.
const YL_OR_RD: [Rgb; 9] = [
    [0xff, 0xff, 0xcc],
    [0xff, 0xed, 0xa0],
    [0xfe, 0xd9, 0x76],
    [0xfe, 0xb2, 0x4c],
    [0xfd, 0x8d, 0x3c],
    [0xfc, 0x4e, 0x2a],
    [0xe3, 0x1a, 0x1c],
    [0xbd, 0x00, 0x26],
    [0x80, 0x00, 0x26],
];

const OR_RD: [Rgb; 9] = [
    [0xff, 0xf7, 0xec],
    [0xfe, 0xe8, 0xc8],
    [0xfd, 0xd4, 0x9e],
    [0xfd, 0xbb, 0x84],
    [0xfc, 0x8d, 0x59],
    [0xef, 0x65, 0x48],
    [0xd7, 0x30, 0x1f],
    [0xb3, 0x00, 0x00],
    [0x7f, 0x00, 0x00],
];

// Reversed: low values blue, high values red.
const SPECTRAL_R: [Rgb; 11] = [
    [0x5e, 0x4f, 0xa2],
    [0x32, 0x88, 0xbd],
    [0x66, 0xc2, 0xa5],
    [0xab, 0xdd, 0xa4],
    [0xe6, 0xf5, 0x98],
    [0xff, 0xff, 0xbf],
    [0xfe, 0xe0, 0x8b],
    [0xfd, 0xae, 0x61],
    [0xf4, 0x6d, 0x43],
    [0xd5, 0x3e, 0x4f],
    [0x9e, 0x01, 0x42],
];

// Polynomial fit of the turbo rainbow, coefficients in ascending powers.
const TURBO_FIT: [[f64; 6]; 3] = [
    [0.13572138, 4.61539260, -42.66032258, 132.13108234, -152.94239396, 59.28637943],
    [0.09140261, 2.19418839, 4.84296658, -14.18503333, 4.27729857, 2.82956604],
    [0.10667330, 12.64194608, -60.58204836, 110.36276771, -89.90310912, 27.34824973],
];

/// Deep water → shallow water → lowland → highland → rock → snow.
const TERRAIN: [(f64, [f64; 3]); 6] = [
    (0.00, [0.2, 0.2, 0.6]),
    (0.15, [0.0, 0.6, 1.0]),
    (0.25, [0.0, 0.8, 0.4]),
    (0.50, [1.0, 1.0, 0.6]),
    (0.75, [0.5, 0.36, 0.33]),
    (1.00, [1.0, 1.0, 1.0]),
];

/// A colormap sampled into a lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    colors: Vec<Rgb>,
}

impl Colormap {
    pub fn named(name: ColormapName) -> Self {
        match name {
            ColormapName::YlOrRd => Self::from_swatches(name.as_str(), &YL_OR_RD),
            ColormapName::OrRd => Self::from_swatches(name.as_str(), &OR_RD),
            ColormapName::SpectralR => Self::from_swatches(name.as_str(), &SPECTRAL_R),
            ColormapName::Turbo => Self::turbo(),
            ColormapName::Terrain => Self::from_anchors(name.as_str(), &TERRAIN, COLORMAP_SIZE),
        }
    }

    fn turbo() -> Self {
        let colors = (0..COLORMAP_SIZE)
            .map(|i| {
                let x = i as f64 / (COLORMAP_SIZE - 1) as f64;
                let channel = |c: &[f64; 6]| c.iter().rev().fold(0.0, |acc, k| acc * x + k);
                to_rgb8([
                    channel(&TURBO_FIT[0]),
                    channel(&TURBO_FIT[1]),
                    channel(&TURBO_FIT[2]),
                ])
            })
            .collect();
        Self {
            name: ColormapName::Turbo.as_str().to_string(),
            colors,
        }
    }

    pub fn terrain() -> Self {
        Self::named(ColormapName::Terrain)
    }

    /// Builds a colormap from evenly spaced color swatches.
    fn from_swatches(name: &str, swatches: &[Rgb]) -> Self {
        let last = (swatches.len() - 1) as f64;
        let anchors: Vec<(f64, [f64; 3])> = swatches
            .iter()
            .enumerate()
            .map(|(i, c)| {
                (
                    i as f64 / last,
                    [c[0] as f64 / 255.0, c[1] as f64 / 255.0, c[2] as f64 / 255.0],
                )
            })
            .collect();
        Self::from_anchors(name, &anchors, COLORMAP_SIZE)
    }

    /// Samples a piecewise-linear gradient defined by `(position, rgb)` anchors
    /// (positions ascending in `[0, 1]`, channels in `[0, 1]`) into `size` entries.
    pub fn from_anchors(name: &str, anchors: &[(f64, [f64; 3])], size: usize) -> Self {
        let colors = (0..size)
            .map(|i| {
                let x = if size > 1 { i as f64 / (size - 1) as f64 } else { 0.0 };
                let upper = anchors
                    .iter()
                    .position(|(pos, _)| *pos >= x)
                    .unwrap_or(anchors.len() - 1);
                let rgb = if upper == 0 {
                    anchors[0].1
                } else {
                    let (x0, c0) = anchors[upper - 1];
                    let (x1, c1) = anchors[upper];
                    let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
                    lerp_rgb(c0, c1, t)
                };
                to_rgb8(rgb)
            })
            .collect();
        Self {
            name: name.to_string(),
            colors,
        }
    }

    /// A colormap made of exactly the given colors.
    pub fn listed(name: &str, colors: Vec<Rgb>) -> Self {
        Self {
            name: name.to_string(),
            colors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color at normalised position `t`; values outside `[0, 1]` clamp to the
    /// end colors and NaN maps to the first color.
    pub fn sample(&self, t: f64) -> Rgb {
        let n = self.colors.len();
        if n == 0 {
            return [0, 0, 0];
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let index = ((t * n as f64) as usize).min(n - 1);
        self.colors[index]
    }

    pub fn first(&self) -> Rgb {
        self.sample(0.0)
    }

    pub fn last(&self) -> Rgb {
        self.sample(1.0)
    }

    /// Entries `start..end` as a new listed colormap, or `None` if the range is
    /// empty or out of bounds.
    pub fn sub_range(&self, start: usize, end: usize) -> Option<Colormap> {
        if start >= end || end > self.colors.len() {
            return None;
        }
        Some(Self::listed(
            &format!("{}[{start}:{end}]", self.name),
            self.colors[start..end].to_vec(),
        ))
    }
}

/// Maps data values onto `[0, 1]` colormap positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Norm {
    Linear { vmin: f64, vmax: f64 },
    Log { vmin: f64, vmax: f64 },
}

impl Norm {
    /// Normalised position of `value`. A zero-width range maps everything to 0.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Norm::Linear { vmin, vmax } => {
                if vmax == vmin {
                    0.0
                } else {
                    (value - vmin) / (vmax - vmin)
                }
            }
            Norm::Log { vmin, vmax } => {
                if vmax == vmin {
                    return 0.0;
                }
                if value <= 0.0 {
                    return f64::NEG_INFINITY;
                }
                (value.ln() - vmin.ln()) / (vmax.ln() - vmin.ln())
            }
        }
    }

    /// Inverse of [`Norm::apply`].
    pub fn invert(&self, t: f64) -> f64 {
        match *self {
            Norm::Linear { vmin, vmax } => vmin + t * (vmax - vmin),
            Norm::Log { vmin, vmax } => (vmin.ln() + t * (vmax.ln() - vmin.ln())).exp(),
        }
    }

    /// Value halfway between two levels in this norm's space.
    pub fn midpoint(&self, a: f64, b: f64) -> f64 {
        match self {
            Norm::Linear { .. } => 0.5 * (a + b),
            Norm::Log { .. } => (a * b).sqrt(),
        }
    }

    pub fn vmin(&self) -> f64 {
        match *self {
            Norm::Linear { vmin, .. } | Norm::Log { vmin, .. } => vmin,
        }
    }

    pub fn vmax(&self) -> f64 {
        match *self {
            Norm::Linear { vmax, .. } | Norm::Log { vmax, .. } => vmax,
        }
    }
}

fn lerp_rgb(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn to_rgb8(c: [f64; 3]) -> Rgb {
    [
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ColormapName::YlOrRd, [0xff, 0xff, 0xcc], [0x80, 0x00, 0x26])]
    #[case(ColormapName::OrRd, [0xff, 0xf7, 0xec], [0x7f, 0x00, 0x00])]
    #[case(ColormapName::SpectralR, [0x5e, 0x4f, 0xa2], [0x9e, 0x01, 0x42])]
    fn test_swatch_endpoints(#[case] name: ColormapName, #[case] first: Rgb, #[case] last: Rgb) {
        let cmap = Colormap::named(name);
        assert_eq!(cmap.len(), COLORMAP_SIZE);
        assert_eq!(cmap.first(), first);
        assert_eq!(cmap.last(), last);
    }

    #[test]
    fn test_terrain_anchors() {
        let cmap = Colormap::terrain();
        assert_eq!(cmap.first(), [51, 51, 153]);
        assert_eq!(cmap.last(), [255, 255, 255]);
        // Halfway up the palette sits the pale lowland yellow.
        let mid = cmap.colors()[128];
        assert!(mid[0] > 240 && mid[1] > 240 && mid[2] < 170, "mid was {mid:?}");
    }

    #[test]
    fn test_turbo_runs_dark_to_green_to_red() {
        let cmap = Colormap::named(ColormapName::Turbo);
        assert_eq!(cmap.len(), COLORMAP_SIZE);
        assert_eq!(cmap.name(), "turbo");
        let first = cmap.first();
        assert!(first.iter().all(|c| *c < 60), "first was {first:?}");
        let mid = cmap.colors()[128];
        assert!(mid[1] > 230 && mid[1] > mid[0] && mid[1] > mid[2], "mid was {mid:?}");
        let last = cmap.last();
        assert!(last[0] > 120 && last[1] < 30 && last[2] < 30, "last was {last:?}");
    }

    #[test]
    fn test_sample_clamps() {
        let cmap = Colormap::named(ColormapName::YlOrRd);
        assert_eq!(cmap.sample(-3.0), cmap.first());
        assert_eq!(cmap.sample(7.0), cmap.last());
        assert_eq!(cmap.sample(f64::NAN), cmap.first());
    }

    #[test]
    fn test_sub_range() {
        let cmap = Colormap::terrain();
        let sub = cmap.sub_range(10, 230).unwrap();
        assert_eq!(sub.len(), 220);
        assert_eq!(sub.first(), cmap.colors()[10]);
        assert_eq!(sub.last(), cmap.colors()[229]);
        assert!(cmap.sub_range(100, 100).is_none());
        assert!(cmap.sub_range(0, 257).is_none());
    }

    #[rstest]
    #[case(Norm::Linear { vmin: 0.0, vmax: 10.0 }, 5.0, 0.5)]
    #[case(Norm::Linear { vmin: -800.0, vmax: 4200.0 }, -800.0, 0.0)]
    #[case(Norm::Log { vmin: 0.01, vmax: 1.0 }, 0.1, 0.5)]
    #[case(Norm::Log { vmin: 0.01, vmax: 1.0 }, 1.0, 1.0)]
    #[case(Norm::Log { vmin: 2.0, vmax: 2.0 }, 2.0, 0.0)]
    fn test_norm_apply(#[case] norm: Norm, #[case] value: f64, #[case] expected: f64) {
        assert!((norm.apply(value) - expected).abs() < 1e-12, "got {}", norm.apply(value));
    }

    #[test]
    fn test_norm_invert_round_trip() {
        let norm = Norm::Log { vmin: 0.002, vmax: 5.0 };
        for t in [0.0, 0.25, 0.5, 1.0] {
            assert!((norm.apply(norm.invert(t)) - t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_log_norm_of_non_positive() {
        let norm = Norm::Log { vmin: 0.1, vmax: 1.0 };
        assert_eq!(norm.apply(0.0), f64::NEG_INFINITY);
    }
}
