//! Color level selection for the shake map panels.
//!
//! Ground-motion fields get logarithmic levels whose ends are snapped to a
//! ladder of round numbers. Elevation gets a linear ladder anchored at sea
//! level together with a slice of the terrain palette.

use crate::colormap::{Colormap, Norm};
use crate::config::LevelConfig;
use crate::constants::*;
use crate::contour::ContourStyle;
use crate::ticks::covering_levels;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("field has no finite values")]
    Empty,
    #[error("field contains non-finite values")]
    NonFinite,
    #[error("degenerate elevation range [{min}, {max}] with step {step}")]
    DegenerateRange { min: f64, max: f64, step: f64 },
    #[error("terrain palette range {start}..{end} is empty or not finite")]
    EmptyPalette { start: f64, end: f64 },
}

/// `value` written as `mantissa * 10^exponent` without accumulating rounding
/// error, so equal ladder values compare equal.
fn decade_value(mantissa: u32, exponent: i32) -> f64 {
    let power = 10f64.powi(exponent.abs());
    if exponent < 0 {
        mantissa as f64 / power
    } else {
        mantissa as f64 * power
    }
}

/// `{1, 2, 5} x 10^k` for the ladder decades, topped with 100.
pub fn major_ladder() -> Vec<f64> {
    let mut ladder: Vec<f64> = LADDER_DECADES
        .iter()
        .flat_map(|&e| MAJOR_MANTISSAS.iter().map(move |&m| decade_value(m, e)))
        .collect();
    ladder.push(decade_value(1, LADDER_DECADES[LADDER_DECADES.len() - 1] + 1));
    ladder
}

/// `{1, ..., 9} x 10^k` for the ladder decades, topped with 100.
pub fn minor_ladder() -> Vec<f64> {
    let mut ladder: Vec<f64> = LADDER_DECADES
        .iter()
        .flat_map(|&e| (1..=9).map(move |m| decade_value(m, e)))
        .collect();
    ladder.push(decade_value(1, LADDER_DECADES[LADDER_DECADES.len() - 1] + 1));
    ladder
}

/// Percentile `p` (0..=100) of the finite values, interpolating linearly
/// between neighbouring order statistics.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let rank = p * (sorted.len() - 1) as f64 / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Ladder entry closest to `value`. Exact ties go to the first (lower) entry.
pub fn snap_to_ladder(value: f64, ladder: &[f64]) -> f64 {
    let mut best = ladder[0];
    let mut best_distance = f64::INFINITY;
    for &entry in ladder {
        let distance = (value - entry).powi(2);
        if distance < best_distance {
            best = entry;
            best_distance = distance;
        }
    }
    best
}

/// `count` values spaced evenly in log space from `start` to `end`, both
/// included exactly. Equal endpoints give a constant sequence.
pub fn geomspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 || start == end {
        return vec![start; count];
    }
    let (log_start, log_end) = (start.ln(), end.ln());
    let last = (count - 1) as f64;
    let mut levels: Vec<f64> = (0..count)
        .map(|i| (log_start + (log_end - log_start) * i as f64 / last).exp())
        .collect();
    levels[0] = start;
    levels[count - 1] = end;
    levels
}

/// Ladder entries inside `[lo, hi]`, tolerant to the last bit of rounding.
fn ladder_within(ladder: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let tolerance = 1e-9;
    ladder
        .iter()
        .copied()
        .filter(|v| *v >= lo * (1.0 - tolerance) && *v <= hi * (1.0 + tolerance))
        .collect()
}

/// Logarithmic color levels for one ground-motion field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarLevels {
    pub levels: Vec<f64>,
    pub major_ticks: Vec<f64>,
    pub minor_ticks: Vec<f64>,
    /// The low/high percentiles of the data that picked the range.
    pub percentiles: (f64, f64),
}

impl ScalarLevels {
    pub fn classify(values: &[f64], config: &LevelConfig) -> Result<Self, LevelError> {
        let low = percentile(values, config.low_percentile).ok_or(LevelError::Empty)?;
        let high = percentile(values, config.high_percentile).ok_or(LevelError::Empty)?;

        let major = major_ladder();
        let vmin = snap_to_ladder(low, &major);
        let vmax = snap_to_ladder(high, &major);
        if vmin == vmax {
            log::warn!("Percentiles {low} and {high} snap to the same level {vmin}");
        }

        Ok(Self {
            levels: geomspace(vmin, vmax, config.count),
            major_ticks: ladder_within(&major, vmin, vmax),
            minor_ticks: ladder_within(&minor_ladder(), vmin, vmax),
            percentiles: (low, high),
        })
    }

    pub fn vmin(&self) -> f64 {
        self.levels[0]
    }

    pub fn vmax(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    pub fn norm(&self) -> Norm {
        Norm::Log {
            vmin: self.vmin(),
            vmax: self.vmax(),
        }
    }

    /// Whether `[lo, hi]` lies within the chosen level range.
    pub fn brackets(&self, lo: f64, hi: f64) -> bool {
        self.vmin() <= lo && hi <= self.vmax()
    }

    pub fn contour_style(&self, colormap: Colormap) -> ContourStyle {
        ContourStyle::new(self.levels.clone(), self.norm(), colormap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainPalette {
    /// Entries `start..end` of the terrain palette.
    Custom { start: usize, end: usize },
    /// The whole terrain palette with automatic levels.
    Fallback,
}

/// Linear elevation levels (metres) and the palette they are drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationLevels {
    pub levels: Vec<f64>,
    pub colormap: Colormap,
    pub palette: TerrainPalette,
}

impl ElevationLevels {
    /// Custom sea-level-centred levels, falling back to automatic levels over
    /// the full terrain palette when those can't be built.
    pub fn classify(elevation: &[f64]) -> Self {
        match Self::custom(elevation) {
            Ok(levels) => levels,
            Err(err) => {
                log::warn!("Falling back to the standard terrain palette: {err}");
                Self::fallback(elevation)
            }
        }
    }

    pub fn custom(elevation: &[f64]) -> Result<Self, LevelError> {
        if elevation.is_empty() {
            return Err(LevelError::Empty);
        }
        if elevation.iter().any(|z| !z.is_finite()) {
            return Err(LevelError::NonFinite);
        }
        let (data_min, data_max) = min_max(elevation);

        let min = round_to(data_min.max(ELEVATION_FLOOR), ELEVATION_ROUNDING);
        let max = round_to(data_max.min(ELEVATION_CEILING), ELEVATION_ROUNDING);
        let step = round_to((max - min) / ELEVATION_STEPS, ELEVATION_ROUNDING);
        if !(step > 0.0) || max <= min {
            return Err(LevelError::DegenerateRange { min, max, step });
        }

        let count = ((max - min) / step + 1e-9).floor() as usize + 1;
        let mut levels: Vec<f64> = (0..count).map(|k| min + k as f64 * step).collect();
        if levels[0] < 0.0 {
            // put a level exactly on sea level
            let nearest_zero = levels
                .iter()
                .copied()
                .fold(f64::INFINITY, |best, v| if v.abs() < best.abs() { v } else { best });
            for level in &mut levels {
                *level -= nearest_zero;
            }
        }

        // f64::min swallows NaN, test before clamping
        let start = TERRAIN_INDEX_BASE + min / TERRAIN_DEPTH_DIVISOR;
        let end = TERRAIN_INDEX_BASE + TERRAIN_HEIGHT_SPAN * (max / TERRAIN_HEIGHT_REFERENCE).sqrt();
        if !(start.is_finite() && end.is_finite()) {
            return Err(LevelError::EmptyPalette { start, end });
        }
        let (start, end) = (start.max(TERRAIN_INDEX_MIN), end.min(TERRAIN_INDEX_MAX));
        if start < 0.0 {
            return Err(LevelError::EmptyPalette { start, end });
        }
        let (start_index, end_index) = (start as usize, end as usize);
        let colormap = Colormap::terrain()
            .sub_range(start_index, end_index)
            .ok_or(LevelError::EmptyPalette { start, end })?;

        Ok(Self {
            levels,
            colormap,
            palette: TerrainPalette::Custom {
                start: start_index,
                end: end_index,
            },
        })
    }

    pub fn fallback(elevation: &[f64]) -> Self {
        let finite: Vec<f64> = elevation.iter().copied().filter(|z| z.is_finite()).collect();
        let (lo, hi) = if finite.is_empty() {
            (0.0, 1.0)
        } else {
            let (lo, hi) = min_max(&finite);
            if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) }
        };
        Self {
            levels: covering_levels(lo, hi, FALLBACK_ELEVATION_BINS),
            colormap: Colormap::terrain(),
            palette: TerrainPalette::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.palette == TerrainPalette::Fallback
    }

    pub fn norm(&self) -> Norm {
        Norm::Linear {
            vmin: self.levels[0],
            vmax: self.levels[self.levels.len() - 1],
        }
    }

    pub fn contour_style(&self) -> ContourStyle {
        ContourStyle::new(self.levels.clone(), self.norm(), self.colormap.clone())
    }
}

/// Rounds to the nearest multiple of `unit`, halves to even.
fn round_to(value: f64, unit: f64) -> f64 {
    (value / unit).round_ties_even() * unit
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_major_ladder() {
        assert_eq!(
            major_ladder(),
            vec![
                0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0,
                50.0, 100.0
            ]
        );
    }

    #[test]
    fn test_minor_ladder() {
        let ladder = minor_ladder();
        assert_eq!(ladder.len(), 46);
        assert_eq!(ladder[0], 0.001);
        assert_eq!(ladder[9], 0.01);
        assert_eq!(*ladder.last().unwrap(), 100.0);
        assert!(ladder.windows(2).all(|w| w[0] < w[1]));
        // every major entry is also a minor entry
        for major in major_ladder() {
            assert!(ladder.contains(&major), "{major} missing");
        }
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(100.0, 5.0)]
    #[case(50.0, 3.0)]
    #[case(25.0, 2.0)]
    #[case(10.0, 1.4)]
    fn test_percentile(#[case] p: f64, #[case] expected: f64) {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((percentile(&values, p).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_ignores_non_finite() {
        assert_eq!(percentile(&[f64::NAN, 2.0, f64::INFINITY], 50.0), Some(2.0));
        assert_eq!(percentile(&[f64::NAN], 50.0), None);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[rstest]
    #[case(0.0116, 0.01)]
    #[case(0.048, 0.05)]
    #[case(3.4, 2.0)]
    #[case(3.6, 5.0)]
    #[case(1e6, 100.0)]
    #[case(-4.0, 0.001)]
    fn test_snap_to_ladder(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(snap_to_ladder(value, &major_ladder()), expected);
    }

    #[test]
    fn test_snap_tie_prefers_lower_entry() {
        // 1.5 is exactly 0.25 (squared) away from both 1 and 2
        assert_eq!(snap_to_ladder(1.5, &major_ladder()), 1.0);
        // 15 is exactly 25 (squared) away from both 10 and 20
        assert_eq!(snap_to_ladder(15.0, &major_ladder()), 10.0);
    }

    #[test]
    fn test_classify_tie_break_regression() {
        // 101 samples put the 4th/96th percentiles exactly on samples 4 and 96
        let mut values = vec![0.5; 101];
        for v in values.iter_mut().skip(4).take(92) {
            *v = 3.0;
        }
        values[4] = 1.5;
        for v in values.iter_mut().skip(96) {
            *v = 15.0;
        }
        let levels = ScalarLevels::classify(&values, &LevelConfig::default()).unwrap();
        assert_eq!(levels.percentiles, (1.5, 15.0));
        assert_eq!(levels.vmin(), 1.0);
        assert_eq!(levels.vmax(), 10.0);
    }

    #[test]
    fn test_geomspace() {
        let levels = geomspace(0.01, 100.0, 5);
        let expected = [0.01, 0.1, 1.0, 10.0, 100.0];
        for (a, b) in levels.iter().zip(expected) {
            assert!((a / b - 1.0).abs() < 1e-12, "{a} vs {b}");
        }
        assert_eq!(levels[0], 0.01);
        assert_eq!(levels[4], 100.0);
        assert_eq!(geomspace(2.0, 2.0, 14), vec![2.0; 14]);
    }

    #[rstest]
    #[case(vec![0.012, 0.03, 0.045, 0.02, 0.049, 0.011])]
    #[case(vec![0.2, 0.25, 0.3, 0.45, 0.11])]
    #[case(vec![1.0, 1.0, 1.0])]
    #[case(vec![0.0001, 3.0, 250.0, 42.0])]
    fn test_scalar_levels_shape(#[case] values: Vec<f64>) {
        let ladder = major_ladder();
        let levels = ScalarLevels::classify(&values, &LevelConfig::default()).unwrap();
        assert_eq!(levels.levels.len(), SCALAR_LEVEL_COUNT);
        assert!(levels.levels.windows(2).all(|w| w[0] <= w[1]));
        assert!(ladder.contains(&levels.vmin()));
        assert!(ladder.contains(&levels.vmax()));
        assert!(levels.major_ticks.iter().all(|t| *t >= levels.vmin() && *t <= levels.vmax()));
        assert!(levels.minor_ticks.len() >= levels.major_ticks.len());
    }

    #[test]
    fn test_scalar_ticks_inclusive() {
        let values: Vec<f64> = (0..100).map(|i| 0.1 + 0.4 * i as f64 / 99.0).collect();
        let levels = ScalarLevels::classify(&values, &LevelConfig::default()).unwrap();
        assert_eq!((levels.vmin(), levels.vmax()), (0.1, 0.5));
        assert_eq!(levels.major_ticks, vec![0.1, 0.2, 0.5]);
        assert_eq!(levels.minor_ticks, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert!(levels.brackets(levels.percentiles.0, levels.percentiles.1));
    }

    #[test]
    fn test_scalar_levels_empty() {
        assert_eq!(
            ScalarLevels::classify(&[], &LevelConfig::default()),
            Err(LevelError::Empty)
        );
    }

    #[test]
    fn test_elevation_full_range() {
        let elevation = [-2500.0, 0.0, 1200.0, 6000.0];
        let levels = ElevationLevels::custom(&elevation).unwrap();
        // clamped to [-800, 4500], step round(5300 / 13) = 400
        assert_eq!(levels.levels[0], -800.0);
        assert_eq!(levels.levels[1], -400.0);
        assert!(levels.levels.contains(&0.0));
        assert_eq!(*levels.levels.last().unwrap(), 4400.0);
        assert_eq!(levels.palette, TerrainPalette::Custom { start: 10, end: 230 });
        assert_eq!(levels.colormap.len(), 220);
    }

    #[test]
    fn test_elevation_shifts_to_sea_level() {
        let elevation = [-730.0, 2480.0];
        let levels = ElevationLevels::custom(&elevation).unwrap();
        // min -700, max 2500, step round(3200 / 13) = 200 → -700, -500, ..., 2500
        // -100 and 100 tie for nearest zero; the first one wins
        assert_eq!(levels.levels[0], -600.0);
        assert!(levels.levels.contains(&0.0));
        assert_eq!(*levels.levels.last().unwrap(), 2600.0);
        assert!(levels.levels.windows(2).all(|w| (w[1] - w[0] - 200.0).abs() < 1e-9));
        // start = max(50 - 35, 10) = 15, end = 50 + 180 * sqrt(2500 / 4500) ≈ 184.2
        assert_eq!(levels.palette, TerrainPalette::Custom { start: 15, end: 184 });
    }

    #[test]
    fn test_elevation_above_sea_level_is_not_shifted() {
        let elevation = [300.0, 1600.0];
        let levels = ElevationLevels::custom(&elevation).unwrap();
        assert_eq!(levels.levels[0], 300.0);
        assert_eq!(*levels.levels.last().unwrap(), 1600.0);
        match levels.palette {
            TerrainPalette::Custom { start, end } => {
                assert_eq!(start, 65);
                assert!(start < end);
            }
            TerrainPalette::Fallback => panic!("expected custom palette"),
        }
    }

    #[rstest]
    #[case(vec![250.0; 10])]
    #[case(vec![])]
    #[case(vec![1.0, f64::NAN])]
    #[case(vec![-3000.0, -2000.0])]
    fn test_elevation_custom_failures(#[case] elevation: Vec<f64>) {
        assert!(ElevationLevels::custom(&elevation).is_err());
    }

    #[test]
    fn test_elevation_below_sea_level_falls_back() {
        let elevation = [-2000.0, -1000.0, -100.0];
        assert!(matches!(
            ElevationLevels::custom(&elevation),
            Err(LevelError::EmptyPalette { .. })
        ));
        let levels = ElevationLevels::classify(&elevation);
        assert!(levels.is_fallback());
        assert_eq!(levels.colormap.len(), COLORMAP_SIZE);
    }

    #[test]
    fn test_elevation_fallback_on_flat_terrain() {
        let levels = ElevationLevels::classify(&[250.0; 10]);
        assert!(levels.is_fallback());
        assert_eq!(levels.colormap.len(), COLORMAP_SIZE);
        assert!(levels.levels.len() >= 2);
        assert!(levels.levels[0] <= 250.0 && *levels.levels.last().unwrap() >= 250.0);
    }

    #[test]
    fn test_elevation_fallback_without_finite_values() {
        let levels = ElevationLevels::classify(&[f64::NAN, f64::NAN]);
        assert!(levels.is_fallback());
        assert_eq!(levels.levels.first(), Some(&0.0));
        assert_eq!(levels.levels.last(), Some(&1.0));
    }

    #[test]
    fn test_random_fields_give_ladder_bounded_levels() {
        use rand::{Rng, SeedableRng, rngs::StdRng};
        let major = major_ladder();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let lo = rng.random_range(-3.0..0.0f64);
            let hi = lo + rng.random_range(0.5..2.0);
            let values: Vec<f64> = (0..200).map(|_| 10f64.powf(rng.random_range(lo..hi))).collect();
            let levels = ScalarLevels::classify(&values, &LevelConfig::default()).unwrap();
            assert_eq!(levels.levels.len(), SCALAR_LEVEL_COUNT);
            assert!(levels.levels.windows(2).all(|w| w[0] <= w[1]));
            assert!(major.contains(&levels.vmin()) && major.contains(&levels.vmax()));
        }
    }

    #[test]
    fn test_random_terrain_levels_hit_sea_level() {
        use rand::{Rng, SeedableRng, rngs::StdRng};
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let lo = rng.random_range(-2000.0..-150.0f64);
            let hi = rng.random_range(1500.0..6000.0f64);
            let elevation: Vec<f64> = (0..100).map(|_| rng.random_range(lo..hi)).collect();
            let levels = ElevationLevels::classify(&elevation);
            assert!(!levels.is_fallback());
            assert!(levels.levels.contains(&0.0), "{:?}", levels.levels);
            assert!(!levels.colormap.is_empty());
        }
    }
}
