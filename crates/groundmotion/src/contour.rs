use crate::colormap::{Colormap, Norm, Rgb};

/// Which filled-contour layer a value falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Under,
    Level(usize),
    Over,
}

/// Colors for filled contours between consecutive levels, extended at both
/// ends: values below the first level take the colormap's first color and
/// values above the last level take its last color.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourStyle {
    levels: Vec<f64>,
    norm: Norm,
    band_colors: Vec<Rgb>,
    under: Rgb,
    over: Rgb,
}

impl ContourStyle {
    pub fn new(levels: Vec<f64>, norm: Norm, colormap: Colormap) -> Self {
        // each band is colored at its midpoint in normalised space
        let band_colors = levels
            .windows(2)
            .map(|w| colormap.sample(norm.apply(norm.midpoint(w[0], w[1]))))
            .collect();
        Self {
            levels,
            norm,
            band_colors,
            under: colormap.first(),
            over: colormap.last(),
        }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }

    pub fn band_colors(&self) -> &[Rgb] {
        &self.band_colors
    }

    pub fn under(&self) -> Rgb {
        self.under
    }

    pub fn over(&self) -> Rgb {
        self.over
    }

    pub fn band(&self, value: f64) -> Band {
        let (first, last) = (self.levels[0], self.levels[self.levels.len() - 1]);
        if value < first {
            Band::Under
        } else if value > last {
            Band::Over
        } else {
            let above = self.levels.partition_point(|level| *level <= value);
            Band::Level(above.saturating_sub(1).min(self.band_colors.len().saturating_sub(1)))
        }
    }

    /// Fill color for `value`; NaN is left unfilled.
    pub fn color_for(&self, value: f64) -> Option<Rgb> {
        if value.is_nan() {
            return None;
        }
        match self.band(value) {
            Band::Under => Some(self.under),
            Band::Over => Some(self.over),
            Band::Level(i) => Some(self.band_colors.get(i).copied().unwrap_or(self.under)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ColormapName;
    use rstest::rstest;

    fn style() -> ContourStyle {
        ContourStyle::new(
            vec![0.01, 0.1, 1.0, 10.0],
            Norm::Log { vmin: 0.01, vmax: 10.0 },
            Colormap::named(ColormapName::YlOrRd),
        )
    }

    #[rstest]
    #[case(0.001, Band::Under)]
    #[case(0.01, Band::Level(0))]
    #[case(0.05, Band::Level(0))]
    #[case(0.1, Band::Level(1))]
    #[case(5.0, Band::Level(2))]
    #[case(10.0, Band::Level(2))]
    #[case(11.0, Band::Over)]
    fn test_band(#[case] value: f64, #[case] expected: Band) {
        assert_eq!(style().band(value), expected);
    }

    #[test]
    fn test_extend_both_uses_extreme_colors() {
        let style = style();
        let cmap = Colormap::named(ColormapName::YlOrRd);
        assert_eq!(style.color_for(-1.0), Some(cmap.first()));
        assert_eq!(style.color_for(1e9), Some(cmap.last()));
        assert_eq!(style.color_for(f64::NAN), None);
    }

    #[test]
    fn test_band_colors_sampled_at_midpoints() {
        let style = style();
        let cmap = Colormap::named(ColormapName::YlOrRd);
        assert_eq!(style.band_colors().len(), 3);
        // the middle decade sits at the centre of the colormap
        let index = cmap.colors().iter().position(|c| *c == style.band_colors()[1]).unwrap();
        assert!((126..=128).contains(&index), "index was {index}");
        assert_ne!(style.band_colors()[0], style.band_colors()[2]);
    }

    #[test]
    fn test_degenerate_levels_do_not_panic() {
        let style = ContourStyle::new(
            vec![0.5; 14],
            Norm::Log { vmin: 0.5, vmax: 0.5 },
            Colormap::named(ColormapName::YlOrRd),
        );
        assert_eq!(style.band(0.1), Band::Under);
        assert_eq!(style.band(0.5), Band::Level(12));
        assert_eq!(style.band(0.9), Band::Over);
        assert!(style.color_for(0.5).is_some());
    }
}
