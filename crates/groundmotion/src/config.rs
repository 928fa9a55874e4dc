use crate::colormap::ColormapName;
use crate::constants::{HIGH_PERCENTILE, LOW_PERCENTILE, SCALAR_LEVEL_COUNT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "shakemap_config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakemapConfig {
    pub figure: FigureConfig,
    pub axes: AxesConfig,
    pub levels: LevelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Figure width in inches
    pub width_in: f64,
    /// Figure height in inches
    pub height_in: f64,
    pub dpi: u32,
    /// Output image, format picked from the extension (jpg/jpeg/png)
    pub output: PathBuf,
    pub jpeg_quality: u8,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 7.5,
            dpi: 300,
            output: PathBuf::from("shakemaps.jpg"),
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    /// Fraction of the centroid extent trimmed from each side of x and y
    pub crop_fraction: f64,
    /// Upper bound on labelled ticks per axis
    pub max_ticks: usize,
    pub label_font_pt: f64,
    pub title_font_pt: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            crop_fraction: 0.03,
            max_ticks: 5,
            label_font_pt: 8.0,
            title_font_pt: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub count: usize,
    pub scalar_colormap: ColormapName,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            low_percentile: LOW_PERCENTILE,
            high_percentile: HIGH_PERCENTILE,
            count: SCALAR_LEVEL_COUNT,
            scalar_colormap: ColormapName::YlOrRd,
        }
    }
}

impl ShakemapConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ShakemapConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise [`DEFAULT_CONFIG_FILE`] if it exists,
    /// otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                log::info!("Using configuration from {DEFAULT_CONFIG_FILE}");
                Self::load_from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let figure = &self.figure;
        if !(figure.width_in > 0.0 && figure.height_in > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "figure size must be positive, got {}x{} in",
                figure.width_in, figure.height_in
            )));
        }
        if figure.dpi == 0 {
            return Err(ConfigError::Invalid("dpi must be positive".into()));
        }
        if figure.jpeg_quality == 0 || figure.jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "jpeg quality must be in 1..=100, got {}",
                figure.jpeg_quality
            )));
        }

        let axes = &self.axes;
        if !(0.0..0.5).contains(&axes.crop_fraction) {
            return Err(ConfigError::Invalid(format!(
                "crop fraction must be in [0, 0.5), got {}",
                axes.crop_fraction
            )));
        }
        if axes.max_ticks < 2 {
            return Err(ConfigError::Invalid("max_ticks must be at least 2".into()));
        }
        if !(axes.label_font_pt > 0.0 && axes.title_font_pt > 0.0) {
            return Err(ConfigError::Invalid("font sizes must be positive".into()));
        }

        let levels = &self.levels;
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(levels.low_percentile)
            || !in_range(levels.high_percentile)
            || levels.low_percentile >= levels.high_percentile
        {
            return Err(ConfigError::Invalid(format!(
                "percentiles must satisfy 0 <= low < high <= 100, got {} and {}",
                levels.low_percentile, levels.high_percentile
            )));
        }
        if levels.count < 2 {
            return Err(ConfigError::Invalid("level count must be at least 2".into()));
        }
        Ok(())
    }

    /// Figure size in pixels at the configured resolution.
    pub fn figure_pixels(&self) -> (u32, u32) {
        let dpi = self.figure.dpi as f64;
        (
            (self.figure.width_in * dpi).round() as u32,
            (self.figure.height_in * dpi).round() as u32,
        )
    }

    /// Converts a font size in points to pixels at the configured resolution.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.figure.dpi as f64 / 72.0
    }
}
