use crate::error::ShakemapError;
use crate::figure::Figure;
use groundmotion::config::FigureConfig;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, ShakemapError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("jpg" | "jpeg") => Ok(OutputFormat::Jpeg),
            Some("png") => Ok(OutputFormat::Png),
            _ => Err(ShakemapError::UnsupportedOutput(path.to_path_buf())),
        }
    }
}

/// Encodes the figure in memory.
pub fn encode(figure: &Figure, format: OutputFormat, config: &FigureConfig) -> Result<Vec<u8>, ShakemapError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, config.jpeg_quality);
            let dpi = u16::try_from(config.dpi).unwrap_or(u16::MAX);
            encoder.set_pixel_density(PixelDensity::dpi(dpi));
            encoder.encode(&figure.pixels, figure.width, figure.height, ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                &figure.pixels,
                figure.width,
                figure.height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}

/// Writes the figure to `path`, format picked from the extension. Nothing is
/// written unless encoding succeeds.
pub fn write_figure(figure: &Figure, path: &Path, config: &FigureConfig) -> Result<(), ShakemapError> {
    let format = OutputFormat::from_path(path)?;
    let bytes = encode(figure, format, config)?;
    std::fs::write(path, bytes).map_err(|source| ShakemapError::Io {
        path: path.to_path_buf(),
        source,
    })
}
