use groundmotion::levels::LevelError;
use groundmotion::{ConfigError, ShakeField, XdmfError};
use plotters::drawing::DrawingAreaErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShakemapError {
    #[error(transparent)]
    Xdmf(#[from] XdmfError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot pick {field} levels: {source}")]
    Levels {
        field: ShakeField,
        #[source]
        source: LevelError,
    },
    #[error("the surface mesh has no finite coordinates")]
    EmptyMesh,
    #[error("drawing failed: {0}")]
    Plot(String),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported output format for {}, expected .jpg, .jpeg or .png", .0.display())]
    UnsupportedOutput(PathBuf),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ShakemapError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ShakemapError::Plot(err.to_string())
    }
}
