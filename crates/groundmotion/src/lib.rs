pub mod colormap;
pub mod config;
pub mod constants;
pub mod contour;
pub mod dataset;
pub mod field;
pub mod levels;
pub mod mesh;
pub mod raster;
pub mod ticks;
pub mod xdmf;

pub use config::{ConfigError, ShakemapConfig};
pub use dataset::ShakeData;
pub use field::ShakeField;
pub use xdmf::{XdmfError, XdmfFile};
