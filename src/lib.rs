pub mod canvas;
pub mod colorbar;
pub mod error;
pub mod figure;
pub mod layout;
pub mod output;
pub mod panel;
pub mod pipeline;

pub use error::ShakemapError;
pub use pipeline::{ShakemapReport, plot, run};
