use crate::colorbar::ColorbarSpec;
use crate::error::ShakemapError;
use crate::figure::render_figure;
use crate::output::write_figure;
use crate::panel::PanelSpec;
use groundmotion::colormap::Colormap;
use groundmotion::constants::METRES_TO_KM;
use groundmotion::levels::{ElevationLevels, ScalarLevels};
use groundmotion::mesh::{ContourMesh, Extent};
use groundmotion::{ShakeData, ShakeField, ShakemapConfig};
use log::info;
use std::path::{Path, PathBuf};

pub const ELEVATION_LABEL: &str = "Altitude [km]";

/// What a run produced, for logging and inspection.
#[derive(Debug, Clone)]
pub struct ShakemapReport {
    pub output: PathBuf,
    pub receivers: usize,
    pub field_names: Vec<String>,
    /// Centroid extent in km
    pub extent: Extent,
    /// Axis limits shared by all panels, in km
    pub view: Extent,
    pub fields: Vec<(ShakeField, ScalarLevels)>,
    pub elevation: ElevationLevels,
}

/// Loads `input` and writes the four-panel shake map to the configured output.
pub fn run(input: &Path, config: &ShakemapConfig) -> Result<ShakemapReport, ShakemapError> {
    let data = ShakeData::load(input)?;
    plot(&data, config)
}

pub fn plot(data: &ShakeData, config: &ShakemapConfig) -> Result<ShakemapReport, ShakemapError> {
    let mesh = &data.mesh;
    let centroids = mesh.centroids();
    let extent = Extent::of_points(centroids.iter().map(|c| c.truncate() * METRES_TO_KM))
        .ok_or(ShakemapError::EmptyMesh)?;
    let view = extent.cropped(config.axes.crop_fraction);

    let colormap = Colormap::named(config.levels.scalar_colormap);
    let mut panels = Vec::with_capacity(4);
    let mut fields = Vec::with_capacity(3);
    for field in ShakeField::ALL {
        let values = data.field(field);
        let levels = ScalarLevels::classify(values, &config.levels)
            .map_err(|source| ShakemapError::Levels { field, source })?;
        info!(
            "{field}: levels {} to {} (percentiles {:.4} to {:.4})",
            levels.vmin(),
            levels.vmax(),
            levels.percentiles.0,
            levels.percentiles.1
        );
        panels.push(PanelSpec {
            title: field.label(),
            mesh: ContourMesh::from_cells(mesh, values, None, METRES_TO_KM),
            style: levels.contour_style(colormap.clone()),
            view,
            colorbar: ColorbarSpec::logarithmic(field.label(), &levels),
        });
        fields.push((field, levels));
    }

    let elevation: Vec<f64> = centroids.iter().map(|c| c.z).collect();
    let vertex_elevation: Vec<f64> = mesh.vertices.iter().map(|v| v.z).collect();
    let elevation_levels = ElevationLevels::classify(&elevation);
    info!(
        "elevation: levels {} to {} m{}",
        elevation_levels.levels[0],
        elevation_levels.levels[elevation_levels.levels.len() - 1],
        if elevation_levels.is_fallback() { " (standard palette)" } else { "" }
    );
    panels.push(PanelSpec {
        title: ELEVATION_LABEL.to_string(),
        mesh: ContourMesh::from_cells(mesh, &elevation, Some(&vertex_elevation), METRES_TO_KM),
        style: elevation_levels.contour_style(),
        view,
        colorbar: ColorbarSpec::elevation(ELEVATION_LABEL, &elevation_levels),
    });

    let figure = render_figure(&panels, config)?;
    let output = config.figure.output.clone();
    write_figure(&figure, &output, &config.figure)?;
    info!("Done plotting, wrote {}", output.display());

    Ok(ShakemapReport {
        output,
        receivers: mesh.num_triangles(),
        field_names: data.field_names.clone(),
        extent,
        view,
        fields,
        elevation: elevation_levels,
    })
}
