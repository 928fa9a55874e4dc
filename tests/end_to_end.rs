use groundmotion::levels::percentile;
use groundmotion::mesh::SurfaceMesh;
use groundmotion::xdmf::write_binary_container;
use groundmotion::{ShakeField, ShakemapConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakemaps::ShakemapError;
use std::path::{Path, PathBuf};

/// 100 triangles over a 10 x 10 km square.
fn grid(z: impl Fn(f64, f64) -> f64) -> SurfaceMesh {
    SurfaceMesh::grid(10, 5, 10_000.0, 10_000.0, z)
}

fn random_field(rng: &mut StdRng, n: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..n).map(|_| rng.random_range(lo..=hi)).collect()
}

fn write_input(dir: &Path, mesh: &SurfaceMesh, seed: u64) -> PathBuf {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = mesh.num_triangles();
    let pgd = random_field(&mut rng, n, 0.01, 0.05);
    let pgv = random_field(&mut rng, n, 0.1, 0.5);
    let pga = random_field(&mut rng, n, 1.0, 5.0);
    let path = dir.join("gm-surface.xdmf");
    write_binary_container(
        &path,
        mesh,
        &[
            ("PGD", pgd.as_slice()),
            ("PGV", pgv.as_slice()),
            ("PGA", pga.as_slice()),
        ],
    )
    .unwrap();
    path
}

fn config_in(dir: &Path, file: &str) -> ShakemapConfig {
    let mut config = ShakemapConfig::default();
    config.figure.output = dir.join(file);
    config
}

#[test]
fn test_four_panel_map_from_synthetic_surface() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = grid(|x, y| 100.0 + 0.05 * x - 0.02 * y);
    assert_eq!(mesh.num_triangles(), 100);
    let input = write_input(dir.path(), &mesh, 42);
    let config = config_in(dir.path(), "shakemaps.jpg");

    let report = shakemaps::run(&input, &config).unwrap();

    assert_eq!(report.output, dir.path().join("shakemaps.jpg"));
    let bytes = std::fs::read(&report.output).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(report.receivers, 100);
    assert_eq!(report.field_names, vec!["PGD", "PGV", "PGA"]);

    let data = groundmotion::ShakeData::load(&input).unwrap();
    for (field, levels) in &report.fields {
        let values = data.field(*field);
        let low = percentile(values, 4.0).unwrap();
        let high = percentile(values, 96.0).unwrap();
        assert!(
            levels.brackets(low, high),
            "{field}: [{}, {}] does not bracket [{low}, {high}]",
            levels.vmin(),
            levels.vmax()
        );
        assert_eq!(levels.levels.len(), 14);
        assert!(levels.levels.windows(2).all(|w| w[0] <= w[1]));
    }
    let ranges: Vec<(ShakeField, f64, f64)> = report
        .fields
        .iter()
        .map(|(field, levels)| (*field, levels.vmin(), levels.vmax()))
        .collect();
    assert_eq!(
        ranges,
        vec![
            (ShakeField::Pgd, 0.01, 0.05),
            (ShakeField::Pgv, 0.1, 0.5),
            (ShakeField::Pga, 1.0, 5.0),
        ]
    );
    assert!(!report.elevation.is_fallback());
}

#[test]
fn test_axis_limits_cropped_inside_extent() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = grid(|x, _| x / 20.0);
    let input = write_input(dir.path(), &mesh, 3);
    let mut config = config_in(dir.path(), "map.png");
    config.figure.dpi = 60;

    let report = shakemaps::run(&input, &config).unwrap();
    let (extent, view) = (report.extent, report.view);
    let span = extent.size();

    assert!(view.min.x > extent.min.x && view.max.x < extent.max.x);
    assert!(view.min.y > extent.min.y && view.max.y < extent.max.y);
    assert!((view.min.x - (extent.min.x + 0.03 * span.x)).abs() < 1e-9);
    assert!((view.max.y - (extent.max.y - 0.03 * span.y)).abs() < 1e-9);
    // centroids of the 1 x 2 km cells, in km
    assert!((extent.min.x - 1.0 / 3.0).abs() < 1e-9);
    assert!((extent.max.y - (10.0 - 2.0 / 3.0)).abs() < 1e-9);

    let png = std::fs::read(&report.output).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn test_flat_elevation_uses_standard_palette() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = grid(|_, _| 0.0);
    let input = write_input(dir.path(), &mesh, 11);
    let mut config = config_in(dir.path(), "flat.jpg");
    config.figure.dpi = 60;

    let report = shakemaps::run(&input, &config).unwrap();

    assert!(report.elevation.is_fallback());
    assert!(report.output.exists());
}

#[test]
fn test_missing_field_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = grid(|_, _| 10.0);
    let values = vec![0.5; mesh.num_triangles()];
    let input = dir.path().join("partial.xdmf");
    write_binary_container(&input, &mesh, &[("PGV", values.as_slice())]).unwrap();
    let config = config_in(dir.path(), "shakemaps.jpg");

    let err = shakemaps::run(&input, &config).unwrap_err();

    assert!(matches!(err, ShakemapError::Xdmf(_)), "{err}");
    assert!(!config.figure.output.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "shakemaps.jpg");
    let err = shakemaps::run(&dir.path().join("nope.xdmf"), &config).unwrap_err();
    assert!(matches!(err, ShakemapError::Xdmf(groundmotion::XdmfError::Io { .. })));
    assert!(!config.figure.output.exists());
}
