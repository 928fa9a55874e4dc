//! Pixel rasterization of filled contours, independent of any drawing backend.

use crate::colormap::Rgb;
use crate::contour::ContourStyle;
use crate::mesh::{ContourMesh, Extent, barycentric, inside};
use glam::DVec2;

/// A `width x height` grid of fill colors, row 0 at the top of `view`.
#[derive(Debug, Clone)]
pub struct FieldRaster {
    pub width: usize,
    pub height: usize,
    pub view: Extent,
    pub pixels: Vec<Option<Rgb>>,
}

impl FieldRaster {
    /// Colors every pixel whose centre falls inside the contour mesh. Pixels
    /// outside the mesh, or where the interpolated value is NaN, stay empty.
    pub fn render(
        mesh: &ContourMesh,
        style: &ContourStyle,
        view: Extent,
        width: usize,
        height: usize,
    ) -> Self {
        let mut pixels = vec![None; width * height];
        let size = view.size();
        if width == 0 || height == 0 || !(size.x > 0.0 && size.y > 0.0) {
            return Self {
                width,
                height,
                view,
                pixels,
            };
        }
        let pixel = DVec2::new(size.x / width as f64, size.y / height as f64);

        for tri in &mesh.triangles {
            let corners = mesh.corners(tri);
            let lo = corners[0].min(corners[1]).min(corners[2]);
            let hi = corners[0].max(corners[1]).max(corners[2]);
            if hi.x < view.min.x || lo.x > view.max.x || hi.y < view.min.y || lo.y > view.max.y {
                continue;
            }

            // pixel columns/rows whose centres may fall inside the bounding box
            let col_start = (((lo.x - view.min.x) / pixel.x - 0.5).floor().max(0.0)) as usize;
            let col_end = (((hi.x - view.min.x) / pixel.x - 0.5).ceil().max(0.0) as usize).min(width - 1);
            let row_start = (((view.max.y - hi.y) / pixel.y - 0.5).floor().max(0.0)) as usize;
            let row_end = (((view.max.y - lo.y) / pixel.y - 0.5).ceil().max(0.0) as usize).min(height - 1);

            for row in row_start..=row_end {
                let y = view.max.y - (row as f64 + 0.5) * pixel.y;
                for col in col_start..=col_end {
                    let x = view.min.x + (col as f64 + 0.5) * pixel.x;
                    let Some(weights) = barycentric(DVec2::new(x, y), corners) else {
                        continue;
                    };
                    if !inside(weights) {
                        continue;
                    }
                    let value = mesh.interpolate(tri, weights);
                    if let Some(color) = style.color_for(value) {
                        pixels[row * width + col] = Some(color);
                    }
                }
            }
        }

        Self {
            width,
            height,
            view,
            pixels,
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Rgb> {
        self.pixels.get(row * self.width + col).copied().flatten()
    }

    pub fn filled(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    /// Filled pixels as `(col, row, color)`.
    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, usize, Rgb)> + '_ {
        self.pixels.iter().enumerate().filter_map(move |(i, p)| {
            p.map(|color| (i % self.width, i / self.width, color))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{Colormap, ColormapName, Norm};
    use crate::mesh::SurfaceMesh;

    fn gradient_mesh() -> (SurfaceMesh, Vec<f64>) {
        let mesh = SurfaceMesh::grid(4, 4, 4.0, 4.0, |_, _| 0.0);
        // value grows with x
        let values = mesh.centroids().iter().map(|c| 1.0 + c.x).collect();
        (mesh, values)
    }

    fn linear_style() -> ContourStyle {
        ContourStyle::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            Norm::Linear { vmin: 1.0, vmax: 5.0 },
            Colormap::named(ColormapName::YlOrRd),
        )
    }

    #[test]
    fn test_covers_mesh_interior() {
        let (mesh, values) = gradient_mesh();
        let contour = ContourMesh::from_cells(&mesh, &values, None, 1.0);
        let view = Extent {
            min: DVec2::new(0.0, 0.0),
            max: DVec2::new(4.0, 4.0),
        };
        let raster = FieldRaster::render(&contour, &linear_style(), view, 40, 40);
        assert_eq!(raster.filled(), 40 * 40);
    }

    #[test]
    fn test_outside_mesh_is_empty() {
        let (mesh, values) = gradient_mesh();
        let contour = ContourMesh::from_cells(&mesh, &values, None, 1.0);
        let view = Extent {
            min: DVec2::new(-4.0, 0.0),
            max: DVec2::new(4.0, 4.0),
        };
        let raster = FieldRaster::render(&contour, &linear_style(), view, 80, 40);
        assert!(raster.get(5, 20).is_none());
        assert!(raster.get(75, 20).is_some());
        assert_eq!(raster.filled(), 40 * 40);
    }

    #[test]
    fn test_colors_follow_values() {
        let (mesh, values) = gradient_mesh();
        let style = linear_style();
        let contour = ContourMesh::from_cells(&mesh, &values, None, 1.0);
        let view = Extent {
            min: DVec2::new(0.0, 0.0),
            max: DVec2::new(4.0, 4.0),
        };
        let raster = FieldRaster::render(&contour, &style, view, 40, 40);
        // far left is in the lowest band, far right in the highest
        assert_eq!(raster.get(1, 20), Some(style.band_colors()[0]));
        assert_eq!(raster.get(38, 20), Some(style.band_colors()[3]));
    }

    #[test]
    fn test_nan_cells_stay_empty() {
        let (mesh, mut values) = gradient_mesh();
        values.iter_mut().for_each(|v| *v = f64::NAN);
        let contour = ContourMesh::from_cells(&mesh, &values, None, 1.0);
        let view = Extent {
            min: DVec2::new(0.0, 0.0),
            max: DVec2::new(4.0, 4.0),
        };
        let raster = FieldRaster::render(&contour, &linear_style(), view, 10, 10);
        assert_eq!(raster.filled(), 0);
    }
}
