use glam::{DVec2, DVec3};

/// Triangulated surface as read from the output container.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<[usize; 3]>,
}

impl SurfaceMesh {
    pub fn new(vertices: Vec<DVec3>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// One centroid per triangle, in triangle order.
    pub fn centroids(&self) -> Vec<DVec3> {
        centroids(&self.vertices, &self.triangles)
    }

    /// Regular grid of `nx * ny` cells over `[0, width] x [0, height]`, each
    /// cell split into two triangles. Elevation comes from `z(x, y)`.
    pub fn grid(
        nx: usize,
        ny: usize,
        width: f64,
        height: f64,
        z: impl Fn(f64, f64) -> f64,
    ) -> Self {
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            let y = height * j as f64 / ny as f64;
            for i in 0..=nx {
                let x = width * i as f64 / nx as f64;
                vertices.push(DVec3::new(x, y, z(x, y)));
            }
        }

        let row = nx + 1;
        let mut triangles = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let i0 = j * row + i;
                let i1 = i0 + 1;
                let i2 = i0 + row;
                let i3 = i2 + 1;
                triangles.push([i0, i1, i3]);
                triangles.push([i0, i3, i2]);
            }
        }
        Self::new(vertices, triangles)
    }
}

/// Triangle midpoints: the mean of each triangle's three vertices.
///
/// Indices are trusted; the loader rejects out-of-range connectivity.
pub fn centroids(vertices: &[DVec3], triangles: &[[usize; 3]]) -> Vec<DVec3> {
    triangles
        .iter()
        .map(|[a, b, c]| (vertices[*a] + vertices[*b] + vertices[*c]) / 3.0)
        .collect()
}

/// Axis-aligned horizontal bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: DVec2,
    pub max: DVec2,
}

impl Extent {
    /// Bounds of the finite points, or `None` when there are none.
    pub fn of_points(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |extent, p| match extent {
                None => Some(Extent { min: p, max: p }),
                Some(Extent { min, max }) => Some(Extent {
                    min: min.min(p),
                    max: max.max(p),
                }),
            })
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Shrinks each side inward by `fraction` of the span on that axis.
    pub fn cropped(&self, fraction: f64) -> Self {
        let margin = self.size() * fraction;
        Extent {
            min: self.min + margin,
            max: self.max - margin,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Piecewise-linear interpolant used for filled contours.
///
/// Nodes are the mesh vertices followed by the triangle centroids. Centroids
/// carry the per-triangle values; each mesh triangle is split into three
/// sub-triangles around its centroid.
#[derive(Debug, Clone)]
pub struct ContourMesh {
    pub nodes: Vec<DVec2>,
    pub values: Vec<f64>,
    pub triangles: Vec<[usize; 3]>,
}

impl ContourMesh {
    /// Builds the interpolant for a per-triangle field. Horizontal coordinates
    /// are multiplied by `scale` (metres to kilometres for plotting).
    ///
    /// Vertex values are `vertex_values` when given (e.g. elevation), otherwise
    /// the mean of the finite values of the triangles sharing the vertex.
    pub fn from_cells(
        mesh: &SurfaceMesh,
        cell_values: &[f64],
        vertex_values: Option<&[f64]>,
        scale: f64,
    ) -> Self {
        let nv = mesh.vertices.len();
        let vertex_values = match vertex_values {
            Some(values) => values.to_vec(),
            None => average_to_vertices(nv, &mesh.triangles, cell_values),
        };

        let mut nodes: Vec<DVec2> = mesh.vertices.iter().map(|v| v.truncate() * scale).collect();
        nodes.extend(mesh.centroids().iter().map(|c| c.truncate() * scale));

        let mut values = vertex_values;
        values.extend_from_slice(cell_values);

        let triangles = mesh
            .triangles
            .iter()
            .enumerate()
            .flat_map(|(t, &[a, b, c])| {
                let centre = nv + t;
                [[a, b, centre], [b, c, centre], [c, a, centre]]
            })
            .collect();

        Self {
            nodes,
            values,
            triangles,
        }
    }

    /// Interpolated value at `p`, if it lies inside any sub-triangle.
    pub fn value_at(&self, p: DVec2) -> Option<f64> {
        self.triangles.iter().find_map(|tri| {
            let weights = barycentric(p, self.corners(tri))?;
            inside(weights).then(|| self.interpolate(tri, weights))
        })
    }

    pub fn corners(&self, tri: &[usize; 3]) -> [DVec2; 3] {
        [self.nodes[tri[0]], self.nodes[tri[1]], self.nodes[tri[2]]]
    }

    pub fn interpolate(&self, tri: &[usize; 3], weights: [f64; 3]) -> f64 {
        weights[0] * self.values[tri[0]]
            + weights[1] * self.values[tri[1]]
            + weights[2] * self.values[tri[2]]
    }
}

fn average_to_vertices(num_vertices: usize, triangles: &[[usize; 3]], cell_values: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; num_vertices];
    let mut counts = vec![0u32; num_vertices];
    for (tri, value) in triangles.iter().zip(cell_values) {
        if !value.is_finite() {
            continue;
        }
        for &v in tri {
            sums[v] += value;
            counts[v] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { f64::NAN })
        .collect()
}

/// Barycentric weights of `p` in triangle `[a, b, c]`; `None` for a degenerate triangle.
pub fn barycentric(p: DVec2, [a, b, c]: [DVec2; 3]) -> Option<[f64; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let denom = v0.perp_dot(v1);
    if denom.abs() <= f64::EPSILON * v0.length_squared().max(v1.length_squared()) {
        return None;
    }
    let wb = v2.perp_dot(v1) / denom;
    let wc = v0.perp_dot(v2) / denom;
    Some([1.0 - wb - wc, wb, wc])
}

/// Whether barycentric weights describe a point inside (or on) the triangle.
pub fn inside(weights: [f64; 3]) -> bool {
    const EPS: f64 = -1e-9;
    weights.iter().all(|w| *w >= EPS)
}
