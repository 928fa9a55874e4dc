use crate::field::ShakeField;
use crate::mesh::SurfaceMesh;
use crate::xdmf::{XdmfError, XdmfFile};
use log::info;
use std::path::Path;

/// Surface mesh plus the three ground-motion summaries, one value per triangle.
#[derive(Debug, Clone)]
pub struct ShakeData {
    pub mesh: SurfaceMesh,
    /// PGD, PGV, PGA in `ShakeField::ALL` order
    pub fields: [Vec<f64>; 3],
    /// Every cell field found in the file
    pub field_names: Vec<String>,
}

impl ShakeData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, XdmfError> {
        let path = path.as_ref();
        let file = XdmfFile::open(path)?;
        let field_names = file.field_names();
        info!("{} contains the fields {:?}", path.display(), field_names);

        let mesh = file.read_mesh()?;
        let [pgd, pgv, pga] = ShakeField::ALL;
        let fields = [
            file.read_field(pgd.name())?,
            file.read_field(pgv.name())?,
            file.read_field(pga.name())?,
        ];
        info!("{} surface receivers", mesh.num_triangles());

        Ok(Self {
            mesh,
            fields,
            field_names,
        })
    }

    pub fn field(&self, field: ShakeField) -> &[f64] {
        match field {
            ShakeField::Pgd => &self.fields[0],
            ShakeField::Pgv => &self.fields[1],
            ShakeField::Pga => &self.fields[2],
        }
    }

    /// Elevation of each triangle centroid, in metres.
    pub fn elevation(&self) -> Vec<f64> {
        self.mesh.centroids().iter().map(|c| c.z).collect()
    }
}
