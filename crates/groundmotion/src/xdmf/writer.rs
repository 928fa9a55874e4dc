use super::XdmfError;
use crate::mesh::SurfaceMesh;
use log::debug;
use std::fmt::Write as _;
use std::path::Path;

/// Writes `mesh` and per-triangle `fields` as a single-step temporal XDMF
/// collection with little-endian binary data files next to `path`:
/// `<stem>_vertex.bin`, `<stem>_cell.bin` and one `<stem>_<field>.bin` per field.
pub fn write_binary_container(
    path: &Path,
    mesh: &SurfaceMesh,
    fields: &[(&str, &[f64])],
) -> Result<(), XdmfError> {
    let nt = mesh.num_triangles();
    let nv = mesh.vertices.len();
    for (name, values) in fields {
        if values.len() != nt {
            return Err(XdmfError::ShapeMismatch {
                what: format!("field {name}"),
                expected: nt,
                actual: values.len(),
            });
        }
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "surface".to_string());

    let vertex_file = format!("{stem}_vertex.bin");
    let coords: Vec<f64> = mesh.vertices.iter().flat_map(|v| v.to_array()).collect();
    write_data(&dir.join(&vertex_file), &f64_words(&coords))?;

    let cell_file = format!("{stem}_cell.bin");
    let connect: Vec<u64> = mesh
        .triangles
        .iter()
        .flatten()
        .map(|&i| (i as u64).to_le())
        .collect();
    write_data(&dir.join(&cell_file), &connect)?;

    let mut xml = String::new();
    // writing into a String cannot fail
    let _ = write!(
        xml,
        r#"<?xml version="1.0" ?>
<!DOCTYPE Xdmf SYSTEM "Xdmf.dtd" []>
<Xdmf Version="2.0">
 <Domain>
  <Grid Name="TimeSeries" GridType="Collection" CollectionType="Temporal">
   <Grid Name="step_000000000000" GridType="Uniform">
    <Topology TopologyType="Triangle" NumberOfElements="{nt}">
     <DataItem NumberType="Int" Precision="8" Format="Binary" Dimensions="{nt} 3">{cell}</DataItem>
    </Topology>
    <Geometry name="geo" GeometryType="XYZ" NumberOfElements="{nv}">
     <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="{nv} 3">{vertex}</DataItem>
    </Geometry>
    <Time Value="0"/>
"#,
        cell = escape(&cell_file),
        vertex = escape(&vertex_file),
    );

    for (name, values) in fields {
        let field_file = format!("{stem}_{name}.bin");
        write_data(&dir.join(&field_file), &f64_words(values))?;
        let _ = write!(
            xml,
            r#"    <Attribute Name="{name}" Center="Cell">
     <DataItem ItemType="HyperSlab" Dimensions="{nt}">
      <DataItem NumberType="UInt" Precision="4" Format="XML" Dimensions="3 2">0 0 1 1 1 {nt}</DataItem>
      <DataItem NumberType="Float" Precision="8" Format="Binary" Dimensions="1 {nt}">{file}</DataItem>
     </DataItem>
    </Attribute>
"#,
            name = escape(name),
            file = escape(&field_file),
        );
    }
    xml.push_str("   </Grid>\n  </Grid>\n </Domain>\n</Xdmf>\n");

    std::fs::write(path, xml).map_err(|source| XdmfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {} with {} triangles and {} fields", path.display(), nt, fields.len());
    Ok(())
}

fn f64_words(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits().to_le()).collect()
}

fn write_data(path: &Path, words: &[u64]) -> Result<(), XdmfError> {
    std::fs::write(path, bytemuck::cast_slice::<u64, u8>(words)).map_err(|source| XdmfError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdmf::XdmfFile;

    #[test]
    fn test_written_container_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.xdmf");
        let mesh = SurfaceMesh::grid(3, 2, 300.0, 200.0, |x, y| x + 2.0 * y);
        let pgv: Vec<f64> = (0..mesh.num_triangles()).map(|i| 0.1 * i as f64).collect();
        let pga: Vec<f64> = (0..mesh.num_triangles()).map(|i| 1.0 + i as f64).collect();

        write_binary_container(&path, &mesh, &[("PGV", pgv.as_slice()), ("PGA", pga.as_slice())]).unwrap();
        assert!(dir.path().join("surface_vertex.bin").exists());
        assert!(dir.path().join("surface_PGA.bin").exists());

        let file = XdmfFile::open(&path).unwrap();
        assert_eq!(file.field_names(), vec!["PGV", "PGA"]);
        let read = file.read_mesh().unwrap();
        assert_eq!(read.vertices, mesh.vertices);
        assert_eq!(read.triangles, mesh.triangles);
        assert_eq!(file.read_field("PGV").unwrap(), pgv);
        assert_eq!(file.read_field("PGA").unwrap(), pga);
    }

    #[test]
    fn test_rejects_mismatched_field() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = SurfaceMesh::grid(1, 1, 1.0, 1.0, |_, _| 0.0);
        let result = write_binary_container(&dir.path().join("bad.xdmf"), &mesh, &[("PGD", &[1.0][..])]);
        assert!(matches!(result, Err(XdmfError::ShapeMismatch { expected: 2, actual: 1, .. })));
        assert!(!dir.path().join("bad.xdmf").exists());
    }
}
