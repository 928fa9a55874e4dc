//! Reader for the XDMF surface output of SeisSol: a triangle topology, XYZ
//! geometry and cell-centred attributes stored as raw binary or inline XML.

mod data_item;
mod writer;

pub use data_item::{DataItem, DataSource, Scalar, Values};
pub use writer::write_binary_container;

use crate::mesh::SurfaceMesh;
use glam::DVec3;
use log::debug;
use roxmltree::{Document, Node, ParsingOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XdmfError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XDMF document: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("<{element}> has no {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("invalid {attribute}=\"{value}\" on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("unsupported data item format {0:?}")]
    UnsupportedFormat(String),
    #[error("unsupported topology {0:?}, only Triangle is supported")]
    UnsupportedTopology(String),
    #[error("unsupported number type {number_type} with precision {precision}")]
    UnsupportedNumberType { number_type: String, precision: String },
    #[error("{} is too short: need {expected} bytes, found {actual}", .path.display())]
    Truncated {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("cannot parse {0:?} as a number")]
    InvalidNumber(String),
    #[error("field {name} not found, available fields: {available:?}")]
    FieldNotFound { name: String, available: Vec<String> },
    #[error("{what}: expected {expected} values, found {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertices} vertices")]
    VertexIndexOutOfRange {
        triangle: usize,
        index: usize,
        vertices: usize,
    },
}

/// An opened XDMF surface file. Only the XML is parsed on open; data items
/// are read on demand.
#[derive(Debug, Clone)]
pub struct XdmfFile {
    path: PathBuf,
    topology: DataItem,
    geometry: DataItem,
    attributes: Vec<(String, DataItem)>,
}

impl XdmfFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, XdmfError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| XdmfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut file = Self::parse(&text, base_dir)?;
        file.path = path.to_path_buf();
        Ok(file)
    }

    /// Parses an XDMF document; binary data items resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, XdmfError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;
        let root = doc.root_element();
        if !root.has_tag_name("Xdmf") {
            return Err(XdmfError::MissingElement("Xdmf"));
        }
        let domain = child(root, "Domain")?;
        let grid = last_step(child(domain, "Grid")?)?;

        let topology = child(grid, "Topology")?;
        let kind = topology
            .attribute("TopologyType")
            .or_else(|| topology.attribute("Type"))
            .ok_or(XdmfError::MissingAttribute {
                element: "Topology",
                attribute: "TopologyType",
            })?;
        if !kind.eq_ignore_ascii_case("Triangle") {
            return Err(XdmfError::UnsupportedTopology(kind.to_string()));
        }
        let topology = DataItem::parse(child(topology, "DataItem")?, base_dir)?;

        let geometry = child(grid, "Geometry")?;
        let kind = geometry
            .attribute("GeometryType")
            .or_else(|| geometry.attribute("Type"))
            .unwrap_or("XYZ");
        if kind != "XYZ" {
            return Err(XdmfError::InvalidAttribute {
                element: "Geometry",
                attribute: "GeometryType",
                value: kind.to_string(),
            });
        }
        let geometry = DataItem::parse(child(geometry, "DataItem")?, base_dir)?;

        for (what, item) in [("connectivity", &topology), ("geometry", &geometry)] {
            if item.len() % 3 != 0 {
                return Err(XdmfError::ShapeMismatch {
                    what: format!("{what} (3 values per row)"),
                    expected: item.len().next_multiple_of(3),
                    actual: item.len(),
                });
            }
        }

        let mut attributes = Vec::new();
        for attribute in grid.children().filter(|n| n.has_tag_name("Attribute")) {
            if attribute.attribute("Center") != Some("Cell") {
                debug!("skipping attribute {:?} that is not cell-centred", attribute.attribute("Name"));
                continue;
            }
            let name = attribute.attribute("Name").ok_or(XdmfError::MissingAttribute {
                element: "Attribute",
                attribute: "Name",
            })?;
            let item = DataItem::parse(child(attribute, "DataItem")?, base_dir)?;
            attributes.push((name.to_string(), item));
        }

        Ok(Self {
            path: PathBuf::new(),
            topology,
            geometry,
            attributes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the cell-centred fields, in document order.
    pub fn field_names(&self) -> Vec<String> {
        self.attributes.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn num_triangles(&self) -> usize {
        self.topology.len() / 3
    }

    pub fn num_vertices(&self) -> usize {
        self.geometry.len() / 3
    }

    pub fn read_geometry(&self) -> Result<Vec<DVec3>, XdmfError> {
        let values = self.geometry.read()?.into_f64();
        Ok(values
            .chunks_exact(3)
            .map(|xyz| DVec3::new(xyz[0], xyz[1], xyz[2]))
            .collect())
    }

    /// Triangle connectivity, with every index checked against the vertex count.
    pub fn read_connect(&self) -> Result<Vec<[usize; 3]>, XdmfError> {
        let vertices = self.num_vertices();
        let indices = self.topology.read()?.into_indices()?;
        indices
            .chunks_exact(3)
            .enumerate()
            .map(|(triangle, abc)| {
                match abc.iter().find(|&&index| index >= vertices) {
                    Some(&index) => Err(XdmfError::VertexIndexOutOfRange {
                        triangle,
                        index,
                        vertices,
                    }),
                    None => Ok([abc[0], abc[1], abc[2]]),
                }
            })
            .collect()
    }

    /// One value per triangle for the named cell field.
    pub fn read_field(&self, name: &str) -> Result<Vec<f64>, XdmfError> {
        let item = self
            .attributes
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, item)| item)
            .ok_or_else(|| XdmfError::FieldNotFound {
                name: name.to_string(),
                available: self.field_names(),
            })?;
        let values = item.read()?.into_f64();
        if values.len() != self.num_triangles() {
            return Err(XdmfError::ShapeMismatch {
                what: format!("field {name}"),
                expected: self.num_triangles(),
                actual: values.len(),
            });
        }
        Ok(values)
    }

    pub fn read_mesh(&self) -> Result<SurfaceMesh, XdmfError> {
        Ok(SurfaceMesh::new(self.read_geometry()?, self.read_connect()?))
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Result<Node<'a, 'input>, XdmfError> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .ok_or(XdmfError::MissingElement(tag))
}

/// Resolves a temporal collection to its last uniform grid.
fn last_step<'a, 'input>(grid: Node<'a, 'input>) -> Result<Node<'a, 'input>, XdmfError> {
    if grid.attribute("GridType") != Some("Collection") {
        return Ok(grid);
    }
    let step = grid
        .children()
        .filter(|n| n.has_tag_name("Grid"))
        .last()
        .ok_or(XdmfError::MissingElement("Grid"))?;
    last_step(step)
}
