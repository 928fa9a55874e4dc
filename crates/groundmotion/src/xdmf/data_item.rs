use super::XdmfError;
use roxmltree::Node;
use std::path::{Path, PathBuf};

/// Element type and width of stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    F32,
    F64,
    I32,
    I64,
    U32,
    U64,
}

impl Scalar {
    /// Maps the `NumberType`/`Precision` attribute pair.
    pub fn from_attributes(number_type: &str, precision: &str) -> Result<Self, XdmfError> {
        let scalar = match (number_type, precision.trim()) {
            ("Float", "4") => Scalar::F32,
            ("Float", "8") => Scalar::F64,
            ("Int", "4") => Scalar::I32,
            ("Int", "8") => Scalar::I64,
            ("UInt", "4") => Scalar::U32,
            ("UInt", "8") => Scalar::U64,
            _ => {
                return Err(XdmfError::UnsupportedNumberType {
                    number_type: number_type.to_string(),
                    precision: precision.to_string(),
                });
            }
        };
        Ok(scalar)
    }

    pub fn size(self) -> usize {
        match self {
            Scalar::F32 | Scalar::I32 | Scalar::U32 => 4,
            Scalar::F64 | Scalar::I64 | Scalar::U64 => 8,
        }
    }

    /// Decodes little-endian values; `bytes.len()` must be a multiple of `size()`.
    fn decode(self, bytes: &[u8]) -> Values {
        match self {
            Scalar::F32 => Values::Float(
                words::<u32>(bytes)
                    .map(|w| f32::from_bits(u32::from_le(w)) as f64)
                    .collect(),
            ),
            Scalar::F64 => Values::Float(
                words::<u64>(bytes)
                    .map(|w| f64::from_bits(u64::from_le(w)))
                    .collect(),
            ),
            Scalar::I32 => Values::Int(words::<u32>(bytes).map(|w| u32::from_le(w) as i32 as i64).collect()),
            Scalar::I64 => Values::Int(words::<u64>(bytes).map(|w| u64::from_le(w) as i64).collect()),
            Scalar::U32 => Values::UInt(words::<u32>(bytes).map(|w| u32::from_le(w) as u64).collect()),
            Scalar::U64 => Values::UInt(words::<u64>(bytes).map(u64::from_le).collect()),
        }
    }

    fn parse_text(self, text: &str) -> Result<Values, XdmfError> {
        let tokens = text.split_whitespace();
        let invalid = |token: &str| XdmfError::InvalidNumber(token.to_string());
        match self {
            Scalar::F32 | Scalar::F64 => tokens
                .map(|t| t.parse::<f64>().map_err(|_| invalid(t)))
                .collect::<Result<_, _>>()
                .map(Values::Float),
            Scalar::I32 | Scalar::I64 => tokens
                .map(|t| t.parse::<i64>().map_err(|_| invalid(t)))
                .collect::<Result<_, _>>()
                .map(Values::Int),
            Scalar::U32 | Scalar::U64 => tokens
                .map(|t| t.parse::<u64>().map_err(|_| invalid(t)))
                .collect::<Result<_, _>>()
                .map(Values::UInt),
        }
    }
}

/// Reinterprets a byte slice as native words; copies, so alignment does not matter.
fn words<T: bytemuck::Pod>(bytes: &[u8]) -> impl Iterator<Item = T> {
    bytemuck::pod_collect_to_vec::<u8, T>(bytes).into_iter()
}

/// Values read from a data item, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Float(Vec<f64>),
    Int(Vec<i64>),
    UInt(Vec<u64>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Float(v) => v.len(),
            Values::Int(v) => v.len(),
            Values::UInt(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_f64(self) -> Vec<f64> {
        match self {
            Values::Float(v) => v,
            Values::Int(v) => v.into_iter().map(|x| x as f64).collect(),
            Values::UInt(v) => v.into_iter().map(|x| x as f64).collect(),
        }
    }

    /// Converts to array indices. Negative or fractional values are rejected.
    pub fn into_indices(self) -> Result<Vec<usize>, XdmfError> {
        match self {
            Values::UInt(v) => v
                .into_iter()
                .map(|x| usize::try_from(x).map_err(|_| XdmfError::InvalidNumber(x.to_string())))
                .collect(),
            Values::Int(v) => v
                .into_iter()
                .map(|x| usize::try_from(x).map_err(|_| XdmfError::InvalidNumber(x.to_string())))
                .collect(),
            Values::Float(v) => v
                .into_iter()
                .map(|x| {
                    if x >= 0.0 && x.fract() == 0.0 && x < usize::MAX as f64 {
                        Ok(x as usize)
                    } else {
                        Err(XdmfError::InvalidNumber(x.to_string()))
                    }
                })
                .collect(),
        }
    }

    fn select(&self, indices: &[usize]) -> Values {
        match self {
            Values::Float(v) => Values::Float(indices.iter().map(|&i| v[i]).collect()),
            Values::Int(v) => Values::Int(indices.iter().map(|&i| v[i]).collect()),
            Values::UInt(v) => Values::UInt(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Where a uniform data item keeps its values.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Raw file, resolved against the XDMF file's directory.
    Binary { file: PathBuf, seek: u64 },
    /// Whitespace-separated text inside the element.
    Inline(String),
}

/// A parsed `<DataItem>`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataItem {
    Uniform {
        dimensions: Vec<usize>,
        scalar: Scalar,
        source: DataSource,
    },
    /// Strided sub-block of `source`, row-major.
    HyperSlab {
        dimensions: Vec<usize>,
        start: Vec<usize>,
        stride: Vec<usize>,
        count: Vec<usize>,
        source: Box<DataItem>,
    },
}

impl DataItem {
    pub fn parse(node: Node, base_dir: &Path) -> Result<Self, XdmfError> {
        let dimensions = parse_dimensions(node)?;
        match node.attribute("ItemType").unwrap_or("Uniform") {
            "Uniform" => Self::parse_uniform(node, dimensions, base_dir),
            "HyperSlab" => Self::parse_hyperslab(node, dimensions, base_dir),
            other => Err(XdmfError::InvalidAttribute {
                element: "DataItem",
                attribute: "ItemType",
                value: other.to_string(),
            }),
        }
    }

    fn parse_uniform(node: Node, dimensions: Vec<usize>, base_dir: &Path) -> Result<Self, XdmfError> {
        let number_type = node
            .attribute("NumberType")
            .or_else(|| node.attribute("DataType"))
            .unwrap_or("Float");
        let scalar = Scalar::from_attributes(number_type, node.attribute("Precision").unwrap_or("4"))?;
        let text = node.text().unwrap_or_default().trim();

        let source = match node.attribute("Format").unwrap_or("XML") {
            "XML" => DataSource::Inline(text.to_string()),
            "Binary" => {
                let seek = match node.attribute("Seek") {
                    Some(seek) => seek.trim().parse().map_err(|_| XdmfError::InvalidAttribute {
                        element: "DataItem",
                        attribute: "Seek",
                        value: seek.to_string(),
                    })?,
                    None => 0,
                };
                DataSource::Binary {
                    file: base_dir.join(text),
                    seek,
                }
            }
            other => return Err(XdmfError::UnsupportedFormat(other.to_string())),
        };

        Ok(DataItem::Uniform {
            dimensions,
            scalar,
            source,
        })
    }

    fn parse_hyperslab(node: Node, dimensions: Vec<usize>, base_dir: &Path) -> Result<Self, XdmfError> {
        let mut items = node.children().filter(|n| n.has_tag_name("DataItem"));
        let selection = items.next().ok_or(XdmfError::MissingElement("DataItem"))?;
        let source = items.next().ok_or(XdmfError::MissingElement("DataItem"))?;

        let selection = DataItem::parse(selection, base_dir)?.read()?.into_indices()?;
        let source = DataItem::parse(source, base_dir)?;
        let rank = source.dimensions().len();
        if selection.len() != 3 * rank {
            return Err(XdmfError::ShapeMismatch {
                what: "hyperslab selection".to_string(),
                expected: 3 * rank,
                actual: selection.len(),
            });
        }

        Ok(DataItem::HyperSlab {
            dimensions,
            start: selection[..rank].to_vec(),
            stride: selection[rank..2 * rank].to_vec(),
            count: selection[2 * rank..].to_vec(),
            source: Box::new(source),
        })
    }

    pub fn dimensions(&self) -> &[usize] {
        match self {
            DataItem::Uniform { dimensions, .. } | DataItem::HyperSlab { dimensions, .. } => dimensions,
        }
    }

    /// Total number of values, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        checked_product(self.dimensions()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> Result<Values, XdmfError> {
        match self {
            DataItem::Uniform {
                scalar,
                source: DataSource::Inline(text),
                ..
            } => {
                let values = scalar.parse_text(text)?;
                check_len("inline data item", self.len(), values.len())?;
                Ok(values)
            }
            DataItem::Uniform {
                scalar,
                source: DataSource::Binary { file, seek },
                ..
            } => {
                let out_of_range = || XdmfError::InvalidAttribute {
                    element: "DataItem",
                    attribute: "Dimensions",
                    value: format!("{:?} at byte offset {seek}", self.dimensions()),
                };
                let start = usize::try_from(*seek).map_err(|_| out_of_range())?;
                let end = checked_product(self.dimensions())
                    .and_then(|n| n.checked_mul(scalar.size()))
                    .and_then(|n| n.checked_add(start))
                    .ok_or_else(out_of_range)?;
                let bytes = std::fs::read(file).map_err(|source| XdmfError::Io {
                    path: file.clone(),
                    source,
                })?;
                if bytes.len() < end {
                    return Err(XdmfError::Truncated {
                        path: file.clone(),
                        expected: end as u64,
                        actual: bytes.len() as u64,
                    });
                }
                Ok(scalar.decode(&bytes[start..end]))
            }
            DataItem::HyperSlab {
                start,
                stride,
                count,
                source,
                ..
            } => {
                let selected = checked_product(count).unwrap_or(usize::MAX);
                check_len("hyperslab", self.len(), selected)?;
                let values = source.read()?;
                let indices = slab_indices(source.dimensions(), start, stride, count)?;
                Ok(values.select(&indices))
            }
        }
    }
}

fn parse_dimensions(node: Node) -> Result<Vec<usize>, XdmfError> {
    let raw = node.attribute("Dimensions").ok_or(XdmfError::MissingAttribute {
        element: "DataItem",
        attribute: "Dimensions",
    })?;
    let invalid = || XdmfError::InvalidAttribute {
        element: "DataItem",
        attribute: "Dimensions",
        value: raw.to_string(),
    };
    let dimensions = raw
        .split_whitespace()
        .map(|d| d.parse::<usize>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    if dimensions.is_empty() {
        return Err(invalid());
    }
    Ok(dimensions)
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), XdmfError> {
    if expected == actual {
        Ok(())
    } else {
        Err(XdmfError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}

fn checked_product(values: &[usize]) -> Option<usize> {
    values.iter().try_fold(1usize, |n, v| n.checked_mul(*v))
}

/// Flat row-major source indices of a hyperslab selection.
fn slab_indices(
    dimensions: &[usize],
    start: &[usize],
    stride: &[usize],
    count: &[usize],
) -> Result<Vec<usize>, XdmfError> {
    for axis in 0..dimensions.len() {
        if count[axis] == 0 {
            continue;
        }
        let last = stride[axis]
            .checked_mul(count[axis] - 1)
            .and_then(|offset| offset.checked_add(start[axis]));
        match last {
            Some(last) if last < dimensions[axis] => {}
            last => {
                return Err(XdmfError::ShapeMismatch {
                    what: format!("hyperslab axis {axis}"),
                    expected: dimensions[axis],
                    actual: last.map_or(usize::MAX, |l| l.saturating_add(1)),
                });
            }
        }
    }

    let mut indices = vec![0usize];
    for axis in 0..dimensions.len() {
        let mut next = Vec::with_capacity(indices.len() * count[axis]);
        for base in &indices {
            for i in 0..count[axis] {
                next.push(base * dimensions[axis] + start[axis] + i * stride[axis]);
            }
        }
        indices = next;
    }
    Ok(indices)
}
