//! Cursors over the legacy GIS engine.
//!
//! The engine offers forward-only portals for plain tables, queriers for
//! vector layers and whole rasters. None of them is random access, and all
//! text is stored as Latin-1.

mod geometry;
mod raster;
mod table;
mod vector;

pub use geometry::{LegacyGeometry, LegacyPoint};
pub use raster::LegacyRasterDataSet;
pub use table::{LegacyTable, LegacyTableDataSet};
pub use vector::{LegacyInstance, LegacyQuerier, LegacyVectorDataSet, SPATIAL_DATA_COLUMN};

use crate::cursor::ColumnDescriptor;
use crate::decode::RawValue;
use crate::encoding::CharEncoding;
use crate::errors::{CursorError, Result};
use crate::geometry::GeometryType;
use crate::types::{DateTimeKind, ValueKind};

/// Storage encoding of every string the engine hands out.
pub const ENGINE_ENCODING: CharEncoding = CharEncoding::Latin1;

/// Attribute types of the legacy engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LegacyAttrType {
    /// Text; `num_char` is 0 for unbounded text.
    String { num_char: usize },
    Real,
    Int,
    UnsignedInt,
    DateTime,
    Blob,
    Character,
    Boolean,
    Point,
    Node,
    Line2D,
    Polygon,
    Cell,
    PointSet,
    NodeSet,
    LineSet,
    PolygonSet,
    CellSet,
    Raster,
    Text,
    TextSet,
    Object,
    Unknown,
}

impl LegacyAttrType {
    pub fn name(&self) -> &'static str {
        match self {
            LegacyAttrType::String { .. } => "TeSTRING",
            LegacyAttrType::Real => "TeREAL",
            LegacyAttrType::Int => "TeINT",
            LegacyAttrType::UnsignedInt => "TeUNSIGNEDINT",
            LegacyAttrType::DateTime => "TeDATETIME",
            LegacyAttrType::Blob => "TeBLOB",
            LegacyAttrType::Character => "TeCHARACTER",
            LegacyAttrType::Boolean => "TeBOOLEAN",
            LegacyAttrType::Point => "TePOINTTYPE",
            LegacyAttrType::Node => "TeNODETYPE",
            LegacyAttrType::Line2D => "TeLINE2DTYPE",
            LegacyAttrType::Polygon => "TePOLYGONTYPE",
            LegacyAttrType::Cell => "TeCELLTYPE",
            LegacyAttrType::PointSet => "TePOINTSETTYPE",
            LegacyAttrType::NodeSet => "TeNODESETTYPE",
            LegacyAttrType::LineSet => "TeLINESETTYPE",
            LegacyAttrType::PolygonSet => "TePOLYGONSETTYPE",
            LegacyAttrType::CellSet => "TeCELLSETTYPE",
            LegacyAttrType::Raster => "TeRASTERTYPE",
            LegacyAttrType::Text => "TeTEXTTYPE",
            LegacyAttrType::TextSet => "TeTEXTSETTYPE",
            LegacyAttrType::Object => "TeOBJECT",
            LegacyAttrType::Unknown => "TeUNKNOWN",
        }
    }

    /// The value kind an attribute of this type is exposed as.
    ///
    /// Nodes, texts and objects have no tabular representation and are
    /// rejected.
    pub fn value_kind(&self) -> Result<ValueKind> {
        let kind = match self {
            LegacyAttrType::String { .. } => ValueKind::String,
            LegacyAttrType::Real => ValueKind::Double,
            LegacyAttrType::Int => ValueKind::Int32,
            LegacyAttrType::UnsignedInt => ValueKind::Int64,
            LegacyAttrType::DateTime => ValueKind::DateTime(DateTimeKind::Timestamp),
            LegacyAttrType::Blob => ValueKind::ByteArray,
            LegacyAttrType::Character => ValueKind::Char,
            LegacyAttrType::Boolean => ValueKind::Bool,
            LegacyAttrType::Point
            | LegacyAttrType::Line2D
            | LegacyAttrType::Polygon
            | LegacyAttrType::Cell
            | LegacyAttrType::PointSet
            | LegacyAttrType::LineSet
            | LegacyAttrType::PolygonSet
            | LegacyAttrType::CellSet => ValueKind::Geometry,
            LegacyAttrType::Raster => ValueKind::Raster,
            LegacyAttrType::Unknown => ValueKind::Unknown,
            LegacyAttrType::Node
            | LegacyAttrType::NodeSet
            | LegacyAttrType::Text
            | LegacyAttrType::TextSet
            | LegacyAttrType::Object => {
                return Err(CursorError::UnsupportedColumnType {
                    type_name: self.name().to_string(),
                    method_name: "value_kind",
                })
            }
        };
        Ok(kind)
    }

    /// Shape of a geometric attribute.
    pub fn geometry_type(&self) -> Option<GeometryType> {
        match self {
            LegacyAttrType::Point | LegacyAttrType::Node => Some(GeometryType::Point),
            LegacyAttrType::Line2D => Some(GeometryType::LineString),
            LegacyAttrType::Polygon | LegacyAttrType::Cell => Some(GeometryType::Polygon),
            LegacyAttrType::PointSet | LegacyAttrType::NodeSet => Some(GeometryType::MultiPoint),
            LegacyAttrType::LineSet => Some(GeometryType::MultiLineString),
            LegacyAttrType::PolygonSet | LegacyAttrType::CellSet => {
                Some(GeometryType::MultiPolygon)
            }
            _ => None,
        }
    }
}

/// An attribute as described by the engine; the name is Latin-1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyAttribute {
    pub name: Vec<u8>,
    pub attr_type: LegacyAttrType,
}

impl LegacyAttribute {
    pub fn new(name: &str, attr_type: LegacyAttrType) -> Self {
        // Characters outside Latin-1 cannot be stored by the engine.
        let name = name
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect();
        LegacyAttribute { name, attr_type }
    }
}

/// Column descriptors for the engine's attributes, in engine order.
fn attribute_columns(
    attributes: &[LegacyAttribute],
    origin: Option<&str>,
) -> Result<Vec<ColumnDescriptor>> {
    attributes
        .iter()
        .enumerate()
        .map(|(i, attr)| {
            let name = ENGINE_ENCODING
                .decode(&attr.name)
                .map_err(|e| CursorError::access(i, "", e))?;
            Ok(ColumnDescriptor::new(i, name, attr.attr_type.value_kind()?)
                .with_origin(origin)
                .with_encoding(ENGINE_ENCODING))
        })
        .collect()
}

/// Tags engine bytes with the engine encoding where the column holds text.
fn from_engine(raw: RawValue, kind: ValueKind) -> RawValue {
    match (raw, kind) {
        (RawValue::Bytes(bytes), ValueKind::String) => {
            RawValue::EncodedText(bytes, ENGINE_ENCODING)
        }
        (RawValue::Bytes(bytes), ValueKind::Char) if bytes.len() == 1 => {
            RawValue::Int(bytes[0] as i8 as i64)
        }
        (raw, _) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_mapping() {
        assert_eq!(
            LegacyAttrType::String { num_char: 0 }.value_kind().unwrap(),
            ValueKind::String
        );
        assert_eq!(LegacyAttrType::Real.value_kind().unwrap(), ValueKind::Double);
        assert_eq!(LegacyAttrType::CellSet.value_kind().unwrap(), ValueKind::Geometry);
        assert_eq!(
            LegacyAttrType::CellSet.geometry_type(),
            Some(GeometryType::MultiPolygon)
        );
        assert!(matches!(
            LegacyAttrType::TextSet.value_kind(),
            Err(CursorError::UnsupportedColumnType { .. })
        ));
    }

    #[test]
    fn test_latin1_names_and_text() {
        let attrs = vec![LegacyAttribute::new("população", LegacyAttrType::Int)];
        assert_eq!(attrs[0].name.len(), "população".chars().count());
        let columns = attribute_columns(&attrs, Some("cities")).unwrap();
        assert_eq!(columns[0].name(), "população");
        assert_eq!(columns[0].origin(), Some("cities"));
        assert_eq!(columns[0].encoding(), None);

        assert_eq!(
            from_engine(RawValue::Bytes(vec![0xC9]), ValueKind::String),
            RawValue::EncodedText(vec![0xC9], CharEncoding::Latin1)
        );
        assert_eq!(
            from_engine(RawValue::Bytes(vec![b'A']), ValueKind::Char),
            RawValue::Int(65)
        );
        assert_eq!(
            from_engine(RawValue::Bytes(vec![1, 2]), ValueKind::ByteArray),
            RawValue::Bytes(vec![1, 2])
        );
    }
}
