use super::geometry::bridge_to_wkb;
use super::{attribute_columns, from_engine, LegacyAttribute, LegacyGeometry, ENGINE_ENCODING};
use crate::cursor::{check_column, ColumnDescriptor, CursorPosition, RowCursor};
use crate::decode::RawValue;
use crate::errors::{CursorError, Result};
use crate::geometry::Envelope;
use crate::options::{AccessPolicy, TraverseType};
use crate::types::ValueKind;

/// Name of the geometry column appended to layers with vector data.
pub const SPATIAL_DATA_COLUMN: &str = "spatial_data";

/// One object of a vector layer: its attribute values and every geometry
/// representation attached to it.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyInstance {
    pub values: Vec<RawValue>,
    pub geometries: Vec<LegacyGeometry>,
}

/// Streams the objects of a vector layer.
pub trait LegacyQuerier {
    /// Layer name, Latin-1.
    fn layer_name(&self) -> &[u8];

    fn attributes(&self) -> Result<Vec<LegacyAttribute>>;

    /// Whether the layer has a vector representation.
    fn has_geometry(&self) -> bool;

    /// EPSG code of the layer projection.
    fn epsg_code(&self) -> Option<i32>;

    /// Bounding box stored with the layer.
    fn layer_box(&self) -> Option<Envelope>;

    /// Runs the query from the start; `false` when it matched nothing.
    fn load_instances(&mut self) -> Result<bool>;

    fn num_elem_instances(&self) -> Option<usize>;

    /// The next object, `None` once the query is exhausted.
    fn fetch_instance(&mut self) -> Result<Option<LegacyInstance>>;
}

/// Forward-only cursor over a vector layer.
///
/// Attributes come first, in engine order. A layer with geometry gets one
/// more column, [`SPATIAL_DATA_COLUMN`], whose values are the object's
/// geometries re-encoded as WKB tagged with the layer SRID.
pub struct LegacyVectorDataSet<'a, Q: LegacyQuerier + ?Sized> {
    querier: &'a mut Q,
    columns: Vec<ColumnDescriptor>,
    geometry_column: Option<usize>,
    srid: Option<i32>,
    current: Option<LegacyInstance>,
    position: CursorPosition,
}

impl<'a, Q: LegacyQuerier + ?Sized> LegacyVectorDataSet<'a, Q> {
    pub fn new(querier: &'a mut Q) -> Result<Self> {
        let layer = ENGINE_ENCODING
            .decode(querier.layer_name())
            .map_err(|e| CursorError::access(0, "", e))?;
        let mut columns = attribute_columns(&querier.attributes()?, Some(layer.as_str()))?;
        let geometry_column = if querier.has_geometry() {
            let index = columns.len();
            columns.push(
                ColumnDescriptor::new(index, SPATIAL_DATA_COLUMN, ValueKind::Geometry)
                    .with_origin(Some(layer.as_str())),
            );
            Some(index)
        } else {
            None
        };
        // 3D WGS84 is served as its 2D counterpart.
        let srid = querier.epsg_code().map(|c| if c == 4979 { 4326 } else { c });

        let found = querier.load_instances()?;
        tracing::debug!(%layer, columns = columns.len(), ?srid, found, "opened legacy layer");

        Ok(LegacyVectorDataSet {
            querier,
            columns,
            geometry_column,
            srid,
            current: None,
            position: CursorPosition::BeforeFirst,
        })
    }

    /// SRID attached to the geometries of [`SPATIAL_DATA_COLUMN`].
    pub fn srid(&self) -> Option<i32> {
        self.srid
    }
}

impl<Q: LegacyQuerier + ?Sized> RowCursor for LegacyVectorDataSet<'_, Q> {
    fn traverse_type(&self) -> TraverseType {
        TraverseType::ForwardOnly
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::Read
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn size(&self) -> Option<usize> {
        self.querier.num_elem_instances()
    }

    fn position(&self) -> CursorPosition {
        self.position
    }

    fn move_next(&mut self) -> Result<bool> {
        let next = match self.position {
            CursorPosition::BeforeFirst => 0,
            CursorPosition::Row(i) => i + 1,
            CursorPosition::AfterLast => return Ok(false),
        };
        self.current = self.querier.fetch_instance()?;
        self.position = match self.current {
            Some(_) => CursorPosition::Row(next),
            None => CursorPosition::AfterLast,
        };
        Ok(self.current.is_some())
    }

    /// Re-runs the layer query.
    fn move_before_first(&mut self) -> Result<()> {
        if self.position != CursorPosition::BeforeFirst {
            self.querier.load_instances()?;
            self.current = None;
            self.position = CursorPosition::BeforeFirst;
        }
        Ok(())
    }

    fn raw_value(&self, i: usize) -> Result<RawValue> {
        let kind = check_column(self, i, "raw_value")?.kind();
        let instance = self.current.as_ref().ok_or(CursorError::CursorState {
            method_name: "raw_value",
            position: self.position,
        })?;
        if Some(i) == self.geometry_column {
            return Ok(bridge_to_wkb(&instance.geometries, self.srid)
                .map(RawValue::Bytes)
                .unwrap_or(RawValue::Null));
        }
        let raw = instance.values.get(i).cloned().unwrap_or(RawValue::Null);
        Ok(from_engine(raw, kind))
    }

    /// The layer box for [`SPATIAL_DATA_COLUMN`].
    fn get_extent(&self, i: usize) -> Result<Option<Envelope>> {
        let column = check_column(self, i, "get_extent")?;
        if Some(i) != self.geometry_column {
            return Err(CursorError::UnsupportedColumnType {
                type_name: column.kind().to_string(),
                method_name: "get_extent",
            });
        }
        Ok(self.querier.layer_box())
    }
}
