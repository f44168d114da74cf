use crate::cursor::{
    check_column, check_row, check_writable, ColumnDescriptor, CursorPosition, RowCursor,
    RowPosition,
};
use crate::decode::{self, RawValue};
use crate::errors::{CursorError, Result};
use crate::geometry::{Envelope, Geometry};
use crate::options::{AccessPolicy, CursorFlags, TraverseType};
use crate::types::{Value, ValueKind};

/// An in-memory table of decoded values.
///
/// Random access; nothing is borrowed from a backend, so the data set may
/// outlive the cursor it was copied from. A new table is writable until
/// [`with_flags`](Self::with_flags) narrows it; every mutator fails with
/// [`CursorError::ReadOnly`] on a read-only table.
///
/// Unlike backend cursors, a writable table may change its column set
/// through [`add_column`](Self::add_column) and
/// [`drop_column`](Self::drop_column). Descriptors obtained before such a
/// call are stale afterwards.
#[derive(Debug, Clone)]
pub struct MemoryDataSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<Option<Value>>>,
    position: RowPosition,
    access: AccessPolicy,
}

impl MemoryDataSet {
    /// An empty data set; column indexes are renumbered to their position.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.reindexed(i))
            .collect();
        MemoryDataSet {
            columns,
            rows: Vec::new(),
            position: RowPosition::new(0),
            access: AccessPolicy::ReadWrite,
        }
    }

    /// Sets the access policy from `flags`; without `UPDATE` the table
    /// becomes read-only.
    pub fn with_flags(mut self, flags: CursorFlags) -> Self {
        self.access = flags.access_policy();
        self
    }

    /// Copies rows from `source`, starting after its current position.
    ///
    /// With a `limit`, exactly that many rows are copied and a source that
    /// runs out earlier is an error; without one the source is drained.
    /// The new data set is positioned before its first row and its access
    /// policy follows `flags`.
    pub fn from_cursor<C: RowCursor + ?Sized>(
        source: &mut C,
        limit: Option<usize>,
        flags: CursorFlags,
    ) -> Result<Self> {
        let mut ds = MemoryDataSet::new(source.columns().to_vec());
        tracing::debug!(columns = ds.columns.len(), ?limit, "materializing cursor");
        while limit.map_or(true, |limit| ds.rows.len() < limit) {
            if !source.move_next()? {
                break;
            }
            let row = (0..ds.columns.len())
                .map(|i| source.get_value(i))
                .collect::<Result<Vec<_>>>()?;
            ds.rows.push(row);
            ds.position.push_row();
        }
        if let Some(requested) = limit {
            if ds.rows.len() < requested {
                return Err(CursorError::MaterializationShortfall {
                    requested,
                    available: ds.rows.len(),
                });
            }
        }
        tracing::debug!(rows = ds.rows.len(), "materialized cursor");
        Ok(ds.with_flags(flags))
    }

    /// Appends a row; values are coerced to the column kinds.
    ///
    /// The cursor position is not changed.
    pub fn add_row(&mut self, row: Vec<Option<Value>>) -> Result<()> {
        check_writable(self, "add_row")?;
        if row.len() != self.columns.len() {
            return Err(CursorError::InvalidColumnIndex {
                index: row.len(),
                method_name: "add_row",
            });
        }
        let row = row
            .into_iter()
            .enumerate()
            .map(|(i, v)| self.coerce(i, v))
            .collect::<Result<Vec<_>>>()?;
        self.rows.push(row);
        self.position.push_row();
        Ok(())
    }

    /// Removes the current row; the cursor moves onto the row that followed.
    pub fn remove_row(&mut self) -> Result<()> {
        check_writable(self, "remove_row")?;
        let row = check_row(self, "remove_row")?;
        self.rows.remove(row);
        self.position.remove_row(row);
        Ok(())
    }

    /// Replaces column `i` of the current row.
    pub fn set_value(&mut self, i: usize, value: Option<Value>) -> Result<()> {
        check_writable(self, "set_value")?;
        let row = check_row(self, "set_value")?;
        check_column(self, i, "set_value")?;
        let value = self.coerce(i, value)?;
        self.rows[row][i] = value;
        Ok(())
    }

    /// Appends a column, filling existing rows with `default`.
    ///
    /// The new column takes the next index; existing indexes are kept.
    pub fn add_column(
        &mut self,
        name: &str,
        kind: ValueKind,
        default: Option<Value>,
    ) -> Result<()> {
        check_writable(self, "add_column")?;
        let index = self.columns.len();
        self.columns.push(ColumnDescriptor::new(index, name, kind));
        let default = match self.coerce(index, default) {
            Ok(v) => v,
            Err(e) => {
                self.columns.pop();
                return Err(e);
            }
        };
        for row in &mut self.rows {
            row.push(default.clone());
        }
        Ok(())
    }

    /// Removes column `i`; later columns shift down by one, so indexes
    /// resolved earlier through [`column_index`](RowCursor::column_index)
    /// must be resolved again.
    pub fn drop_column(&mut self, i: usize) -> Result<()> {
        check_writable(self, "drop_column")?;
        check_column(self, i, "drop_column")?;
        self.columns.remove(i);
        for row in &mut self.rows {
            row.remove(i);
        }
        self.columns = std::mem::take(&mut self.columns)
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.reindexed(i))
            .collect();
        Ok(())
    }

    fn coerce(&self, i: usize, value: Option<Value>) -> Result<Option<Value>> {
        let column = check_column(self, i, "coerce")?;
        let kind = column.kind();
        match value {
            None => Ok(None),
            Some(v) if kind == ValueKind::Unknown || v.kind() == kind => Ok(Some(v)),
            Some(v) => decode::decode_value(&RawValue::from(v), kind)
                .map_err(|e| CursorError::access(i, column.name(), e)),
        }
    }

    fn cell(&self, i: usize, method_name: &'static str) -> Result<Option<&Value>> {
        let row = check_row(self, method_name)?;
        check_column(self, i, method_name)?;
        Ok(self.rows[row][i].as_ref())
    }
}

impl RowCursor for MemoryDataSet {
    fn traverse_type(&self) -> TraverseType {
        TraverseType::Random
    }

    fn access_policy(&self) -> AccessPolicy {
        self.access
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn size(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn position(&self) -> CursorPosition {
        self.position.position()
    }

    fn move_next(&mut self) -> Result<bool> {
        Ok(self.position.move_next())
    }

    fn move_previous(&mut self) -> Result<bool> {
        Ok(self.position.move_previous())
    }

    fn move_before_first(&mut self) -> Result<()> {
        self.position.move_before_first();
        Ok(())
    }

    fn move_first(&mut self) -> Result<bool> {
        Ok(self.position.move_first())
    }

    fn move_last(&mut self) -> Result<bool> {
        Ok(self.position.move_last())
    }

    fn move_to(&mut self, i: usize) -> Result<bool> {
        Ok(self.position.move_to(i))
    }

    fn raw_value(&self, i: usize) -> Result<RawValue> {
        Ok(self
            .cell(i, "raw_value")?
            .cloned()
            .map(RawValue::from)
            .unwrap_or(RawValue::Null))
    }

    /// Merged bounding box of every geometry stored in column `i`.
    fn get_extent(&self, i: usize) -> Result<Option<Envelope>> {
        let column = check_column(self, i, "get_extent")?;
        if column.kind() != ValueKind::Geometry {
            return Err(CursorError::UnsupportedColumnType {
                type_name: column.kind().to_string(),
                method_name: "get_extent",
            });
        }
        let mut rv: Option<Envelope> = None;
        for row in &self.rows {
            if let Some(Value::Geometry(g)) = &row[i] {
                if let Some(env) = g.envelope() {
                    match rv.as_mut() {
                        Some(acc) => acc.merge(&env),
                        None => rv = Some(env),
                    }
                }
            }
        }
        Ok(rv)
    }

    fn is_null(&self, i: usize) -> Result<bool> {
        self.cell(i, "is_null").map(|v| v.is_none())
    }

    fn get_value(&self, i: usize) -> Result<Option<Value>> {
        self.cell(i, "get_value").map(|v| v.cloned())
    }

    fn get_geometry(&self, i: usize) -> Result<Geometry> {
        match self.cell(i, "get_geometry")? {
            Some(Value::Geometry(g)) => Ok(g.clone()),
            other => {
                let raw = other.cloned().map(RawValue::from).unwrap_or(RawValue::Null);
                decode::decode_geometry(&raw)
                    .map_err(|e| CursorError::access(i, self.columns[i].name(), e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeError;
    use crate::geometry::{Coord, Dimension, Shape};
    use crate::test_utils::assert_near;

    fn cities() -> MemoryDataSet {
        let mut ds = MemoryDataSet::new(vec![
            ColumnDescriptor::new(0, "name", ValueKind::String),
            ColumnDescriptor::new(1, "population", ValueKind::Int64),
            ColumnDescriptor::new(2, "geom", ValueKind::Geometry),
        ]);
        for (name, population, x, y) in [
            ("Recife", 1_500_000, -34.9, -8.0),
            ("Natal", 800_000, -35.2, -5.8),
            ("Salvador", 2_400_000, -38.5, -12.9),
        ] {
            ds.add_row(vec![
                Some(Value::String(name.to_string())),
                Some(Value::Int32(population)),
                Some(Value::Geometry(Geometry::point(x, y).with_srid(4326))),
            ])
            .unwrap();
        }
        ds
    }

    #[test]
    fn test_iterate_and_coerce() {
        let mut ds = cities();
        assert_eq!(ds.size(), Some(3));
        assert!(ds.move_next().unwrap());
        assert_eq!(ds.get_string(0).unwrap(), "Recife");
        assert_eq!(ds.get_value(1).unwrap(), Some(Value::Int64(1_500_000)));
        assert_eq!(ds.get_int32_by_name("population").unwrap(), 1_500_000);
        assert_eq!(ds.get_geometry(2).unwrap().srid(), Some(4326));
        assert_eq!(ds.get_as_string(1, 0).unwrap(), "1500000");
    }

    #[test]
    fn test_random_access() {
        let mut ds = cities();
        assert!(ds.move_last().unwrap());
        assert!(ds.is_at_end());
        assert_eq!(ds.get_string(0).unwrap(), "Salvador");
        assert!(ds.move_to(1).unwrap());
        assert_eq!(ds.get_string(0).unwrap(), "Natal");
        assert!(ds.move_previous().unwrap());
        assert!(ds.is_at_begin());
        assert!(!ds.move_previous().unwrap());
        assert!(ds.is_before_begin());
    }

    #[test]
    fn test_extent() {
        let ds = cities();
        let env = ds.get_extent(2).unwrap().unwrap();
        assert_near!(
            Envelope,
            env,
            Envelope::new(-38.5, -12.9, -34.9, -5.8),
            epsilon = 1e-12
        );
        assert!(matches!(
            ds.get_extent(0),
            Err(CursorError::UnsupportedColumnType { .. })
        ));
    }

    #[test]
    fn test_set_and_remove() {
        let mut ds = cities();
        ds.move_to(1).unwrap();
        ds.set_value(1, Some(Value::Int64(900_000))).unwrap();
        assert_eq!(ds.get_int64(1).unwrap(), 900_000);
        ds.set_value(0, None).unwrap();
        assert!(ds.is_null(0).unwrap());

        ds.remove_row().unwrap();
        assert_eq!(ds.size(), Some(2));
        assert_eq!(ds.position(), CursorPosition::Row(1));
        assert_eq!(ds.get_string(0).unwrap(), "Salvador");

        ds.remove_row().unwrap();
        assert!(ds.is_after_end());
        assert!(matches!(
            ds.remove_row(),
            Err(CursorError::CursorState { .. })
        ));
    }

    #[test]
    fn test_set_value_rejects_wrong_kind() {
        let mut ds = cities();
        ds.move_first().unwrap();
        let err = ds
            .set_value(1, Some(Value::String("many".into())))
            .unwrap_err();
        assert!(matches!(
            err.decode_error(),
            Some(DecodeError::TypeMismatch { .. })
        ));
        assert_eq!(ds.get_int64(1).unwrap(), 1_500_000);
    }

    #[test]
    fn test_add_and_drop_column() {
        let mut ds = cities();
        ds.add_column("capital", ValueKind::Bool, Some(Value::Bool(true)))
            .unwrap();
        ds.drop_column(0).unwrap();
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.column_index("capital").unwrap(), 2);
        assert_eq!(ds.column(2).unwrap().index(), 2);
        ds.move_first().unwrap();
        assert!(ds.get_bool(2).unwrap());
        assert!(ds.column_index("name").is_err());
    }

    #[test]
    fn test_from_cursor() {
        let mut source = cities();
        let copy = MemoryDataSet::from_cursor(&mut source, Some(2), CursorFlags::UPDATE).unwrap();
        assert_eq!(copy.size(), Some(2));
        assert_eq!(source.position(), CursorPosition::Row(1));

        source.move_before_first().unwrap();
        let err = MemoryDataSet::from_cursor(&mut source, Some(5), CursorFlags::UPDATE).unwrap_err();
        assert!(matches!(
            err,
            CursorError::MaterializationShortfall {
                requested: 5,
                available: 3
            }
        ));

        source.move_before_first().unwrap();
        let mut all = MemoryDataSet::from_cursor(&mut source, None, CursorFlags::UPDATE).unwrap();
        all.move_last().unwrap();
        assert_eq!(all.get_string(0).unwrap(), "Salvador");
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut ds = cities().with_flags(CursorFlags::READ_ONLY);
        assert_eq!(ds.access_policy(), AccessPolicy::Read);
        ds.move_first().unwrap();

        assert!(matches!(
            ds.set_value(1, Some(Value::Int64(1))),
            Err(CursorError::ReadOnly { method_name: "set_value" })
        ));
        assert!(matches!(
            ds.remove_row(),
            Err(CursorError::ReadOnly { method_name: "remove_row" })
        ));
        assert!(matches!(
            ds.add_column("capital", ValueKind::Bool, None),
            Err(CursorError::ReadOnly { method_name: "add_column" })
        ));
        assert!(matches!(
            ds.drop_column(0),
            Err(CursorError::ReadOnly { method_name: "drop_column" })
        ));
        assert!(matches!(
            ds.add_row(vec![None, None, None]),
            Err(CursorError::ReadOnly { method_name: "add_row" })
        ));

        assert_eq!(ds.size(), Some(3));
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.get_int64(1).unwrap(), 1_500_000);
        assert_eq!(ds.get_string(0).unwrap(), "Recife");
    }

    #[test]
    fn test_from_cursor_access_policy() {
        let mut source = cities();
        let mut copy = MemoryDataSet::from_cursor(&mut source, None, CursorFlags::default()).unwrap();
        assert_eq!(copy.access_policy(), AccessPolicy::Read);
        copy.move_first().unwrap();
        assert!(copy.set_value(0, None).is_err());
        assert!(!copy.is_null(0).unwrap());

        source.move_before_first().unwrap();
        let copy = MemoryDataSet::from_cursor(&mut source, None, CursorFlags::UPDATE).unwrap();
        assert_eq!(copy.access_policy(), AccessPolicy::ReadWrite);
    }

    #[test]
    fn test_add_row_rejects_bad_datetime_text() {
        let mut ds = MemoryDataSet::new(vec![ColumnDescriptor::new(
            0,
            "opens",
            ValueKind::DateTime(crate::types::DateTimeKind::TimeTz),
        )]);
        let err = ds
            .add_row(vec![Some(Value::String("08:00:00+1é1".to_string()))])
            .unwrap_err();
        assert!(matches!(
            err.decode_error(),
            Some(DecodeError::TypeMismatch { .. })
        ));
        assert_eq!(ds.size(), Some(0));
    }

    #[test]
    fn test_null_getters_fail() {
        let mut ds = MemoryDataSet::new(vec![ColumnDescriptor::new(0, "z", ValueKind::Geometry)]);
        ds.add_row(vec![None]).unwrap();
        ds.move_first().unwrap();
        assert!(ds.is_null(0).unwrap());
        assert_eq!(ds.get_value(0).unwrap(), None);
        assert_eq!(ds.get_as_string(0, 3).unwrap(), "");
        assert!(matches!(
            ds.get_geometry(0).unwrap_err().decode_error(),
            Some(DecodeError::TypeMismatch { found: "null", .. })
        ));
    }

    #[test]
    fn test_polygon_extent_merge() {
        let ring = vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(4.0, 0.0),
            Coord::xy(4.0, 1.0),
            Coord::xy(0.0, 0.0),
        ];
        let mut ds = MemoryDataSet::new(vec![ColumnDescriptor::new(0, "g", ValueKind::Geometry)]);
        ds.add_row(vec![Some(Value::Geometry(Geometry::new(
            Shape::Polygon(vec![ring]),
            Dimension::Xy,
        )))])
        .unwrap();
        ds.add_row(vec![Some(Value::Geometry(Geometry::point(-1.0, 5.0)))])
            .unwrap();
        assert_eq!(
            ds.get_extent(0).unwrap(),
            Some(Envelope::new(-1.0, 0.0, 4.0, 5.0))
        );
    }
}
