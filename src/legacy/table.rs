use super::{attribute_columns, from_engine, LegacyAttribute, ENGINE_ENCODING};
use crate::cursor::{ColumnDescriptor, CursorPosition, RowCursor, RowPosition};
use crate::decode::RawValue;
use crate::errors::{CursorError, Result};
use crate::options::{AccessPolicy, TraverseType};

/// A forward-only portal over a plain table of the legacy engine.
pub trait LegacyTable {
    /// Table name, Latin-1.
    fn name(&self) -> &[u8];

    fn attributes(&self) -> Result<Vec<LegacyAttribute>>;

    /// Advances the portal; `false` once it is exhausted.
    fn fetch_row(&mut self) -> Result<bool>;

    /// Value of attribute `i` on the fetched row. Text arrives as Latin-1
    /// bytes.
    fn value(&self, i: usize) -> Result<RawValue>;
}

/// A legacy table copied into memory when the cursor is built.
///
/// The portal is drained up front, so the size is known immediately and
/// the cursor supports random access without keeping the engine busy.
#[derive(Debug, Clone)]
pub struct LegacyTableDataSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<RawValue>>,
    position: RowPosition,
}

impl LegacyTableDataSet {
    pub fn new<T: LegacyTable + ?Sized>(table: &mut T) -> Result<Self> {
        let origin = ENGINE_ENCODING
            .decode(table.name())
            .map_err(|e| CursorError::access(0, "", e))?;
        let columns = attribute_columns(&table.attributes()?, Some(origin.as_str()))?;
        tracing::debug!(table = %origin, columns = columns.len(), "materializing legacy table");

        let mut rows = Vec::new();
        while table.fetch_row()? {
            let row = columns
                .iter()
                .map(|c| Ok(from_engine(table.value(c.index())?, c.kind())))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        tracing::debug!(table = %origin, rows = rows.len(), "materialized legacy table");

        Ok(LegacyTableDataSet {
            columns,
            position: RowPosition::new(rows.len()),
            rows,
        })
    }
}

impl RowCursor for LegacyTableDataSet {
    fn traverse_type(&self) -> TraverseType {
        TraverseType::Random
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::Read
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
        self.position
            .index()
            .and_then(|row| self.rows[row].get(i))
            .cloned()
            .ok_or(CursorError::InvalidColumnIndex {
                index: i,
                method_name: "raw_value",
            })
    }
}
