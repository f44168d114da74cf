use std::collections::HashMap;

use super::{Recordset, RecordsetFieldType};
use crate::cursor::{
    capability_error, check_column, check_row, ColumnDescriptor, CursorPosition, RowCursor,
};
use crate::decode::{self, read_chunked, RawValue};
use crate::encoding::CharEncoding;
use crate::errors::{CursorError, Result};
use crate::options::{AccessPolicy, CursorFlags, CursorOptions, TraverseType};
use crate::types::ValueKind;

/// A cursor over a live [`Recordset`].
///
/// The native recordset sits on its first record as soon as it is opened,
/// while the cursor starts before it. The first `move_next` therefore only
/// checks for EOF; every later one advances the native cursor.
///
/// Binary fields are read in chunks of at most
/// [`MAX_CHUNK_SIZE`](crate::decode::MAX_CHUNK_SIZE) bytes using the size
/// the recordset reports for the current record.
pub struct RecordsetDataSet<R: Recordset> {
    recordset: R,
    columns: Vec<ColumnDescriptor>,
    field_types: Vec<RecordsetFieldType>,
    names: HashMap<String, usize>,
    position: CursorPosition,
    size: Option<usize>,
    traverse: TraverseType,
    connected: bool,
    encoding: CharEncoding,
    decimal_separator: char,
}

impl<R: Recordset> RecordsetDataSet<R> {
    /// Wraps an open recordset; the cursor starts before the first row.
    ///
    /// Scrollable recordsets with a known record count are bidirectional,
    /// or random access when [`CursorFlags::RANDOM_ACCESS`] is requested.
    /// Anything else is forward-only.
    ///
    /// [`CursorFlags::DISCONNECTED`] declares a client-side recordset that
    /// holds its records after the connection is released.
    pub fn new(recordset: R, options: &CursorOptions) -> Result<Self> {
        let field_count = recordset.field_count()?;
        let mut columns = Vec::with_capacity(field_count);
        let mut field_types = Vec::with_capacity(field_count);
        let mut names = HashMap::with_capacity(field_count);
        for i in 0..field_count {
            let name = recordset.field_name(i)?;
            let field_type = recordset.field_type(i)?;
            let kind = if options.is_geometry_column(&name) {
                ValueKind::Geometry
            } else if options.is_raster_column(&name) {
                ValueKind::Raster
            } else {
                field_type.value_kind()
            };
            names.entry(name.clone()).or_insert(i);
            columns.push(
                ColumnDescriptor::new(i, name, kind)
                    .with_origin(options.origin)
                    .with_encoding(options.encoding),
            );
            field_types.push(field_type);
        }

        let size = recordset.record_count()?;
        let traverse = match (recordset.is_scrollable(), size) {
            (true, Some(_)) if options.flags.contains(CursorFlags::RANDOM_ACCESS) => {
                TraverseType::Random
            }
            (true, Some(_)) => TraverseType::Bidirectional,
            _ => TraverseType::ForwardOnly,
        };
        tracing::debug!(columns = columns.len(), ?size, ?traverse, "opened recordset cursor");

        Ok(RecordsetDataSet {
            recordset,
            columns,
            field_types,
            names,
            position: CursorPosition::BeforeFirst,
            size,
            traverse,
            connected: !options.flags.contains(CursorFlags::DISCONNECTED),
            encoding: options.encoding,
            decimal_separator: options.decimal_separator,
        })
    }

    pub fn recordset(&self) -> &R {
        &self.recordset
    }

    pub fn into_inner(self) -> R {
        self.recordset
    }

    /// Settles the position after a native motion that targeted `row`.
    fn land(&mut self, row: usize) -> Result<bool> {
        if self.recordset.eof()? {
            self.position = CursorPosition::AfterLast;
            Ok(false)
        } else {
            self.position = CursorPosition::Row(row);
            Ok(true)
        }
    }

    fn require(&self, allowed: bool, method_name: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(capability_error(self, method_name))
        }
    }

    fn read_binary(&self, i: usize) -> Result<RawValue> {
        let size = self.recordset.actual_size(i)?;
        if size == 0 {
            return self.recordset.value(i);
        }
        let mut reader = self.recordset.chunk_reader(i)?;
        let bytes = read_chunked(reader.as_mut(), size, i, self.columns[i].name())?;
        Ok(RawValue::Bytes(bytes))
    }
}

impl<R: Recordset> RowCursor for RecordsetDataSet<R> {
    fn traverse_type(&self) -> TraverseType {
        self.traverse
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::Read
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn size(&self) -> Option<usize> {
        self.size
    }

    fn position(&self) -> CursorPosition {
        self.position
    }

    fn move_next(&mut self) -> Result<bool> {
        let next = match self.position {
            CursorPosition::BeforeFirst => 0,
            CursorPosition::Row(i) => {
                self.recordset.move_next()?;
                i + 1
            }
            CursorPosition::AfterLast => return Ok(false),
        };
        self.land(next)
    }

    fn move_previous(&mut self) -> Result<bool> {
        self.require(self.traverse.can_move_backward(), "move_previous")?;
        match self.position {
            CursorPosition::BeforeFirst => Ok(false),
            CursorPosition::Row(0) => {
                self.move_before_first()?;
                Ok(false)
            }
            CursorPosition::Row(i) => {
                self.recordset.move_previous()?;
                self.position = CursorPosition::Row(i - 1);
                Ok(true)
            }
            CursorPosition::AfterLast => self.move_last(),
        }
    }

    /// Rewinds the native recordset as well, so that it sits on its first
    /// record again.
    fn move_before_first(&mut self) -> Result<()> {
        if self.position != CursorPosition::BeforeFirst {
            self.recordset.move_first()?;
            self.position = CursorPosition::BeforeFirst;
        }
        Ok(())
    }

    fn move_first(&mut self) -> Result<bool> {
        if self.position == CursorPosition::BeforeFirst {
            return self.move_next();
        }
        self.require(self.traverse.can_move_backward(), "move_first")?;
        self.recordset.move_first()?;
        self.land(0)
    }

    fn move_last(&mut self) -> Result<bool> {
        self.require(self.traverse.can_move_backward(), "move_last")?;
        match self.size {
            Some(0) | None => {
                self.move_before_first()?;
                Ok(false)
            }
            Some(n) => {
                self.recordset.move_last()?;
                self.land(n - 1)
            }
        }
    }

    fn move_to(&mut self, i: usize) -> Result<bool> {
        self.require(self.traverse.can_move_absolute(), "move_to")?;
        if self.size.map_or(true, |n| i >= n) {
            tracing::debug!(row = i, size = ?self.size, "move_to out of range");
            return Ok(false);
        }
        self.recordset.set_absolute_position(i)?;
        self.land(i)
    }

    fn raw_value(&self, i: usize) -> Result<RawValue> {
        check_row(self, "raw_value")?;
        let kind = check_column(self, i, "raw_value")?.kind();
        if self.field_types[i].is_binary() {
            return self.read_binary(i);
        }
        match self.recordset.value(i)? {
            RawValue::Bytes(bytes) if kind == ValueKind::String => {
                Ok(RawValue::EncodedText(bytes, self.encoding))
            }
            raw => Ok(raw),
        }
    }

    /// Binary fields are tested through their reported size, without
    /// fetching their content.
    fn is_null(&self, i: usize) -> Result<bool> {
        check_row(self, "is_null")?;
        check_column(self, i, "is_null")?;
        if !self.field_types[i].is_binary() {
            return self.raw_value(i).map(|raw| decode::is_null(&raw));
        }
        if self.recordset.actual_size(i)? > 0 {
            return Ok(false);
        }
        self.recordset.value(i).map(|raw| decode::is_null(&raw))
    }

    fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| CursorError::InvalidColumnName {
                column_name: name.to_string(),
                method_name: "column_index",
            })
    }
}
