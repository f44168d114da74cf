//! The row cursor contract shared by every backend adapter.
//!
//! A [`RowCursor`] starts before the first row. Adapters implement the
//! positional primitives (motion, [`RowCursor::raw_value`] and metadata);
//! the typed getters, name based lookups and position probes are provided
//! on top of them and may be overridden where a backend has something
//! cheaper to offer.
//!
//! ```
//! use geocursor::{MemoryDataSet, RowCursor, Value, ValueKind};
//! use geocursor::cursor::ColumnDescriptor;
//!
//! let mut ds = MemoryDataSet::new(vec![ColumnDescriptor::new(0, "id", ValueKind::Int32)]);
//! ds.add_row(vec![Some(Value::Int32(7))]).unwrap();
//!
//! while ds.move_next().unwrap() {
//!     assert_eq!(ds.get_int32_by_name("id").unwrap(), 7);
//! }
//! assert!(ds.is_after_end());
//! ```

mod column;
mod position;

pub use column::ColumnDescriptor;
pub use position::{CursorPosition, RowPosition};

use crate::decode::{self, RawValue};
use crate::encoding::CharEncoding;
use crate::errors::{CursorError, DecodeError, Result};
use crate::geometry::{Envelope, Geometry};
use crate::options::{AccessPolicy, TraverseType};
use crate::types::{Array, DateTimeKind, DateTimeValue, RasterRef, Value, ValueKind};

pub trait RowCursor {
    /// How the cursor may be moved; fixed for the cursor's lifetime.
    fn traverse_type(&self) -> TraverseType;

    fn access_policy(&self) -> AccessPolicy;

    /// Whether the cursor holds a live backend connection rather than a
    /// materialized buffer.
    fn is_connected(&self) -> bool;

    fn columns(&self) -> &[ColumnDescriptor];

    /// Number of rows, or `None` when the backend cannot tell without
    /// reading to the end.
    fn size(&self) -> Option<usize>;

    fn position(&self) -> CursorPosition;

    /// Advances one row. `Ok(false)` means the cursor is now after the last
    /// row; that is the end-of-data signal, not an error.
    fn move_next(&mut self) -> Result<bool>;

    fn move_previous(&mut self) -> Result<bool> {
        Err(capability_error(&*self, "move_previous"))
    }

    /// Resets the cursor to before the first row. Always allowed.
    fn move_before_first(&mut self) -> Result<()>;

    /// Moves to the first row.
    ///
    /// A forward-only cursor can only do so while it is still before the
    /// first row.
    fn move_first(&mut self) -> Result<bool> {
        if self.position() == CursorPosition::BeforeFirst {
            self.move_next()
        } else {
            Err(capability_error(&*self, "move_first"))
        }
    }

    fn move_last(&mut self) -> Result<bool> {
        Err(capability_error(&*self, "move_last"))
    }

    /// Moves to the absolute row `i`.
    fn move_to(&mut self, i: usize) -> Result<bool> {
        let _ = i;
        Err(capability_error(&*self, "move_to"))
    }

    /// The backend-native value of column `i` in the current row.
    ///
    /// Only called by the provided getters after the position and the
    /// column index have been checked. Must not move the backend cursor.
    fn raw_value(&self, i: usize) -> Result<RawValue>;

    /// Separator used by the backend in numeric text.
    fn decimal_separator(&self) -> char {
        '.'
    }

    /// Bounding box of a spatial column, when the backend knows it cheaply.
    fn get_extent(&self, i: usize) -> Result<Option<Envelope>> {
        check_column(self, i, "get_extent")?;
        Ok(None)
    }

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn column(&self, i: usize) -> Result<&ColumnDescriptor> {
        self.columns()
            .get(i)
            .ok_or(CursorError::InvalidColumnIndex {
                index: i,
                method_name: "column",
            })
    }

    fn column_name(&self, i: usize) -> Result<&str> {
        self.column(i).map(ColumnDescriptor::name)
    }

    fn column_kind(&self, i: usize) -> Result<ValueKind> {
        self.column(i).map(ColumnDescriptor::kind)
    }

    fn column_origin(&self, i: usize) -> Result<Option<&str>> {
        self.column(i).map(ColumnDescriptor::origin)
    }

    /// Storage encoding of a text column; `None` for other columns.
    fn column_encoding(&self, i: usize) -> Result<Option<CharEncoding>> {
        self.column(i).map(ColumnDescriptor::encoding)
    }

    /// Resolves a column name to its position (first match wins).
    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns()
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| CursorError::InvalidColumnName {
                column_name: name.to_string(),
                method_name: "column_index",
            })
    }

    fn is_empty(&self) -> bool {
        self.size() == Some(0)
    }

    fn is_before_begin(&self) -> bool {
        self.position() == CursorPosition::BeforeFirst
    }

    fn is_at_begin(&self) -> bool {
        self.position() == CursorPosition::Row(0)
    }

    /// On the last row. Always false when the size is unknown.
    fn is_at_end(&self) -> bool {
        match (self.position(), self.size()) {
            (CursorPosition::Row(i), Some(n)) => i + 1 == n,
            _ => false,
        }
    }

    fn is_after_end(&self) -> bool {
        self.position() == CursorPosition::AfterLast
    }

    fn is_position_valid(&self) -> bool {
        self.position().row().is_some()
    }

    fn is_null(&self, i: usize) -> Result<bool> {
        fetch(self, i, "is_null").map(|raw| decode::is_null(&raw))
    }

    fn get_char(&self, i: usize) -> Result<i8> {
        decoded(self, i, "get_char", decode::decode_char)
    }

    fn get_uchar(&self, i: usize) -> Result<u8> {
        decoded(self, i, "get_uchar", decode::decode_uchar)
    }

    fn get_int16(&self, i: usize) -> Result<i16> {
        decoded(self, i, "get_int16", decode::decode_int16)
    }

    fn get_int32(&self, i: usize) -> Result<i32> {
        decoded(self, i, "get_int32", decode::decode_int32)
    }

    fn get_int64(&self, i: usize) -> Result<i64> {
        decoded(self, i, "get_int64", decode::decode_int64)
    }

    fn get_bool(&self, i: usize) -> Result<bool> {
        decoded(self, i, "get_bool", decode::decode_bool)
    }

    fn get_float(&self, i: usize) -> Result<f32> {
        decoded(self, i, "get_float", decode::decode_float)
    }

    fn get_double(&self, i: usize) -> Result<f64> {
        decoded(self, i, "get_double", decode::decode_double)
    }

    /// Exact decimal text, always with `.` as the separator.
    fn get_numeric(&self, i: usize) -> Result<String> {
        let separator = self.decimal_separator();
        decoded(self, i, "get_numeric", |raw| {
            decode::decode_numeric(raw, separator)
        })
    }

    fn get_string(&self, i: usize) -> Result<String> {
        decoded(self, i, "get_string", decode::decode_string)
    }

    fn get_byte_array(&self, i: usize) -> Result<Vec<u8>> {
        decoded(self, i, "get_byte_array", |raw| match raw {
            RawValue::Bytes(bytes) => decode::decode_byte_array(raw, bytes.len()),
            _ => Err(DecodeError::mismatch(ValueKind::ByteArray, raw.type_name())),
        })
    }

    /// A freshly decoded geometry, owned by the caller.
    fn get_geometry(&self, i: usize) -> Result<Geometry> {
        decoded(self, i, "get_geometry", decode::decode_geometry)
    }

    fn get_raster(&self, i: usize) -> Result<RasterRef> {
        decoded(self, i, "get_raster", decode::decode_raster)
    }

    /// Date/time in the subtype the column declares (timestamp for columns
    /// that are not date/time columns).
    fn get_datetime(&self, i: usize) -> Result<DateTimeValue> {
        let kind = match self.column_kind(i)? {
            ValueKind::DateTime(kind) => kind,
            _ => DateTimeKind::Timestamp,
        };
        decoded(self, i, "get_datetime", |raw| decode::decode_datetime(raw, kind))
    }

    fn get_array(&self, i: usize) -> Result<Array> {
        decoded(self, i, "get_array", |raw| {
            decode::decode_array(raw, ValueKind::Unknown)
        })
    }

    /// The cell decoded as the column's declared kind; `None` for null.
    fn get_value(&self, i: usize) -> Result<Option<Value>> {
        let kind = self.column_kind(i)?;
        if kind == ValueKind::Numeric {
            let separator = self.decimal_separator();
            return decoded(self, i, "get_value", |raw| {
                if decode::is_null(raw) {
                    Ok(None)
                } else {
                    decode::decode_numeric(raw, separator).map(|n| Some(Value::Numeric(n)))
                }
            });
        }
        decoded(self, i, "get_value", |raw| decode::decode_value(raw, kind))
    }

    /// Text rendering of any cell; `precision` applies to floating point
    /// columns. Null cells render as an empty string.
    fn get_as_string(&self, i: usize, precision: usize) -> Result<String> {
        Ok(self
            .get_value(i)?
            .map(|v| v.to_string_with_precision(precision))
            .unwrap_or_default())
    }

    fn is_null_by_name(&self, name: &str) -> Result<bool> {
        self.is_null(self.column_index(name)?)
    }

    fn get_char_by_name(&self, name: &str) -> Result<i8> {
        self.get_char(self.column_index(name)?)
    }

    fn get_uchar_by_name(&self, name: &str) -> Result<u8> {
        self.get_uchar(self.column_index(name)?)
    }

    fn get_int16_by_name(&self, name: &str) -> Result<i16> {
        self.get_int16(self.column_index(name)?)
    }

    fn get_int32_by_name(&self, name: &str) -> Result<i32> {
        self.get_int32(self.column_index(name)?)
    }

    fn get_int64_by_name(&self, name: &str) -> Result<i64> {
        self.get_int64(self.column_index(name)?)
    }

    fn get_bool_by_name(&self, name: &str) -> Result<bool> {
        self.get_bool(self.column_index(name)?)
    }

    fn get_float_by_name(&self, name: &str) -> Result<f32> {
        self.get_float(self.column_index(name)?)
    }

    fn get_double_by_name(&self, name: &str) -> Result<f64> {
        self.get_double(self.column_index(name)?)
    }

    fn get_numeric_by_name(&self, name: &str) -> Result<String> {
        self.get_numeric(self.column_index(name)?)
    }

    fn get_string_by_name(&self, name: &str) -> Result<String> {
        self.get_string(self.column_index(name)?)
    }

    fn get_byte_array_by_name(&self, name: &str) -> Result<Vec<u8>> {
        self.get_byte_array(self.column_index(name)?)
    }

    fn get_geometry_by_name(&self, name: &str) -> Result<Geometry> {
        self.get_geometry(self.column_index(name)?)
    }

    fn get_raster_by_name(&self, name: &str) -> Result<RasterRef> {
        self.get_raster(self.column_index(name)?)
    }

    fn get_datetime_by_name(&self, name: &str) -> Result<DateTimeValue> {
        self.get_datetime(self.column_index(name)?)
    }

    fn get_array_by_name(&self, name: &str) -> Result<Array> {
        self.get_array(self.column_index(name)?)
    }

    fn get_value_by_name(&self, name: &str) -> Result<Option<Value>> {
        self.get_value(self.column_index(name)?)
    }
}

/// The error returned when a motion is beyond the cursor's traverse type.
pub fn capability_error<C: RowCursor + ?Sized>(cursor: &C, method_name: &'static str) -> CursorError {
    let traverse = cursor.traverse_type();
    tracing::debug!(method_name, ?traverse, "rejected cursor motion");
    CursorError::Capability {
        method_name,
        traverse,
    }
}

/// Fails unless the cursor is on a valid row.
pub fn check_row<C: RowCursor + ?Sized>(cursor: &C, method_name: &'static str) -> Result<usize> {
    let position = cursor.position();
    position.row().ok_or_else(|| {
        tracing::debug!(method_name, %position, "row access outside of a row");
        CursorError::CursorState {
            method_name,
            position,
        }
    })
}

/// Fails when the cursor cannot be written through.
pub fn check_writable<C: RowCursor + ?Sized>(cursor: &C, method_name: &'static str) -> Result<()> {
    if cursor.access_policy().can_write() {
        Ok(())
    } else {
        tracing::debug!(method_name, "write on a read-only cursor");
        Err(CursorError::ReadOnly { method_name })
    }
}

pub fn check_column<'a, C: RowCursor + ?Sized>(
    cursor: &'a C,
    i: usize,
    method_name: &'static str,
) -> Result<&'a ColumnDescriptor> {
    cursor
        .columns()
        .get(i)
        .ok_or(CursorError::InvalidColumnIndex {
            index: i,
            method_name,
        })
}

fn fetch<C: RowCursor + ?Sized>(cursor: &C, i: usize, method_name: &'static str) -> Result<RawValue> {
    check_row(cursor, method_name)?;
    check_column(cursor, i, method_name)?;
    cursor.raw_value(i)
}

fn decoded<C, T, F>(cursor: &C, i: usize, method_name: &'static str, decode: F) -> Result<T>
where
    C: RowCursor + ?Sized,
    F: FnOnce(&RawValue) -> std::result::Result<T, DecodeError>,
{
    let raw = fetch(cursor, i, method_name)?;
    decode(&raw).map_err(|source| {
        let name = cursor.column_name(i).unwrap_or_default();
        CursorError::access(i, name, source)
    })
}
