//! Typed value kinds exposed by every cursor.

use std::fmt::{Display, Formatter};

mod array;
mod datetime;
mod raster;
mod value;

pub use array::Array;
pub use datetime::DateTimeValue;
pub use raster::RasterRef;
pub use value::Value;

/// Subtype of a date/time column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    Date,
    Time,
    Timestamp,
    /// Time of day with a UTC offset.
    TimeTz,
    /// Timestamp with a UTC offset.
    TimestampTz,
}

/// The declared type tag of a column.
///
/// Every kind maps to exactly one typed getter on [`crate::RowCursor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Char,
    UChar,
    Int16,
    Int32,
    Int64,
    Bool,
    Float,
    Double,
    /// Exact decimal, carried as text.
    Numeric,
    String,
    ByteArray,
    Geometry,
    Raster,
    DateTime(DateTimeKind),
    Array,
    /// A backend column the crate could not map.
    Unknown,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Char => "Char",
            ValueKind::UChar => "UChar",
            ValueKind::Int16 => "Int16",
            ValueKind::Int32 => "Int32",
            ValueKind::Int64 => "Int64",
            ValueKind::Bool => "Bool",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::Numeric => "Numeric",
            ValueKind::String => "String",
            ValueKind::ByteArray => "ByteArray",
            ValueKind::Geometry => "Geometry",
            ValueKind::Raster => "Raster",
            ValueKind::DateTime(DateTimeKind::Date) => "Date",
            ValueKind::DateTime(DateTimeKind::Time) => "Time",
            ValueKind::DateTime(DateTimeKind::Timestamp) => "Timestamp",
            ValueKind::DateTime(DateTimeKind::TimeTz) => "TimeTz",
            ValueKind::DateTime(DateTimeKind::TimestampTz) => "TimestampTz",
            ValueKind::Array => "Array",
            ValueKind::Unknown => "Unknown",
        }
    }

    /// Returns `true` for the kinds whose getters go through integer coercion.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueKind::Char
                | ValueKind::UChar
                | ValueKind::Int16
                | ValueKind::Int32
                | ValueKind::Int64
        )
    }

    /// Returns `true` for floating point and exact decimal kinds.
    pub fn is_floating(&self) -> bool {
        matches!(
            self,
            ValueKind::Float | ValueKind::Double | ValueKind::Numeric
        )
    }

    /// Returns `true` if a column of this kind can have an extent.
    pub fn is_spatial(&self) -> bool {
        matches!(self, ValueKind::Geometry | ValueKind::Raster)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
