use crate::geometry::Geometry;
use crate::types::{Array, DateTimeValue, RasterRef, ValueKind};

/// An owned, decoded cell value.
///
/// Returned by [`crate::RowCursor::get_value`] and stored by the in-memory
/// adapter. Null cells are represented as `Option::None` around this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Char(i8),
    UChar(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Numeric(String),
    String(String),
    ByteArray(Vec<u8>),
    Geometry(Geometry),
    Raster(RasterRef),
    DateTime(DateTimeValue),
    Array(Array),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Char(_) => ValueKind::Char,
            Value::UChar(_) => ValueKind::UChar,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Bool(_) => ValueKind::Bool,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Numeric(_) => ValueKind::Numeric,
            Value::String(_) => ValueKind::String,
            Value::ByteArray(_) => ValueKind::ByteArray,
            Value::Geometry(_) => ValueKind::Geometry,
            Value::Raster(_) => ValueKind::Raster,
            Value::DateTime(v) => ValueKind::DateTime(v.kind()),
            Value::Array(_) => ValueKind::Array,
        }
    }

    /// Interpret the value as `String`.
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::String(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as `i64`, widening any integer kind.
    pub fn into_int64(self) -> Option<i64> {
        match self {
            Value::Char(rv) => Some(rv as i64),
            Value::UChar(rv) => Some(rv as i64),
            Value::Int16(rv) => Some(rv as i64),
            Value::Int32(rv) => Some(rv as i64),
            Value::Int64(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as `f64`, widening `Float`.
    pub fn into_double(self) -> Option<f64> {
        match self {
            Value::Float(rv) => Some(rv as f64),
            Value::Double(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Value::Bool(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::ByteArray(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_geometry(self) -> Option<Geometry> {
        match self {
            Value::Geometry(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_datetime(self) -> Option<DateTimeValue> {
        match self {
            Value::DateTime(rv) => Some(rv),
            _ => None,
        }
    }

    /// Text form of the value. Floating point kinds are printed with
    /// `precision` fractional digits, or the shortest exact form when
    /// `precision` is zero.
    pub fn to_string_with_precision(&self, precision: usize) -> String {
        match self {
            Value::Char(v) => v.to_string(),
            Value::UChar(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Float(v) if precision > 0 => format!("{v:.precision$}"),
            Value::Float(v) => v.to_string(),
            Value::Double(v) if precision > 0 => format!("{v:.precision$}"),
            Value::Double(v) => v.to_string(),
            Value::Numeric(v) | Value::String(v) => v.clone(),
            Value::ByteArray(v) => crate::utils::to_hex(v),
            Value::Geometry(g) => g.to_hex(),
            Value::Raster(r) => r.to_string(),
            Value::DateTime(d) => d.to_string(),
            Value::Array(a) => {
                let items: Vec<String> = a
                    .values()
                    .iter()
                    .map(|v| match v {
                        Some(v) => v.to_string_with_precision(precision),
                        None => "NULL".to_string(),
                    })
                    .collect();
                format!("{{{}}}", items.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_accessors() {
        assert_eq!(Value::Int16(-4).into_int64(), Some(-4));
        assert_eq!(Value::Float(0.5).into_double(), Some(0.5));
        assert_eq!(Value::Double(0.5).into_int64(), None);
        assert_eq!(
            Value::String("a".to_string()).into_string(),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_to_string_with_precision() {
        assert_eq!(Value::Double(1.0 / 3.0).to_string_with_precision(3), "0.333");
        assert_eq!(Value::Double(2.5).to_string_with_precision(0), "2.5");
        assert_eq!(Value::ByteArray(vec![0xAB, 0x01]).to_string_with_precision(0), "AB01");
        let array = Array::from_values(ValueKind::Int32, vec![Some(Value::Int32(1)), None]);
        assert_eq!(Value::Array(array).to_string_with_precision(0), "{1,NULL}");
    }
}
