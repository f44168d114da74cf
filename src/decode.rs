//! Interpretation of backend-native cell values as typed [`Value`]s.
//!
//! Every adapter fetches a [`RawValue`] for the current row and hands it to
//! one of the `decode_*` functions below. The functions only borrow the raw
//! value and always return owned data, so a decoded value stays valid after
//! the cursor moves.

use crate::encoding::CharEncoding;
use crate::errors::{CursorError, DecodeError, Result};
use crate::geometry::{wkb, Geometry};
use crate::types::{Array, DateTimeKind, DateTimeValue, RasterRef, Value, ValueKind};

/// A backend-native dynamic value, as handed over by a recordset field or a
/// legacy engine portal.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Decimal text as the backend renders it.
    Decimal(String),
    Text(String),
    /// Text still in the backend's storage encoding.
    EncodedText(Vec<u8>, CharEncoding),
    Bytes(Vec<u8>),
    /// COM automation date: days since 1899-12-30, fraction is the time of day.
    OleDate(f64),
    DateTime(DateTimeValue),
    Raster(RasterRef),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Short name used in [`DecodeError::TypeMismatch`].
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "int",
            RawValue::UInt(_) => "uint",
            RawValue::Float(_) => "float",
            RawValue::Decimal(_) => "decimal",
            RawValue::Text(_) => "text",
            RawValue::EncodedText(..) => "encoded text",
            RawValue::Bytes(_) => "bytes",
            RawValue::OleDate(_) => "ole date",
            RawValue::DateTime(_) => "datetime",
            RawValue::Raster(_) => "raster",
            RawValue::List(_) => "list",
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Char(v) => RawValue::Int(v as i64),
            Value::UChar(v) => RawValue::UInt(v as u64),
            Value::Int16(v) => RawValue::Int(v as i64),
            Value::Int32(v) => RawValue::Int(v as i64),
            Value::Int64(v) => RawValue::Int(v),
            Value::Bool(v) => RawValue::Bool(v),
            Value::Float(v) => RawValue::Float(v as f64),
            Value::Double(v) => RawValue::Float(v),
            Value::Numeric(v) => RawValue::Decimal(v),
            Value::String(v) => RawValue::Text(v),
            Value::ByteArray(v) => RawValue::Bytes(v),
            Value::Geometry(g) => RawValue::Bytes(g.to_wkb_with_srid()),
            Value::Raster(r) => RawValue::Raster(r),
            Value::DateTime(d) => RawValue::DateTime(d),
            Value::Array(a) => RawValue::List(
                a.values()
                    .iter()
                    .map(|v| v.clone().map(RawValue::from).unwrap_or(RawValue::Null))
                    .collect(),
            ),
        }
    }
}

pub fn is_null(raw: &RawValue) -> bool {
    matches!(raw, RawValue::Null)
}

fn text_of(raw: &RawValue) -> Option<std::result::Result<String, DecodeError>> {
    match raw {
        RawValue::Text(s) | RawValue::Decimal(s) => Some(Ok(s.clone())),
        RawValue::EncodedText(bytes, encoding) => Some(encoding.decode(bytes)),
        _ => None,
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Widest integer coercion; the narrower decoders truncate its result.
pub fn decode_int64(raw: &RawValue) -> std::result::Result<i64, DecodeError> {
    let expected = ValueKind::Int64;
    match raw {
        RawValue::Int(v) => Ok(*v),
        RawValue::UInt(v) => Ok(*v as i64),
        RawValue::Float(v) => Ok(*v as i64),
        RawValue::Bool(v) => Ok(*v as i64),
        RawValue::OleDate(v) => Ok(*v as i64),
        _ => match text_of(raw) {
            Some(text) => {
                parse_integer(&text?).ok_or_else(|| DecodeError::mismatch(expected, raw.type_name()))
            }
            None => Err(DecodeError::mismatch(expected, raw.type_name())),
        },
    }
}

pub fn decode_int32(raw: &RawValue) -> std::result::Result<i32, DecodeError> {
    decode_int64(raw)
        .map(|v| v as i32)
        .map_err(|e| retag(e, ValueKind::Int32))
}

pub fn decode_int16(raw: &RawValue) -> std::result::Result<i16, DecodeError> {
    decode_int64(raw)
        .map(|v| v as i16)
        .map_err(|e| retag(e, ValueKind::Int16))
}

pub fn decode_char(raw: &RawValue) -> std::result::Result<i8, DecodeError> {
    decode_int64(raw)
        .map(|v| v as i8)
        .map_err(|e| retag(e, ValueKind::Char))
}

pub fn decode_uchar(raw: &RawValue) -> std::result::Result<u8, DecodeError> {
    decode_int64(raw)
        .map(|v| v as u8)
        .map_err(|e| retag(e, ValueKind::UChar))
}

fn retag(err: DecodeError, expected: ValueKind) -> DecodeError {
    match err {
        DecodeError::TypeMismatch { found, .. } => DecodeError::TypeMismatch { expected, found },
        other => other,
    }
}

/// Numeric values are true when nonzero; text accepts the usual spellings.
pub fn decode_bool(raw: &RawValue) -> std::result::Result<bool, DecodeError> {
    let mismatch = || DecodeError::mismatch(ValueKind::Bool, raw.type_name());
    match raw {
        RawValue::Bool(v) => Ok(*v),
        RawValue::Int(v) => Ok(*v != 0),
        RawValue::UInt(v) => Ok(*v != 0),
        RawValue::Float(v) => Ok(*v != 0.0),
        _ => {
            let text = text_of(raw).ok_or_else(mismatch)??;
            match text.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" => Ok(true),
                "0" | "f" | "false" | "n" | "no" => Ok(false),
                _ => Err(mismatch()),
            }
        }
    }
}

pub fn decode_double(raw: &RawValue) -> std::result::Result<f64, DecodeError> {
    let mismatch = || DecodeError::mismatch(ValueKind::Double, raw.type_name());
    match raw {
        RawValue::Float(v) => Ok(*v),
        RawValue::Int(v) => Ok(*v as f64),
        RawValue::UInt(v) => Ok(*v as f64),
        RawValue::OleDate(v) => Ok(*v),
        _ => {
            let text = text_of(raw).ok_or_else(mismatch)??;
            text.trim().parse::<f64>().map_err(|_| mismatch())
        }
    }
}

pub fn decode_float(raw: &RawValue) -> std::result::Result<f32, DecodeError> {
    decode_double(raw)
        .map(|v| v as f32)
        .map_err(|e| retag(e, ValueKind::Float))
}

/// Exact decimal text with `.` as the separator.
///
/// `decimal_separator` is the backend-local separator found in text values.
pub fn decode_numeric(
    raw: &RawValue,
    decimal_separator: char,
) -> std::result::Result<String, DecodeError> {
    let mismatch = || DecodeError::mismatch(ValueKind::Numeric, raw.type_name());
    match raw {
        RawValue::Int(v) => Ok(v.to_string()),
        RawValue::UInt(v) => Ok(v.to_string()),
        RawValue::Float(v) if v.is_finite() => Ok(v.to_string()),
        _ => {
            let text = text_of(raw).ok_or_else(mismatch)??;
            let mut text = text.trim().to_string();
            if decimal_separator != '.' {
                text = text.replace(decimal_separator, ".");
            }
            if is_decimal_literal(&text) {
                Ok(text)
            } else {
                Err(mismatch())
            }
        }
    }
}

fn is_decimal_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Text in the canonical UTF-8 representation.
pub fn decode_string(raw: &RawValue) -> std::result::Result<String, DecodeError> {
    match raw {
        RawValue::Text(s) | RawValue::Decimal(s) => Ok(s.clone()),
        RawValue::EncodedText(bytes, encoding) => encoding.decode(bytes),
        RawValue::Bool(v) => Ok(v.to_string()),
        RawValue::Int(v) => Ok(v.to_string()),
        RawValue::UInt(v) => Ok(v.to_string()),
        RawValue::Float(v) => Ok(v.to_string()),
        RawValue::DateTime(v) => Ok(v.to_string()),
        RawValue::Raster(r) => Ok(r.to_string()),
        _ => Err(DecodeError::mismatch(ValueKind::String, raw.type_name())),
    }
}

/// Copies exactly `declared_size` bytes out of a flat backend buffer.
pub fn decode_byte_array(
    raw: &RawValue,
    declared_size: usize,
) -> std::result::Result<Vec<u8>, DecodeError> {
    match raw {
        RawValue::Bytes(bytes) if bytes.len() >= declared_size => {
            Ok(bytes[..declared_size].to_vec())
        }
        RawValue::Bytes(bytes) => Err(DecodeError::TruncatedData {
            declared: declared_size,
            available: bytes.len(),
        }),
        _ => Err(DecodeError::mismatch(ValueKind::ByteArray, raw.type_name())),
    }
}

pub fn decode_datetime(
    raw: &RawValue,
    kind: DateTimeKind,
) -> std::result::Result<DateTimeValue, DecodeError> {
    let mismatch = || DecodeError::mismatch(ValueKind::DateTime(kind), raw.type_name());
    match raw {
        RawValue::DateTime(v) => v.convert(kind).ok_or_else(mismatch),
        RawValue::OleDate(days) => DateTimeValue::from_ole_date(*days)
            .and_then(|ts| DateTimeValue::Timestamp(ts).convert(kind))
            .ok_or_else(mismatch),
        _ => {
            let text = text_of(raw).ok_or_else(mismatch)??;
            DateTimeValue::parse(&text, kind).ok_or_else(mismatch)
        }
    }
}

/// Binary WKB (optionally followed by an SRID) or its hex rendering.
pub fn decode_geometry(raw: &RawValue) -> std::result::Result<Geometry, DecodeError> {
    match raw {
        RawValue::Bytes(bytes) => wkb::read(bytes),
        RawValue::Text(hex) => wkb::read_hex(hex),
        _ => Err(DecodeError::mismatch(ValueKind::Geometry, raw.type_name())),
    }
}

pub fn decode_raster(raw: &RawValue) -> std::result::Result<RasterRef, DecodeError> {
    match raw {
        RawValue::Raster(r) => Ok(r.clone()),
        RawValue::Text(uri) => Ok(RasterRef::new(uri.clone())),
        _ => Err(DecodeError::mismatch(ValueKind::Raster, raw.type_name())),
    }
}

/// A one-dimensional array whose elements are decoded as `element_kind`.
pub fn decode_array(
    raw: &RawValue,
    element_kind: ValueKind,
) -> std::result::Result<Array, DecodeError> {
    match raw {
        RawValue::List(items) => {
            let data = items
                .iter()
                .map(|item| decode_value(item, element_kind))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Array::from_values(element_kind, data))
        }
        _ => Err(DecodeError::mismatch(ValueKind::Array, raw.type_name())),
    }
}

/// Decodes `raw` as `kind`; `Ok(None)` for null cells.
///
/// Columns of [`ValueKind::Unknown`] keep whatever shape the backend gave.
pub fn decode_value(
    raw: &RawValue,
    kind: ValueKind,
) -> std::result::Result<Option<Value>, DecodeError> {
    if is_null(raw) {
        return Ok(None);
    }
    let value = match kind {
        ValueKind::Char => Value::Char(decode_char(raw)?),
        ValueKind::UChar => Value::UChar(decode_uchar(raw)?),
        ValueKind::Int16 => Value::Int16(decode_int16(raw)?),
        ValueKind::Int32 => Value::Int32(decode_int32(raw)?),
        ValueKind::Int64 => Value::Int64(decode_int64(raw)?),
        ValueKind::Bool => Value::Bool(decode_bool(raw)?),
        ValueKind::Float => Value::Float(decode_float(raw)?),
        ValueKind::Double => Value::Double(decode_double(raw)?),
        ValueKind::Numeric => Value::Numeric(decode_numeric(raw, '.')?),
        ValueKind::String => Value::String(decode_string(raw)?),
        ValueKind::ByteArray => match raw {
            RawValue::Bytes(bytes) => Value::ByteArray(bytes.clone()),
            _ => return Err(DecodeError::mismatch(kind, raw.type_name())),
        },
        ValueKind::Geometry => Value::Geometry(decode_geometry(raw)?),
        ValueKind::Raster => Value::Raster(decode_raster(raw)?),
        ValueKind::DateTime(sub) => Value::DateTime(decode_datetime(raw, sub)?),
        ValueKind::Array => match raw {
            RawValue::List(_) => Value::Array(decode_array(raw, ValueKind::Unknown)?),
            _ => return Err(DecodeError::mismatch(kind, raw.type_name())),
        },
        ValueKind::Unknown => return Ok(natural_value(raw)),
    };
    Ok(Some(value))
}

fn natural_value(raw: &RawValue) -> Option<Value> {
    let value = match raw {
        RawValue::Null => return None,
        RawValue::Bool(v) => Value::Bool(*v),
        RawValue::Int(v) => Value::Int64(*v),
        RawValue::UInt(v) => Value::Int64(*v as i64),
        RawValue::Float(v) => Value::Double(*v),
        RawValue::Decimal(v) => Value::Numeric(v.clone()),
        RawValue::Text(v) => Value::String(v.clone()),
        RawValue::EncodedText(bytes, encoding) => match encoding.decode(bytes) {
            Ok(text) => Value::String(text),
            Err(_) => Value::ByteArray(bytes.clone()),
        },
        RawValue::Bytes(v) => Value::ByteArray(v.clone()),
        RawValue::OleDate(days) => match DateTimeValue::from_ole_date(*days) {
            Some(ts) => Value::DateTime(DateTimeValue::Timestamp(ts)),
            None => Value::Double(*days),
        },
        RawValue::DateTime(v) => Value::DateTime(*v),
        RawValue::Raster(r) => Value::Raster(r.clone()),
        RawValue::List(items) => Value::Array(Array::from_values(
            ValueKind::Unknown,
            items.iter().map(natural_value).collect(),
        )),
    };
    Some(value)
}

/// A backend BLOB that is read piecewise rather than as one flat buffer.
pub trait ChunkSource {
    /// Returns up to `max_len` further bytes; an empty chunk means the
    /// backend has nothing more to give.
    fn get_chunk(&mut self, max_len: usize) -> Result<Vec<u8>>;
}

/// Largest chunk requested from a [`ChunkSource`] in one call.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Collects exactly `declared_size` bytes from `source`.
///
/// Fails with [`DecodeError::TruncatedData`], tagged with `column` and
/// `name`, when the source runs dry early.
pub fn read_chunked<S: ChunkSource + ?Sized>(
    source: &mut S,
    declared_size: usize,
    column: usize,
    name: &str,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(declared_size);
    let mut chunks = 0usize;
    while buf.len() < declared_size {
        let wanted = (declared_size - buf.len()).min(MAX_CHUNK_SIZE);
        let chunk = source.get_chunk(wanted)?;
        chunks += 1;
        tracing::trace!(column, requested = wanted, received = chunk.len(), "blob chunk");
        if chunk.is_empty() {
            return Err(CursorError::access(
                column,
                name,
                DecodeError::TruncatedData {
                    declared: declared_size,
                    available: buf.len(),
                },
            ));
        }
        let take = chunk.len().min(declared_size - buf.len());
        buf.extend_from_slice(&chunk[..take]);
    }
    tracing::trace!(column, size = declared_size, chunks, "blob read");
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    struct Chunks {
        data: Vec<u8>,
        chunk_size: usize,
        calls: usize,
    }

    impl ChunkSource for Chunks {
        fn get_chunk(&mut self, max_len: usize) -> Result<Vec<u8>> {
            self.calls += 1;
            let n = max_len.min(self.chunk_size).min(self.data.len());
            Ok(self.data.drain(..n).collect())
        }
    }

    #[test]
    fn test_read_chunked() {
        let mut source = Chunks {
            data: (0u8..10).collect(),
            chunk_size: 4,
            calls: 0,
        };
        let bytes = read_chunked(&mut source, 10, 0, "blob").unwrap();
        assert_eq!(bytes, (0u8..10).collect::<Vec<_>>());
        assert_eq!(source.calls, 3);
    }

    #[test]
    fn test_read_chunked_truncated() {
        let mut source = Chunks {
            data: vec![1; 6],
            chunk_size: 4,
            calls: 0,
        };
        let err = read_chunked(&mut source, 10, 2, "blob").unwrap_err();
        assert_eq!(
            err.decode_error(),
            Some(&DecodeError::TruncatedData {
                declared: 10,
                available: 6
            })
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(decode_int32(&RawValue::Int(42)).unwrap(), 42);
        assert_eq!(decode_int32(&RawValue::Float(3.9)).unwrap(), 3);
        assert_eq!(decode_int16(&RawValue::Int(70_000)).unwrap(), 70_000i64 as i16);
        assert_eq!(decode_int64(&RawValue::Text(" 17 ".into())).unwrap(), 17);
        assert_eq!(decode_int64(&RawValue::Decimal("2.5".into())).unwrap(), 2);
        assert_eq!(decode_uchar(&RawValue::UInt(255)).unwrap(), 255);
        assert_eq!(
            decode_int32(&RawValue::Text("abc".into())),
            Err(DecodeError::TypeMismatch {
                expected: ValueKind::Int32,
                found: "text"
            })
        );
        assert!(decode_int64(&RawValue::Null).is_err());
    }

    #[test]
    fn test_bool() {
        assert!(decode_bool(&RawValue::Int(-1)).unwrap());
        assert!(!decode_bool(&RawValue::Float(0.0)).unwrap());
        assert!(decode_bool(&RawValue::Text("TRUE".into())).unwrap());
        assert!(decode_bool(&RawValue::Text("maybe".into())).is_err());
    }

    #[test]
    fn test_floating() {
        crate::assert_almost_eq(decode_double(&RawValue::Text(" 2.75 ".into())).unwrap(), 2.75);
        crate::assert_almost_eq(decode_double(&RawValue::Int(-3)).unwrap(), -3.0);
        crate::assert_almost_eq(decode_float(&RawValue::Float(0.5)).unwrap() as f64, 0.5);
        assert_eq!(
            decode_double(&RawValue::Bytes(vec![1])),
            Err(DecodeError::TypeMismatch {
                expected: ValueKind::Double,
                found: "bytes"
            })
        );
    }

    #[test]
    fn test_numeric() {
        assert_eq!(
            decode_numeric(&RawValue::Decimal("12345678901234567890.0001".into()), '.').unwrap(),
            "12345678901234567890.0001"
        );
        assert_eq!(
            decode_numeric(&RawValue::Text("-3,14".into()), ',').unwrap(),
            "-3.14"
        );
        assert_eq!(decode_numeric(&RawValue::Int(7), '.').unwrap(), "7");
        assert!(decode_numeric(&RawValue::Text("1e".into()), '.').is_err());
    }

    #[test]
    fn test_string() {
        let latin1 = RawValue::EncodedText(vec![b'S', 0xE3, b'o'], CharEncoding::Latin1);
        assert_eq!(decode_string(&latin1).unwrap(), "São");
        assert_eq!(decode_string(&RawValue::Int(5)).unwrap(), "5");
        assert!(decode_string(&RawValue::Bytes(vec![1])).is_err());
    }

    #[test]
    fn test_byte_array() {
        let raw = RawValue::Bytes(vec![1, 2, 3, 4]);
        assert_eq!(decode_byte_array(&raw, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            decode_byte_array(&raw, 8),
            Err(DecodeError::TruncatedData {
                declared: 8,
                available: 4
            })
        );
    }

    #[test]
    fn test_datetime() {
        let ts = decode_datetime(&RawValue::OleDate(2.5), DateTimeKind::Timestamp).unwrap();
        let expected = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(ts, DateTimeValue::Timestamp(expected));

        let date = decode_datetime(&RawValue::OleDate(2.5), DateTimeKind::Date).unwrap();
        assert_eq!(date, DateTimeValue::Date(expected.date()));

        let time = decode_datetime(&RawValue::Text("10:30:00".into()), DateTimeKind::Time).unwrap();
        match time {
            DateTimeValue::Time(t) => assert_eq!(t.hour(), 10),
            other => panic!("unexpected {other:?}"),
        }
        assert!(decode_datetime(&RawValue::Text("noon".into()), DateTimeKind::Date).is_err());
    }

    #[test]
    fn test_geometry() {
        let point = Geometry::point(10.0, 20.0).with_srid(4326);
        let decoded = decode_geometry(&RawValue::Bytes(point.to_wkb_with_srid())).unwrap();
        assert_eq!(decoded, point);
        let hex = decode_geometry(&RawValue::Text(point.to_hex())).unwrap();
        assert_eq!(hex.srid(), None);
        assert!(matches!(
            decode_geometry(&RawValue::Bytes(vec![1, 1])),
            Err(DecodeError::MalformedGeometry(_))
        ));
    }

    #[test]
    fn test_array_and_value() {
        let raw = RawValue::List(vec![RawValue::Int(1), RawValue::Null, RawValue::Text("3".into())]);
        let array = decode_array(&raw, ValueKind::Int32).unwrap();
        assert_eq!(
            array.values(),
            &[Some(Value::Int32(1)), None, Some(Value::Int32(3))]
        );

        assert_eq!(decode_value(&RawValue::Null, ValueKind::Int32).unwrap(), None);
        assert_eq!(
            decode_value(&RawValue::Int(9), ValueKind::Double).unwrap(),
            Some(Value::Double(9.0))
        );
        assert_eq!(
            decode_value(&RawValue::UInt(9), ValueKind::Unknown).unwrap(),
            Some(Value::Int64(9))
        );
    }

    #[test]
    fn test_value_to_raw_round_trip() {
        for value in [
            Value::Int32(-4),
            Value::String("x".into()),
            Value::Numeric("1.50".into()),
            Value::Geometry(Geometry::point(1.0, 2.0).with_srid(31983)),
        ] {
            let kind = value.kind();
            let raw = RawValue::from(value.clone());
            assert_eq!(decode_value(&raw, kind).unwrap(), Some(value));
        }
    }
}
