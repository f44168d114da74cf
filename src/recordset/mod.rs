//! Cursors over live COM-style recordsets.
//!
//! The recordset itself is a backend handle implementing [`Recordset`];
//! [`RecordsetDataSet`] layers the cursor contract on top of it.

mod dataset;

pub use dataset::RecordsetDataSet;

use crate::decode::{ChunkSource, RawValue};
use crate::errors::Result;
use crate::types::{DateTimeKind, ValueKind};

/// Native field types of a recordset, numbered like ADO's `DataTypeEnum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordsetFieldType {
    Empty,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    UnsignedTinyInt,
    UnsignedSmallInt,
    UnsignedInt,
    UnsignedBigInt,
    Single,
    Double,
    Currency,
    Decimal,
    Numeric,
    VarNumeric,
    Boolean,
    Char,
    VarChar,
    LongVarChar,
    WChar,
    VarWChar,
    LongVarWChar,
    Bstr,
    Binary,
    VarBinary,
    LongVarBinary,
    Date,
    DbDate,
    DbTime,
    DbTimeStamp,
    FileTime,
    Guid,
    /// Any other provider type code.
    Other(i32),
}

impl RecordsetFieldType {
    pub fn from_code(code: i32) -> Self {
        use RecordsetFieldType::*;
        match code {
            0 => Empty,
            2 => SmallInt,
            3 => Integer,
            4 => Single,
            5 => Double,
            6 => Currency,
            7 => Date,
            8 => Bstr,
            11 => Boolean,
            14 => Decimal,
            16 => TinyInt,
            17 => UnsignedTinyInt,
            18 => UnsignedSmallInt,
            19 => UnsignedInt,
            20 => BigInt,
            21 => UnsignedBigInt,
            64 => FileTime,
            72 => Guid,
            128 => Binary,
            129 => Char,
            130 => WChar,
            131 => Numeric,
            133 => DbDate,
            134 => DbTime,
            135 => DbTimeStamp,
            139 => VarNumeric,
            200 => VarChar,
            201 => LongVarChar,
            202 => VarWChar,
            203 => LongVarWChar,
            204 => VarBinary,
            205 => LongVarBinary,
            other => Other(other),
        }
    }

    /// The value kind a field of this type is exposed as.
    pub fn value_kind(&self) -> ValueKind {
        use RecordsetFieldType::*;
        match self {
            TinyInt | SmallInt => ValueKind::Int16,
            Integer => ValueKind::Int32,
            BigInt | UnsignedInt | UnsignedBigInt => ValueKind::Int64,
            UnsignedTinyInt => ValueKind::UChar,
            UnsignedSmallInt => ValueKind::Int32,
            Single => ValueKind::Float,
            Double => ValueKind::Double,
            Currency | Decimal | Numeric | VarNumeric => ValueKind::Numeric,
            Boolean => ValueKind::Bool,
            Char | VarChar | LongVarChar | WChar | VarWChar | LongVarWChar | Bstr | Guid => {
                ValueKind::String
            }
            Binary | VarBinary | LongVarBinary => ValueKind::ByteArray,
            Date | DbTimeStamp | FileTime => ValueKind::DateTime(DateTimeKind::Timestamp),
            DbDate => ValueKind::DateTime(DateTimeKind::Date),
            DbTime => ValueKind::DateTime(DateTimeKind::Time),
            Empty | Other(_) => ValueKind::Unknown,
        }
    }

    /// Binary types whose content is fetched with chunked reads.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            RecordsetFieldType::Binary
                | RecordsetFieldType::VarBinary
                | RecordsetFieldType::LongVarBinary
        )
    }
}

/// A live, natively positioned recordset.
///
/// Like an ADO recordset, a freshly opened recordset sits on its first
/// record (or at EOF when empty). Failures are reported as
/// [`CursorError::Backend`](crate::errors::CursorError::Backend).
pub trait Recordset {
    /// Total number of records, `None` when the provider cannot tell.
    fn record_count(&self) -> Result<Option<usize>>;

    /// Whether the native cursor can move backwards and jump.
    fn is_scrollable(&self) -> bool;

    fn field_count(&self) -> Result<usize>;

    fn field_name(&self, i: usize) -> Result<String>;

    fn field_type(&self, i: usize) -> Result<RecordsetFieldType>;

    /// True once the native cursor moved past the last record.
    fn eof(&self) -> Result<bool>;

    fn move_next(&mut self) -> Result<()>;

    fn move_previous(&mut self) -> Result<()>;

    fn move_first(&mut self) -> Result<()>;

    fn move_last(&mut self) -> Result<()>;

    /// Positions on the 0-based record `row`.
    fn set_absolute_position(&mut self, row: usize) -> Result<()>;

    /// The dynamic value of field `i` on the current record.
    fn value(&self, i: usize) -> Result<RawValue>;

    /// Byte length of a binary field on the current record.
    fn actual_size(&self, i: usize) -> Result<usize>;

    /// Reader for the binary content of field `i`, starting at its first byte.
    fn chunk_reader(&self, i: usize) -> Result<Box<dyn ChunkSource + '_>>;
}
