use std::fmt;

use thiserror::Error;

use crate::cursor::CursorPosition;
use crate::geometry::GeometryType;
use crate::options::TraverseType;
use crate::types::ValueKind;

pub type Result<T> = std::result::Result<T, CursorError>;

/// Failure raised while interpreting a backend-native cell or a geometry payload.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Expected a value of kind {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: &'static str,
    },
    #[error("Declared size of {declared} bytes but only {available} bytes are available")]
    TruncatedData { declared: usize, available: usize },
    #[error("Unsupported character encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),
}

impl DecodeError {
    pub(crate) fn mismatch(expected: ValueKind, found: &'static str) -> Self {
        DecodeError::TypeMismatch { expected, found }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        DecodeError::MalformedGeometry(msg.into())
    }
}

/// The column an [`CursorError::Access`] failure originated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{} '{}'", self.index, self.name)
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum CursorError {
    #[error("Method '{method_name}' is not supported by a {traverse:?} cursor")]
    Capability {
        method_name: &'static str,
        traverse: TraverseType,
    },
    #[error("Method '{method_name}' requires write access but the cursor is read-only")]
    ReadOnly { method_name: &'static str },
    #[error("Method '{method_name}' requires a current row but the cursor is {position}")]
    CursorState {
        method_name: &'static str,
        position: CursorPosition,
    },
    #[error("Could not read column {column}: {source}{diagnostic}")]
    Access {
        column: ColumnRef,
        #[source]
        source: DecodeError,
        diagnostic: String,
    },
    #[error("Backend error {code}: '{msg}'")]
    Backend { code: i64, msg: String },
    #[error("Invalid column index {index} used on method {method_name}")]
    InvalidColumnIndex {
        index: usize,
        method_name: &'static str,
    },
    #[error("Invalid column name '{column_name}' used on method {method_name}")]
    InvalidColumnName {
        column_name: String,
        method_name: &'static str,
    },
    #[error("Unhandled column type '{type_name}' on method {method_name}")]
    UnsupportedColumnType {
        type_name: String,
        method_name: &'static str,
    },
    #[error("Unsupported geometry type: {0:?}")]
    UnsupportedGeometryType(GeometryType),
    #[error("The source cursor yielded {available} rows but {requested} were requested")]
    MaterializationShortfall { requested: usize, available: usize },
    #[cfg(feature = "ndarray")]
    #[error(transparent)]
    NdarrayShape(#[from] ndarray::ShapeError),
}

impl CursorError {
    /// Wraps a decode failure with the column it came from.
    pub fn access(index: usize, name: &str, source: DecodeError) -> Self {
        CursorError::Access {
            column: ColumnRef {
                index,
                name: name.to_string(),
            },
            source,
            diagnostic: String::new(),
        }
    }

    /// Like [`CursorError::access`], carrying backend diagnostic text.
    pub fn access_with_diagnostic(
        index: usize,
        name: &str,
        source: DecodeError,
        diagnostic: impl Into<String>,
    ) -> Self {
        let diagnostic = diagnostic.into();
        CursorError::Access {
            column: ColumnRef {
                index,
                name: name.to_string(),
            },
            source,
            diagnostic: if diagnostic.is_empty() {
                diagnostic
            } else {
                format!(" ({diagnostic})")
            },
        }
    }

    /// The decode failure underneath an [`CursorError::Access`], if any.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            CursorError::Access { source, .. } => Some(source),
            _ => None,
        }
    }
}
