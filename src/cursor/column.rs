use crate::encoding::CharEncoding;
use crate::types::ValueKind;

/// Metadata of one cursor column, fixed for the cursor's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    index: usize,
    name: String,
    kind: ValueKind,
    origin: Option<String>,
    encoding: Option<CharEncoding>,
}

impl ColumnDescriptor {
    pub fn new(index: usize, name: impl Into<String>, kind: ValueKind) -> Self {
        ColumnDescriptor {
            index,
            name: name.into(),
            kind,
            origin: None,
            encoding: None,
        }
    }

    /// Sets the table this column was read from.
    pub fn with_origin(mut self, origin: Option<&str>) -> Self {
        self.origin = origin.map(str::to_string);
        self
    }

    /// Sets the storage encoding; ignored unless the column holds text.
    pub fn with_encoding(mut self, encoding: CharEncoding) -> Self {
        if self.kind == ValueKind::String {
            self.encoding = Some(encoding);
        }
        self
    }

    pub(crate) fn reindexed(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// May be empty for computed columns.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn encoding(&self) -> Option<CharEncoding> {
        self.encoding
    }
}
