use bitflags::bitflags;

use crate::encoding::CharEncoding;

/// How a cursor may be moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraverseType {
    /// Only `move_next` (and the unconditional `move_before_first` reset).
    ForwardOnly,
    /// Forward and backward, but no jumps to an absolute row.
    Bidirectional,
    /// Any motion, including `move_to`.
    Random,
}

impl TraverseType {
    pub fn can_move_backward(&self) -> bool {
        !matches!(self, TraverseType::ForwardOnly)
    }

    pub fn can_move_absolute(&self) -> bool {
        matches!(self, TraverseType::Random)
    }
}

/// Read/write permission associated with a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessPolicy {
    NoAccess,
    Read,
    Write,
    ReadWrite,
}

impl AccessPolicy {
    pub fn can_read(&self) -> bool {
        matches!(self, AccessPolicy::Read | AccessPolicy::ReadWrite)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, AccessPolicy::Write | AccessPolicy::ReadWrite)
    }
}

bitflags! {
    /// Capabilities requested from an adapter when it is constructed.
    ///
    /// An adapter grants at most what its backend can do; requesting
    /// `RANDOM_ACCESS` from a forward-only backend yields a forward-only cursor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CursorFlags: u32 {
        /// Read-only access (default).
        const READ_ONLY = 0x00;
        /// Allow writing through the cursor.
        const UPDATE = 0x01;
        /// Ask for random traversal.
        const RANDOM_ACCESS = 0x02;
        /// The cursor must not depend on a live backend connection.
        const DISCONNECTED = 0x04;
    }
}

impl Default for CursorFlags {
    fn default() -> CursorFlags {
        CursorFlags::READ_ONLY
    }
}

impl CursorFlags {
    pub fn access_policy(&self) -> AccessPolicy {
        if self.contains(CursorFlags::UPDATE) {
            AccessPolicy::ReadWrite
        } else {
            AccessPolicy::Read
        }
    }
}

/// Construction options shared by every adapter.
///
/// Each adapter receives its own copy, so cursors with different
/// capabilities can live side by side.
#[derive(Debug, Clone)]
pub struct CursorOptions<'a> {
    pub flags: CursorFlags,
    /// Backend columns that carry WKB and must be exposed as geometries.
    pub geometry_columns: Option<&'a [&'a str]>,
    /// Backend columns that carry raster references.
    pub raster_columns: Option<&'a [&'a str]>,
    /// Table reported as the origin of every column.
    pub origin: Option<&'a str>,
    /// Encoding of backend text that arrives as raw bytes.
    pub encoding: CharEncoding,
    /// Decimal separator used by the backend in numeric text.
    pub decimal_separator: char,
}

impl Default for CursorOptions<'_> {
    fn default() -> Self {
        CursorOptions {
            flags: CursorFlags::default(),
            geometry_columns: None,
            raster_columns: None,
            origin: None,
            encoding: CharEncoding::Utf8,
            decimal_separator: '.',
        }
    }
}

impl CursorOptions<'_> {
    pub fn is_geometry_column(&self, name: &str) -> bool {
        self.geometry_columns
            .is_some_and(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(name)))
    }

    pub fn is_raster_column(&self, name: &str) -> bool {
        self.raster_columns
            .is_some_and(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(name)))
    }
}
