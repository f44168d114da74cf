use std::fmt::{Display, Formatter};

/// Where a cursor currently points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorPosition {
    BeforeFirst,
    /// A valid, 0-based row.
    Row(usize),
    AfterLast,
}

impl CursorPosition {
    pub fn row(&self) -> Option<usize> {
        match self {
            CursorPosition::Row(i) => Some(*i),
            _ => None,
        }
    }
}

impl Display for CursorPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorPosition::BeforeFirst => write!(f, "before the first row"),
            CursorPosition::Row(i) => write!(f, "at row {i}"),
            CursorPosition::AfterLast => write!(f, "after the last row"),
        }
    }
}

/// Position bookkeeping for adapters backed by an indexed row buffer.
///
/// Every motion returns whether the cursor ended on a valid row.
#[derive(Clone, Debug)]
pub struct RowPosition {
    current: CursorPosition,
    len: usize,
}

impl RowPosition {
    pub fn new(len: usize) -> Self {
        RowPosition {
            current: CursorPosition::BeforeFirst,
            len,
        }
    }

    pub fn position(&self) -> CursorPosition {
        self.current
    }

    pub fn index(&self) -> Option<usize> {
        self.current.row()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn move_next(&mut self) -> bool {
        self.current = match self.current {
            CursorPosition::BeforeFirst if self.len > 0 => CursorPosition::Row(0),
            CursorPosition::Row(i) if i + 1 < self.len => CursorPosition::Row(i + 1),
            _ => CursorPosition::AfterLast,
        };
        self.current.row().is_some()
    }

    pub fn move_previous(&mut self) -> bool {
        self.current = match self.current {
            CursorPosition::AfterLast if self.len > 0 => CursorPosition::Row(self.len - 1),
            CursorPosition::Row(i) if i > 0 => CursorPosition::Row(i - 1),
            _ => CursorPosition::BeforeFirst,
        };
        self.current.row().is_some()
    }

    pub fn move_before_first(&mut self) {
        self.current = CursorPosition::BeforeFirst;
    }

    pub fn move_first(&mut self) -> bool {
        self.current = if self.len > 0 {
            CursorPosition::Row(0)
        } else {
            CursorPosition::AfterLast
        };
        self.current.row().is_some()
    }

    pub fn move_last(&mut self) -> bool {
        self.current = if self.len > 0 {
            CursorPosition::Row(self.len - 1)
        } else {
            CursorPosition::BeforeFirst
        };
        self.current.row().is_some()
    }

    /// Jumps to row `i`; an out of range row leaves the position untouched.
    pub fn move_to(&mut self, i: usize) -> bool {
        if i < self.len {
            self.current = CursorPosition::Row(i);
            true
        } else {
            false
        }
    }

    /// Records that a row was appended at the end.
    pub fn push_row(&mut self) {
        self.len += 1;
    }

    /// Records that row `i` was removed, keeping the cursor on the row that
    /// followed it (or after the end).
    pub fn remove_row(&mut self, i: usize) {
        if i >= self.len {
            return;
        }
        self.len -= 1;
        if let CursorPosition::Row(cur) = self.current {
            if cur > i {
                self.current = CursorPosition::Row(cur - 1);
            } else if cur >= self.len {
                self.current = CursorPosition::AfterLast;
            }
        }
    }
}
