//! In-process stand-ins for the backends the adapters talk to.

use std::cell::Cell;

use crate::decode::{ChunkSource, RawValue};
use crate::errors::{CursorError, Result};
use crate::geometry::Envelope;
use crate::legacy::{LegacyAttribute, LegacyInstance, LegacyQuerier, LegacyTable};
use crate::recordset::{Recordset, RecordsetFieldType};

/// Latin-1 bytes of `s`, as the legacy engine stores text.
pub fn latin1(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

fn backend_error(msg: &str) -> CursorError {
    CursorError::Backend {
        code: -1,
        msg: msg.to_string(),
    }
}

/// A recordset over fixed rows; the native cursor starts on the first
/// record, like a freshly opened ADO recordset.
pub struct FakeRecordset {
    pub fields: Vec<(String, RecordsetFieldType)>,
    pub rows: Vec<Vec<RawValue>>,
    pub cursor: usize,
    pub scrollable: bool,
    pub report_count: bool,
    /// Largest chunk the BLOB reader hands out per call.
    pub chunk_size: usize,
    /// Bytes the BLOB reader withholds, so the declared size overshoots.
    pub withheld: usize,
    pub chunk_calls: Cell<usize>,
    pub native_moves: usize,
}

impl FakeRecordset {
    pub fn new(fields: &[(&str, RecordsetFieldType)], rows: Vec<Vec<RawValue>>) -> Self {
        FakeRecordset {
            fields: fields
                .iter()
                .map(|(name, ty)| (name.to_string(), *ty))
                .collect(),
            rows,
            cursor: 0,
            scrollable: true,
            report_count: true,
            chunk_size: 4,
            withheld: 0,
            chunk_calls: Cell::new(0),
            native_moves: 0,
        }
    }

    pub fn forward_only(mut self) -> Self {
        self.scrollable = false;
        self.report_count = false;
        self
    }

    fn current(&self) -> Result<&Vec<RawValue>> {
        self.rows
            .get(self.cursor)
            .ok_or_else(|| backend_error("no current record"))
    }

    fn scroll(&mut self) -> Result<()> {
        if self.scrollable {
            self.native_moves += 1;
            Ok(())
        } else {
            Err(backend_error("recordset is forward-only"))
        }
    }
}

pub struct FakeChunkReader<'a> {
    data: Vec<u8>,
    chunk_size: usize,
    calls: &'a Cell<usize>,
}

impl ChunkSource for FakeChunkReader<'_> {
    fn get_chunk(&mut self, max_len: usize) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        let n = max_len.min(self.chunk_size).min(self.data.len());
        Ok(self.data.drain(..n).collect())
    }
}

impl Recordset for FakeRecordset {
    fn record_count(&self) -> Result<Option<usize>> {
        Ok(self.report_count.then_some(self.rows.len()))
    }

    fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    fn field_count(&self) -> Result<usize> {
        Ok(self.fields.len())
    }

    fn field_name(&self, i: usize) -> Result<String> {
        self.fields
            .get(i)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| backend_error("no such field"))
    }

    fn field_type(&self, i: usize) -> Result<RecordsetFieldType> {
        self.fields
            .get(i)
            .map(|(_, ty)| *ty)
            .ok_or_else(|| backend_error("no such field"))
    }

    fn eof(&self) -> Result<bool> {
        Ok(self.cursor >= self.rows.len())
    }

    fn move_next(&mut self) -> Result<()> {
        if self.cursor >= self.rows.len() {
            return Err(backend_error("move past EOF"));
        }
        self.native_moves += 1;
        self.cursor += 1;
        Ok(())
    }

    fn move_previous(&mut self) -> Result<()> {
        self.scroll()?;
        self.cursor = self.cursor.saturating_sub(1);
        Ok(())
    }

    fn move_first(&mut self) -> Result<()> {
        // Providers requery forward-only recordsets on MoveFirst.
        self.native_moves += 1;
        self.cursor = 0;
        Ok(())
    }

    fn move_last(&mut self) -> Result<()> {
        self.scroll()?;
        self.cursor = self.rows.len().saturating_sub(1);
        Ok(())
    }

    fn set_absolute_position(&mut self, row: usize) -> Result<()> {
        self.scroll()?;
        if row >= self.rows.len() {
            return Err(backend_error("absolute position out of range"));
        }
        self.cursor = row;
        Ok(())
    }

    fn value(&self, i: usize) -> Result<RawValue> {
        self.current()?
            .get(i)
            .cloned()
            .ok_or_else(|| backend_error("no such field"))
    }

    fn actual_size(&self, i: usize) -> Result<usize> {
        match self.value(i)? {
            RawValue::Bytes(b) => Ok(b.len()),
            RawValue::Null => Ok(0),
            other => Err(backend_error(other.type_name())),
        }
    }

    fn chunk_reader(&self, i: usize) -> Result<Box<dyn ChunkSource + '_>> {
        let mut data = match self.value(i)? {
            RawValue::Bytes(b) => b,
            _ => Vec::new(),
        };
        data.truncate(data.len().saturating_sub(self.withheld));
        Ok(Box::new(FakeChunkReader {
            data,
            chunk_size: self.chunk_size,
            calls: &self.chunk_calls,
        }))
    }
}

/// A legacy table portal over fixed rows.
pub struct FakeLegacyTable {
    pub name: Vec<u8>,
    pub attributes: Vec<LegacyAttribute>,
    pub rows: Vec<Vec<RawValue>>,
    /// Row the portal is on; `None` before the first fetch.
    pub current: Option<usize>,
    pub fetches: usize,
}

impl FakeLegacyTable {
    pub fn new(name: &str, attributes: Vec<LegacyAttribute>, rows: Vec<Vec<RawValue>>) -> Self {
        FakeLegacyTable {
            name: latin1(name),
            attributes,
            rows,
            current: None,
            fetches: 0,
        }
    }
}

impl LegacyTable for FakeLegacyTable {
    fn name(&self) -> &[u8] {
        &self.name
    }

    fn attributes(&self) -> Result<Vec<LegacyAttribute>> {
        Ok(self.attributes.clone())
    }

    fn fetch_row(&mut self) -> Result<bool> {
        self.fetches += 1;
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        Ok(next < self.rows.len())
    }

    fn value(&self, i: usize) -> Result<RawValue> {
        self.current
            .and_then(|row| self.rows.get(row))
            .and_then(|row| row.get(i))
            .cloned()
            .ok_or_else(|| backend_error("portal is not on a row"))
    }
}

/// A vector layer querier over fixed instances.
pub struct FakeQuerier {
    pub layer_name: Vec<u8>,
    pub attributes: Vec<LegacyAttribute>,
    pub instances: Vec<LegacyInstance>,
    pub epsg: Option<i32>,
    pub layer_box: Option<Envelope>,
    pub has_geometry: bool,
    pub next: usize,
    pub loads: usize,
}

impl FakeQuerier {
    pub fn new(
        layer_name: &str,
        attributes: Vec<LegacyAttribute>,
        instances: Vec<LegacyInstance>,
    ) -> Self {
        FakeQuerier {
            layer_name: latin1(layer_name),
            attributes,
            instances,
            epsg: Some(4326),
            layer_box: None,
            has_geometry: true,
            next: 0,
            loads: 0,
        }
    }
}

impl LegacyQuerier for FakeQuerier {
    fn layer_name(&self) -> &[u8] {
        &self.layer_name
    }

    fn attributes(&self) -> Result<Vec<LegacyAttribute>> {
        Ok(self.attributes.clone())
    }

    fn has_geometry(&self) -> bool {
        self.has_geometry
    }

    fn epsg_code(&self) -> Option<i32> {
        self.epsg
    }

    fn layer_box(&self) -> Option<Envelope> {
        self.layer_box
    }

    fn load_instances(&mut self) -> Result<bool> {
        self.loads += 1;
        self.next = 0;
        Ok(!self.instances.is_empty())
    }

    fn num_elem_instances(&self) -> Option<usize> {
        Some(self.instances.len())
    }

    fn fetch_instance(&mut self) -> Result<Option<LegacyInstance>> {
        let instance = self.instances.get(self.next).cloned();
        if instance.is_some() {
            self.next += 1;
        }
        Ok(instance)
    }
}

/// Assert numerical difference between two expressions is less than
/// 64-bit machine epsilon or a specified epsilon.
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    ($left:expr, $right:expr, epsilon = $ep:expr, field = $field:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "field {}: |{} - {}| = {} is greater than epsilon {:.4e}",
            $field,
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    (Envelope, $left:expr, $right:expr, epsilon = $ep:expr) => {
        assert_near!($left.min_x, $right.min_x, epsilon = $ep, field = "min_x");
        assert_near!($left.min_y, $right.min_y, epsilon = $ep, field = "min_y");
        assert_near!($left.max_x, $right.max_x, epsilon = $ep, field = "max_x");
        assert_near!($left.max_y, $right.max_y, epsilon = $ep, field = "max_y");
    };
}

pub(crate) use assert_near;
