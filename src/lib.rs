//! Typed row cursors over heterogeneous GIS data backends.
//!
//! Every backend is exposed through the same [`RowCursor`] contract: a
//! cursor starts before the first row, moves within the capabilities of
//! its [`TraverseType`], and hands out typed, decoded values for the
//! current row. Geometries arrive as WKB (optionally followed by an SRID)
//! and are decoded by the [`geometry::wkb`] codec.
//!
//! The adapters are:
//!
//! * [`RecordsetDataSet`] over live COM-style recordsets, reading binary
//!   fields in chunks;
//! * [`LegacyTableDataSet`], [`LegacyVectorDataSet`] and
//!   [`LegacyRasterDataSet`] over the legacy GIS engine;
//! * [`MemoryDataSet`], a writable in-memory table that can also
//!   materialize any other cursor.
//!
//! ## Use
//!
//! ```
//! use geocursor::{CursorOptions, MemoryDataSet, RowCursor, Value, ValueKind};
//! use geocursor::cursor::ColumnDescriptor;
//! use geocursor::geometry::Geometry;
//!
//! let mut ds = MemoryDataSet::new(vec![
//!     ColumnDescriptor::new(0, "name", ValueKind::String),
//!     ColumnDescriptor::new(1, "geom", ValueKind::Geometry),
//! ]);
//! ds.add_row(vec![
//!     Some(Value::String("Recife".to_string())),
//!     Some(Value::Geometry(Geometry::point(-34.9, -8.0).with_srid(4326))),
//! ])
//! .unwrap();
//!
//! while ds.move_next().unwrap() {
//!     let geom = ds.get_geometry_by_name("geom").unwrap();
//!     println!("{} {:?}", ds.get_string(0).unwrap(), geom.srid());
//! }
//! # let _ = CursorOptions::default();
//! ```

#![crate_name = "geocursor"]
#![crate_type = "lib"]

pub mod cursor;
pub mod decode;
pub mod encoding;
pub mod errors;
pub mod geometry;
pub mod legacy;
pub mod memory;
pub mod options;
pub mod recordset;
pub mod types;
pub mod utils;

pub use cursor::{CursorPosition, RowCursor};
pub use errors::{CursorError, DecodeError, Result};
pub use legacy::{LegacyRasterDataSet, LegacyTableDataSet, LegacyVectorDataSet};
pub use memory::MemoryDataSet;
pub use options::{AccessPolicy, CursorFlags, CursorOptions, TraverseType};
pub use recordset::RecordsetDataSet;
pub use types::{Value, ValueKind};

#[cfg(test)]
mod test_utils;

#[cfg(test)]
fn assert_almost_eq(a: f64, b: f64) {
    let diff: f64 = b - a;
    assert!(diff.abs() < 1e-9);
}
