//! [WKB](https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry#Well-known_binary)
//! (Well-Known Binary) reading and writing.
//!
//! Besides ISO and PostGIS EWKB type codes, [`read`] understands the
//! convention several backends use to carry a spatial reference: when the
//! buffer holds at least four more bytes than the geometry consumed, those
//! bytes are the SRID as a native-endian `i32`. Nothing in the payload tags
//! this; it is inferred from the buffer length alone.

use crate::errors::DecodeError;
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, LinearRing, Shape};
use crate::utils::from_hex;

const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_FLAGS: u32 = EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG;

// Collections nested deeper than this are rejected instead of recursing further.
const MAX_NESTING: usize = 64;

/// Byte order marker of a WKB geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian = 0,
    LittleEndian = 1,
}

impl ByteOrder {
    fn from_marker(marker: u8) -> Result<Self, DecodeError> {
        match marker {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            other => Err(DecodeError::malformed(format!(
                "invalid byte order marker {other}"
            ))),
        }
    }
}

/// Reads a geometry from `buf`, attaching a trailing SRID when present.
pub fn read(buf: &[u8]) -> Result<Geometry, DecodeError> {
    read_with_size(buf).map(|(geometry, _)| geometry)
}

/// Like [`read`], also returning the number of bytes the WKB itself used.
pub fn read_with_size(buf: &[u8]) -> Result<(Geometry, usize), DecodeError> {
    let mut reader = WkbReader::new(buf);
    let mut geometry = reader.read_geometry()?;
    let consumed = reader.position();
    if let Some(trailer) = buf.get(consumed..consumed + 4) {
        let mut srid = [0u8; 4];
        srid.copy_from_slice(trailer);
        let srid = i32::from_ne_bytes(srid);
        tracing::trace!(srid, wkb_size = consumed, "trailing srid after wkb");
        geometry.set_srid(Some(srid));
    }
    Ok((geometry, consumed))
}

/// Decodes hex digit pairs and reads the resulting bytes with [`read`].
pub fn read_hex(hex: &str) -> Result<Geometry, DecodeError> {
    read(&from_hex(hex)?)
}

/// Encodes `geometry` as ISO WKB in the given byte order.
///
/// The SRID is not written; see [`Geometry::to_wkb_with_srid`].
pub fn write(geometry: &Geometry, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(geometry.wkb_size());
    write_geometry(&mut out, geometry, order);
    out
}

/// A cursor over a WKB buffer.
///
/// `endptr` always points at the first byte not yet consumed; every read is
/// bounds checked against the buffer.
pub struct WkbReader<'a> {
    buf: &'a [u8],
    endptr: usize,
}

impl<'a> WkbReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        WkbReader { buf, endptr: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.endptr
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.endptr
    }

    /// Reads one complete geometry starting at the current position.
    pub fn read_geometry(&mut self) -> Result<Geometry, DecodeError> {
        self.read_nested(0, None)
    }

    fn read_nested(
        &mut self,
        depth: usize,
        expected: Option<GeometryType>,
    ) -> Result<Geometry, DecodeError> {
        if depth > MAX_NESTING {
            return Err(DecodeError::malformed("geometry nesting too deep"));
        }
        let order = ByteOrder::from_marker(self.read_u8()?)?;
        let raw_type = self.read_u32(order)?;
        let code = raw_type & !EWKB_FLAGS;
        let (geometry_type, iso_dimension) = match (GeometryType::from_code(code % 1000), code / 1000) {
            (Some(t), d @ 0..=3) => (t, d),
            _ => {
                return Err(DecodeError::malformed(format!(
                    "invalid geometry type code {raw_type}"
                )))
            }
        };
        if let Some(expected) = expected {
            if expected != geometry_type {
                return Err(DecodeError::malformed(format!(
                    "expected a {expected:?} member, found {geometry_type:?}"
                )));
            }
        }
        let dimension = Dimension::from_flags(
            iso_dimension == 1 || iso_dimension == 3 || raw_type & EWKB_Z_FLAG != 0,
            iso_dimension == 2 || iso_dimension == 3 || raw_type & EWKB_M_FLAG != 0,
        );
        let srid = if raw_type & EWKB_SRID_FLAG != 0 {
            Some(self.read_u32(order)? as i32)
        } else {
            None
        };

        let shape = match geometry_type {
            GeometryType::Point => Shape::Point(self.read_coord(order, dimension)?),
            GeometryType::LineString => Shape::LineString(self.read_points(order, dimension)?),
            GeometryType::Polygon => Shape::Polygon(self.read_rings(order, dimension)?),
            GeometryType::Triangle => Shape::Triangle(self.read_rings(order, dimension)?),
            GeometryType::MultiPoint
            | GeometryType::MultiLineString
            | GeometryType::MultiPolygon
            | GeometryType::GeometryCollection
            | GeometryType::PolyhedralSurface
            | GeometryType::Tin => {
                let members = self.read_members(order, depth, geometry_type.member_type())?;
                match geometry_type {
                    GeometryType::MultiPoint => Shape::MultiPoint(members),
                    GeometryType::MultiLineString => Shape::MultiLineString(members),
                    GeometryType::MultiPolygon => Shape::MultiPolygon(members),
                    GeometryType::PolyhedralSurface => Shape::PolyhedralSurface(members),
                    GeometryType::Tin => Shape::Tin(members),
                    _ => Shape::GeometryCollection(members),
                }
            }
        };

        let mut geometry = Geometry::new(shape, dimension);
        geometry.set_srid(srid);
        Ok(geometry)
    }

    fn read_members(
        &mut self,
        order: ByteOrder,
        depth: usize,
        member_type: Option<GeometryType>,
    ) -> Result<Vec<Geometry>, DecodeError> {
        // Smallest possible member: byte order plus type code.
        let count = self.read_count(order, 5)?;
        (0..count)
            .map(|_| self.read_nested(depth + 1, member_type))
            .collect()
    }

    fn read_rings(
        &mut self,
        order: ByteOrder,
        dimension: Dimension,
    ) -> Result<Vec<LinearRing>, DecodeError> {
        let count = self.read_count(order, 4)?;
        (0..count)
            .map(|_| self.read_points(order, dimension))
            .collect()
    }

    fn read_points(
        &mut self,
        order: ByteOrder,
        dimension: Dimension,
    ) -> Result<Vec<Coord>, DecodeError> {
        let count = self.read_count(order, 8 * dimension.ordinates())?;
        (0..count)
            .map(|_| self.read_coord(order, dimension))
            .collect()
    }

    fn read_coord(&mut self, order: ByteOrder, dimension: Dimension) -> Result<Coord, DecodeError> {
        let x = self.read_f64(order)?;
        let y = self.read_f64(order)?;
        let z = if dimension.has_z() {
            Some(self.read_f64(order)?)
        } else {
            None
        };
        let m = if dimension.has_m() {
            Some(self.read_f64(order)?)
        } else {
            None
        };
        Ok(Coord { x, y, z, m })
    }

    /// Reads an element count and checks the buffer can hold that many
    /// elements of at least `min_element_size` bytes.
    fn read_count(&mut self, order: ByteOrder, min_element_size: usize) -> Result<usize, DecodeError> {
        let count = self.read_u32(order)? as usize;
        match count.checked_mul(min_element_size) {
            Some(needed) if needed <= self.remaining() => Ok(count),
            _ => Err(DecodeError::malformed(format!(
                "count {count} at offset {} exceeds the remaining {} bytes",
                self.endptr - 4,
                self.remaining()
            ))),
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self
            .buf
            .get(self.endptr..self.endptr + N)
            .ok_or_else(|| {
                DecodeError::malformed(format!(
                    "truncated wkb: need {N} bytes at offset {}, have {}",
                    self.endptr,
                    self.remaining()
                ))
            })?;
        let mut rv = [0u8; N];
        rv.copy_from_slice(bytes);
        self.endptr += N;
        Ok(rv)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, DecodeError> {
        let bytes = self.take::<4>()?;
        Ok(match order {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        })
    }

    fn read_f64(&mut self, order: ByteOrder) -> Result<f64, DecodeError> {
        let bytes = self.take::<8>()?;
        Ok(match order {
            ByteOrder::BigEndian => f64::from_be_bytes(bytes),
            ByteOrder::LittleEndian => f64::from_le_bytes(bytes),
        })
    }
}

fn write_geometry(out: &mut Vec<u8>, geometry: &Geometry, order: ByteOrder) {
    let dimension = geometry.dimension();
    out.push(order as u8);
    write_u32(
        out,
        geometry.geometry_type().code() + dimension.code_offset(),
        order,
    );
    match geometry.shape() {
        Shape::Point(c) => write_coord(out, c, dimension, order),
        Shape::LineString(coords) => write_points(out, coords, dimension, order),
        Shape::Polygon(rings) | Shape::Triangle(rings) => {
            write_u32(out, rings.len() as u32, order);
            for ring in rings {
                write_points(out, ring, dimension, order);
            }
        }
        _ => {
            let members = geometry.members();
            write_u32(out, members.len() as u32, order);
            for member in members {
                write_geometry(out, member, order);
            }
        }
    }
}

fn write_points(out: &mut Vec<u8>, coords: &[Coord], dimension: Dimension, order: ByteOrder) {
    write_u32(out, coords.len() as u32, order);
    for c in coords {
        write_coord(out, c, dimension, order);
    }
}

fn write_coord(out: &mut Vec<u8>, c: &Coord, dimension: Dimension, order: ByteOrder) {
    write_f64(out, c.x, order);
    write_f64(out, c.y, order);
    if dimension.has_z() {
        write_f64(out, c.z.unwrap_or(0.0), order);
    }
    if dimension.has_m() {
        write_f64(out, c.m.unwrap_or(0.0), order);
    }
}

fn write_u32(out: &mut Vec<u8>, v: u32, order: ByteOrder) {
    match order {
        ByteOrder::BigEndian => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
    }
}

fn write_f64(out: &mut Vec<u8>, v: f64, order: ByteOrder) {
    match order {
        ByteOrder::BigEndian => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
    }
}
