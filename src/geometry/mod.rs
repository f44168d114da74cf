//! Structured geometry values decoded from cursor cells.
//!
//! ```
//! use geocursor::geometry::{Geometry, GeometryType};
//!
//! let wkb = Geometry::point(10.0, 20.0).with_srid(4326).to_wkb_with_srid();
//! let geometry = Geometry::from_wkb(&wkb).unwrap();
//! assert_eq!(geometry.geometry_type(), GeometryType::Point);
//! assert_eq!(geometry.srid(), Some(4326));
//! ```

mod envelope;
mod geo_conv;
pub mod wkb;

pub use envelope::Envelope;
pub use geo_conv::ToGeometry;

use crate::errors::DecodeError;

/// A coordinate with optional Z and M ordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Coord {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Coord {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Coord {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Coord {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }
}

/// Coordinate dimensionality of a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimension {
    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::Xy,
            (true, false) => Dimension::Xyz,
            (false, true) => Dimension::Xym,
            (true, true) => Dimension::Xyzm,
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    pub fn has_m(&self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    /// Number of ordinates per coordinate.
    pub fn ordinates(&self) -> usize {
        2 + self.has_z() as usize + self.has_m() as usize
    }

    /// Offset added to the base type code (ISO WKB convention).
    pub fn code_offset(&self) -> u32 {
        match self {
            Dimension::Xy => 0,
            Dimension::Xyz => 1000,
            Dimension::Xym => 2000,
            Dimension::Xyzm => 3000,
        }
    }
}

/// Base geometry shape, numbered like the WKB type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
}

impl GeometryType {
    pub fn from_code(code: u32) -> Option<Self> {
        let rv = match code {
            1 => GeometryType::Point,
            2 => GeometryType::LineString,
            3 => GeometryType::Polygon,
            4 => GeometryType::MultiPoint,
            5 => GeometryType::MultiLineString,
            6 => GeometryType::MultiPolygon,
            7 => GeometryType::GeometryCollection,
            15 => GeometryType::PolyhedralSurface,
            16 => GeometryType::Tin,
            17 => GeometryType::Triangle,
            _ => return None,
        };
        Some(rv)
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// The shape each member of a multi-part type must have, if constrained.
    pub fn member_type(&self) -> Option<GeometryType> {
        match self {
            GeometryType::MultiPoint => Some(GeometryType::Point),
            GeometryType::MultiLineString => Some(GeometryType::LineString),
            GeometryType::MultiPolygon | GeometryType::PolyhedralSurface => {
                Some(GeometryType::Polygon)
            }
            GeometryType::Tin => Some(GeometryType::Triangle),
            _ => None,
        }
    }
}

/// Linear ring of a polygon; closure is the producer's responsibility.
pub type LinearRing = Vec<Coord>;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring first, holes after.
    Polygon(Vec<LinearRing>),
    Triangle(Vec<LinearRing>),
    MultiPoint(Vec<Geometry>),
    MultiLineString(Vec<Geometry>),
    MultiPolygon(Vec<Geometry>),
    GeometryCollection(Vec<Geometry>),
    PolyhedralSurface(Vec<Geometry>),
    Tin(Vec<Geometry>),
}

/// A decoded geometry.
///
/// Built fresh on every cursor access; the caller owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    shape: Shape,
    dimension: Dimension,
    srid: Option<i32>,
}

impl Geometry {
    pub fn new(shape: Shape, dimension: Dimension) -> Self {
        Geometry {
            shape,
            dimension,
            srid: None,
        }
    }

    /// A two dimensional point.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::new(Shape::Point(Coord::xy(x, y)), Dimension::Xy)
    }

    /// Create a geometry by parsing WKB, honouring a trailing SRID.
    pub fn from_wkb(wkb: &[u8]) -> Result<Geometry, DecodeError> {
        wkb::read(wkb)
    }

    /// Create a geometry by parsing hex encoded WKB.
    pub fn from_hex(hex: &str) -> Result<Geometry, DecodeError> {
        wkb::read_hex(hex)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn into_shape(self) -> Shape {
        self.shape
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn set_srid(&mut self, srid: Option<i32>) {
        self.srid = srid;
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self.shape {
            Shape::Point(_) => GeometryType::Point,
            Shape::LineString(_) => GeometryType::LineString,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::Triangle(_) => GeometryType::Triangle,
            Shape::MultiPoint(_) => GeometryType::MultiPoint,
            Shape::MultiLineString(_) => GeometryType::MultiLineString,
            Shape::MultiPolygon(_) => GeometryType::MultiPolygon,
            Shape::GeometryCollection(_) => GeometryType::GeometryCollection,
            Shape::PolyhedralSurface(_) => GeometryType::PolyhedralSurface,
            Shape::Tin(_) => GeometryType::Tin,
        }
    }

    /// Member geometries of a multi-part shape; empty for single shapes.
    pub fn members(&self) -> &[Geometry] {
        match &self.shape {
            Shape::MultiPoint(g)
            | Shape::MultiLineString(g)
            | Shape::MultiPolygon(g)
            | Shape::GeometryCollection(g)
            | Shape::PolyhedralSurface(g)
            | Shape::Tin(g) => g,
            _ => &[],
        }
    }

    /// Visits every coordinate, depth first.
    pub fn for_each_coord<F: FnMut(&Coord)>(&self, f: &mut F) {
        match &self.shape {
            Shape::Point(c) => f(c),
            Shape::LineString(coords) => {
                for c in coords {
                    f(c);
                }
            }
            Shape::Polygon(rings) | Shape::Triangle(rings) => {
                for c in rings.iter().flatten() {
                    f(c);
                }
            }
            _ => {
                for g in self.members() {
                    g.for_each_coord(&mut *f);
                }
            }
        }
    }

    /// Minimum bounding rectangle; `None` for empty geometries.
    pub fn envelope(&self) -> Option<Envelope> {
        let mut rv: Option<Envelope> = None;
        self.for_each_coord(&mut |c| {
            if c.x.is_nan() || c.y.is_nan() {
                return;
            }
            match rv.as_mut() {
                Some(env) => env.expand_to(c.x, c.y),
                None => rv = Some(Envelope::from_point(c.x, c.y)),
            }
        });
        rv
    }

    /// Size in bytes of the ISO WKB encoding, without any SRID.
    pub fn wkb_size(&self) -> usize {
        let coord_size = 8 * self.dimension.ordinates();
        match &self.shape {
            Shape::Point(_) => 5 + coord_size,
            Shape::LineString(coords) => 9 + coords.len() * coord_size,
            Shape::Polygon(rings) | Shape::Triangle(rings) => {
                9 + rings
                    .iter()
                    .map(|r| 4 + r.len() * coord_size)
                    .sum::<usize>()
            }
            _ => 9 + self.members().iter().map(Geometry::wkb_size).sum::<usize>(),
        }
    }

    /// Serializes the geometry to little-endian ISO WKB.
    pub fn to_wkb(&self) -> Vec<u8> {
        wkb::write(self, wkb::ByteOrder::LittleEndian)
    }

    /// WKB followed by the SRID as four native-endian bytes, when set.
    pub fn to_wkb_with_srid(&self) -> Vec<u8> {
        let mut rv = self.to_wkb();
        if let Some(srid) = self.srid {
            rv.extend_from_slice(&srid.to_ne_bytes());
        }
        rv
    }

    /// Hex rendering of [`Geometry::to_wkb`].
    pub fn to_hex(&self) -> String {
        crate::utils::to_hex(&self.to_wkb())
    }
}
