use crate::geometry::{Coord, Dimension, Envelope, Geometry, Shape};

/// A vertex as stored by the legacy engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegacyPoint {
    pub x: f64,
    pub y: f64,
}

impl LegacyPoint {
    pub fn new(x: f64, y: f64) -> Self {
        LegacyPoint { x, y }
    }
}

/// The engine's native geometry representations.
#[derive(Clone, Debug, PartialEq)]
pub enum LegacyGeometry {
    Point(LegacyPoint),
    Node(LegacyPoint),
    Line(Vec<LegacyPoint>),
    /// Rings, outer ring first.
    Polygon(Vec<Vec<LegacyPoint>>),
    /// A grid cell, stored as its box.
    Cell(Envelope),
}

fn coord(p: &LegacyPoint) -> Coord {
    Coord::xy(p.x, p.y)
}

impl LegacyGeometry {
    fn to_geometry(&self) -> Geometry {
        let shape = match self {
            LegacyGeometry::Point(p) | LegacyGeometry::Node(p) => Shape::Point(coord(p)),
            LegacyGeometry::Line(points) => Shape::LineString(points.iter().map(coord).collect()),
            LegacyGeometry::Polygon(rings) => Shape::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(coord).collect())
                    .collect(),
            ),
            LegacyGeometry::Cell(b) => Shape::Polygon(vec![vec![
                Coord::xy(b.min_x, b.min_y),
                Coord::xy(b.max_x, b.min_y),
                Coord::xy(b.max_x, b.max_y),
                Coord::xy(b.min_x, b.max_y),
                Coord::xy(b.min_x, b.min_y),
            ]]),
        };
        Geometry::new(shape, Dimension::Xy)
    }
}

/// Re-encodes the geometries of one engine object as WKB followed by the
/// layer SRID.
///
/// A single part is encoded as itself; several parts of the same shape
/// become the matching multi geometry, mixed parts a collection. Returns
/// `None` for an object without geometry.
pub(crate) fn bridge_to_wkb(parts: &[LegacyGeometry], srid: Option<i32>) -> Option<Vec<u8>> {
    let mut members: Vec<Geometry> = parts.iter().map(LegacyGeometry::to_geometry).collect();
    let mut geometry = match members.len() {
        0 => return None,
        1 => members.pop()?,
        _ => {
            let first = members[0].geometry_type();
            let same = members.iter().all(|g| g.geometry_type() == first);
            let shape = match first {
                crate::geometry::GeometryType::Point if same => Shape::MultiPoint(members),
                crate::geometry::GeometryType::LineString if same => {
                    Shape::MultiLineString(members)
                }
                crate::geometry::GeometryType::Polygon if same => Shape::MultiPolygon(members),
                _ => Shape::GeometryCollection(members),
            };
            Geometry::new(shape, Dimension::Xy)
        }
    };
    geometry.set_srid(srid);
    Some(geometry.to_wkb_with_srid())
}
