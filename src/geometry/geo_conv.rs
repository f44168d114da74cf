use crate::errors::CursorError;
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, Shape};

/// Conversion of [`geo_types`] values into a cursor [`Geometry`].
pub trait ToGeometry {
    fn to_geometry(&self) -> Geometry;
}

fn geo_coord(c: &Coord) -> geo_types::Coord<f64> {
    geo_types::Coord { x: c.x, y: c.y }
}

fn line_string(coords: &[Coord]) -> geo_types::LineString<f64> {
    geo_types::LineString(coords.iter().map(geo_coord).collect())
}

fn polygon(rings: &[Vec<Coord>]) -> geo_types::Polygon<f64> {
    let mut rings = rings.iter().map(|r| line_string(r));
    let outer = rings
        .next()
        .unwrap_or_else(|| geo_types::LineString(Vec::new()));
    geo_types::Polygon::new(outer, rings.collect())
}

fn members<T>(
    members: &[Geometry],
    extract: impl Fn(geo_types::Geometry<f64>) -> Option<T>,
    member_type: GeometryType,
) -> Result<Vec<T>, CursorError> {
    members
        .iter()
        .map(|g| {
            geo_types::Geometry::try_from(g).and_then(|inner| {
                extract(inner).ok_or(CursorError::UnsupportedGeometryType(member_type))
            })
        })
        .collect()
}

impl TryFrom<&Geometry> for geo_types::Geometry<f64> {
    type Error = CursorError;

    /// Z and M ordinates are dropped; geo-types is two dimensional.
    fn try_from(geo: &Geometry) -> Result<geo_types::Geometry<f64>, Self::Error> {
        match geo.shape() {
            Shape::Point(c) => Ok(geo_types::Geometry::Point(geo_types::Point(geo_coord(c)))),
            Shape::LineString(coords) => Ok(geo_types::Geometry::LineString(line_string(coords))),
            Shape::Polygon(rings) => Ok(geo_types::Geometry::Polygon(polygon(rings))),
            Shape::Triangle(rings) => {
                let outer = rings
                    .first()
                    .ok_or(CursorError::UnsupportedGeometryType(GeometryType::Triangle))?;
                match outer.as_slice() {
                    [a, b, c] | [a, b, c, _] => Ok(geo_types::Geometry::Triangle(
                        geo_types::Triangle::new(geo_coord(a), geo_coord(b), geo_coord(c)),
                    )),
                    _ => Err(CursorError::UnsupportedGeometryType(GeometryType::Triangle)),
                }
            }
            Shape::MultiPoint(g) => {
                let points = members(
                    g,
                    |inner| match inner {
                        geo_types::Geometry::Point(p) => Some(p),
                        _ => None,
                    },
                    GeometryType::Point,
                )?;
                Ok(geo_types::Geometry::MultiPoint(geo_types::MultiPoint(points)))
            }
            Shape::MultiLineString(g) => {
                let strings = members(
                    g,
                    |inner| match inner {
                        geo_types::Geometry::LineString(s) => Some(s),
                        _ => None,
                    },
                    GeometryType::LineString,
                )?;
                Ok(geo_types::Geometry::MultiLineString(
                    geo_types::MultiLineString(strings),
                ))
            }
            Shape::MultiPolygon(g) => {
                let polygons = members(
                    g,
                    |inner| match inner {
                        geo_types::Geometry::Polygon(p) => Some(p),
                        _ => None,
                    },
                    GeometryType::Polygon,
                )?;
                Ok(geo_types::Geometry::MultiPolygon(geo_types::MultiPolygon(
                    polygons,
                )))
            }
            Shape::GeometryCollection(g) => {
                let geometry_list = g
                    .iter()
                    .map(|item| item.try_into())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(geo_types::Geometry::GeometryCollection(
                    geo_types::GeometryCollection(geometry_list),
                ))
            }
            Shape::PolyhedralSurface(_) | Shape::Tin(_) => {
                Err(CursorError::UnsupportedGeometryType(geo.geometry_type()))
            }
        }
    }
}

impl TryFrom<Geometry> for geo_types::Geometry<f64> {
    type Error = CursorError;
    fn try_from(value: Geometry) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

fn xy(c: &geo_types::Coord<f64>) -> Coord {
    Coord::xy(c.x, c.y)
}

fn ring(ls: &geo_types::LineString<f64>) -> Vec<Coord> {
    ls.0.iter().map(xy).collect()
}

fn collect<'a, T: ToGeometry + 'a>(items: impl IntoIterator<Item = &'a T>) -> Vec<Geometry> {
    items.into_iter().map(ToGeometry::to_geometry).collect()
}

impl ToGeometry for geo_types::Point<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::point(self.x(), self.y())
    }
}

impl ToGeometry for geo_types::MultiPoint<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(Shape::MultiPoint(collect(&self.0)), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::LineString<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(Shape::LineString(ring(self)), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::Line<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(
            Shape::LineString(vec![xy(&self.start), xy(&self.end)]),
            Dimension::Xy,
        )
    }
}

impl ToGeometry for geo_types::MultiLineString<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(Shape::MultiLineString(collect(&self.0)), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::Polygon<f64> {
    fn to_geometry(&self) -> Geometry {
        let mut rings = vec![ring(self.exterior())];
        rings.extend(self.interiors().iter().map(ring));
        Geometry::new(Shape::Polygon(rings), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::Rect<f64> {
    fn to_geometry(&self) -> Geometry {
        self.to_polygon().to_geometry()
    }
}

impl ToGeometry for geo_types::Triangle<f64> {
    fn to_geometry(&self) -> Geometry {
        let (a, b, c) = (self.v1(), self.v2(), self.v3());
        let ring = vec![xy(&a), xy(&b), xy(&c), xy(&a)];
        Geometry::new(Shape::Triangle(vec![ring]), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::MultiPolygon<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(Shape::MultiPolygon(collect(&self.0)), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::GeometryCollection<f64> {
    fn to_geometry(&self) -> Geometry {
        Geometry::new(Shape::GeometryCollection(collect(&self.0)), Dimension::Xy)
    }
}

impl ToGeometry for geo_types::Geometry<f64> {
    fn to_geometry(&self) -> Geometry {
        match self {
            geo_types::Geometry::Point(c) => c.to_geometry(),
            geo_types::Geometry::Line(c) => c.to_geometry(),
            geo_types::Geometry::LineString(c) => c.to_geometry(),
            geo_types::Geometry::Polygon(c) => c.to_geometry(),
            geo_types::Geometry::MultiPoint(c) => c.to_geometry(),
            geo_types::Geometry::MultiLineString(c) => c.to_geometry(),
            geo_types::Geometry::MultiPolygon(c) => c.to_geometry(),
            geo_types::Geometry::GeometryCollection(c) => c.to_geometry(),
            geo_types::Geometry::Rect(c) => c.to_geometry(),
            geo_types::Geometry::Triangle(c) => c.to_geometry(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, line_string, point, polygon};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> geo_types::LineString<f64> {
        line_string![
            (x: x0, y: y0),
            (x: x0, y: y1),
            (x: x1, y: y1),
            (x: x1, y: y0),
            (x: x0, y: y0),
        ]
    }

    fn round_trip(geo: geo_types::Geometry<f64>) {
        let wkb = geo.to_geometry().to_wkb();
        let decoded = Geometry::from_wkb(&wkb).unwrap();
        let back: geo_types::Geometry<f64> = decoded.try_into().unwrap();
        assert_eq!(back, geo);
    }

    #[test]
    fn test_import_export_point() {
        round_trip(geo_types::Geometry::Point(point!(x: 1., y: 2.)));
    }

    #[test]
    fn test_import_export_multipoint() {
        round_trip(geo_types::Geometry::MultiPoint(geo_types::MultiPoint(vec![
            point!(x: 0., y: 0.),
            point!(x: 0., y: 1.),
            point!(x: 1., y: 2.),
        ])));
    }

    #[test]
    fn test_import_export_multilinestring() {
        round_trip(geo_types::Geometry::MultiLineString(
            geo_types::MultiLineString(vec![
                line_string![(x: 0., y: 0.), (x: 0., y: 1.), (x: 1., y: 2.)],
                line_string![(x: 3., y: 3.), (x: 3., y: 4.), (x: 4., y: 5.)],
            ]),
        ));
    }

    #[test]
    fn test_import_export_polygon() {
        let outer = square(0., 0., 5., 5.);
        let holes = vec![square(1., 1., 2., 2.), square(3., 3., 4., 4.)];
        round_trip(geo_types::Geometry::Polygon(geo_types::Polygon::new(
            outer, holes,
        )));
    }

    #[test]
    fn test_import_export_geometry_collection() {
        round_trip(geo_types::Geometry::GeometryCollection(
            geo_types::GeometryCollection(vec![
                geo_types::Geometry::Point(point!(x: 1., y: 2.)),
                geo_types::Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)]),
                geo_types::Geometry::MultiPolygon(geo_types::MultiPolygon(vec![polygon![
                    (x: 0., y: 0.),
                    (x: 0., y: 1.),
                    (x: 1., y: 1.),
                    (x: 0., y: 0.),
                ]])),
            ]),
        ));
    }

    #[test]
    fn test_triangle_and_rect() {
        let triangle = geo_types::Triangle::new(
            coord! { x: 0., y: 0. },
            coord! { x: 1., y: 0. },
            coord! { x: 0., y: 1. },
        );
        round_trip(geo_types::Geometry::Triangle(triangle));

        let rect = geo_types::Rect::new(coord! { x: 0., y: 0. }, coord! { x: 2., y: 3. });
        let geometry = rect.to_geometry();
        assert_eq!(geometry.geometry_type(), GeometryType::Polygon);
        assert_eq!(geometry.envelope().unwrap().width(), 2.0);
    }

    #[test]
    fn test_z_is_dropped() {
        let geometry = Geometry::new(Shape::Point(Coord::xyz(1.0, 2.0, 3.0)), Dimension::Xyz);
        let geo: geo_types::Geometry<f64> = (&geometry).try_into().unwrap();
        assert_eq!(geo, geo_types::Geometry::Point(point!(x: 1., y: 2.)));
    }

    #[test]
    fn test_tin_is_unsupported() {
        let tin = Geometry::new(Shape::Tin(vec![]), Dimension::Xy);
        let rv: Result<geo_types::Geometry<f64>, _> = tin.try_into();
        assert!(matches!(
            rv,
            Err(CursorError::UnsupportedGeometryType(GeometryType::Tin))
        ));
    }
}
