use geo::{Centroid, MultiPolygon, Polygon};
use geo_types::{Geometry, Point};

use crate::models::GeoPoint;

/// Why a geometry has no representative point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryIssue {
    /// A geometry type the index does not place (multi-points, collections)
    Unsupported,
    /// No vertices, or a centroid that is not defined
    Empty,
}

/// Short type name used in warnings
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Representative point of a lon/lat geometry.
///
/// Polygons use the planar centroid of their exterior ring(s), lines the
/// centroid of their first path, points themselves. The geometry must
/// already be in geographic coordinates.
pub fn representative_point(geometry: &Geometry<f64>) -> Result<GeoPoint, GeometryIssue> {
    let centroid: Option<Point<f64>> = match geometry {
        Geometry::Point(p) => Some(*p),
        Geometry::Line(line) => Some(line.centroid()),
        Geometry::LineString(path) => path.centroid(),
        Geometry::MultiLineString(paths) => paths.0.first().and_then(|path| path.centroid()),
        Geometry::Polygon(polygon) => exterior_only(polygon).centroid(),
        Geometry::Rect(rect) => Some(rect.centroid()),
        Geometry::Triangle(triangle) => Some(triangle.centroid()),
        Geometry::MultiPolygon(polygons) => {
            MultiPolygon::new(polygons.iter().map(exterior_only).collect()).centroid()
        }
        Geometry::MultiPoint(_) | Geometry::GeometryCollection(_) => {
            return Err(GeometryIssue::Unsupported)
        }
    };

    match centroid {
        Some(p) if p.x().is_finite() && p.y().is_finite() => Ok(GeoPoint::new(p.y(), p.x())),
        _ => Err(GeometryIssue::Empty),
    }
}

fn exterior_only(polygon: &Polygon<f64>) -> Polygon<f64> {
    Polygon::new(polygon.exterior().clone(), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon, GeometryCollection, LineString, MultiLineString, MultiPoint};

    fn assert_point(actual: GeoPoint, lat: f64, lon: f64) {
        assert!((actual.lat - lat).abs() < 1e-9, "lat {} != {}", actual.lat, lat);
        assert!((actual.lon - lon).abs() < 1e-9, "lon {} != {}", actual.lon, lon);
    }

    #[test]
    fn test_point_is_itself() {
        let geometry: Geometry<f64> = point!(x: -121.3, y: 44.05).into();
        assert_point(representative_point(&geometry).unwrap(), 44.05, -121.3);
    }

    #[test]
    fn test_polygon_centroid() {
        let geometry: Geometry<f64> = polygon![
            (x: -122.0, y: 44.0),
            (x: -120.0, y: 44.0),
            (x: -120.0, y: 46.0),
            (x: -122.0, y: 46.0),
        ]
        .into();
        assert_point(representative_point(&geometry).unwrap(), 45.0, -121.0);
    }

    #[test]
    fn test_polygon_holes_are_ignored() {
        let exterior = line_string![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ];
        let hole = line_string![
            (x: 2.5, y: 2.5),
            (x: 3.5, y: 2.5),
            (x: 3.5, y: 3.5),
            (x: 2.5, y: 3.5),
            (x: 2.5, y: 2.5),
        ];
        let geometry: Geometry<f64> = Polygon::new(exterior, vec![hole]).into();
        assert_point(representative_point(&geometry).unwrap(), 2.0, 2.0);
    }

    #[test]
    fn test_multiline_uses_first_path() {
        let geometry: Geometry<f64> = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)],
            line_string![(x: 10.0, y: 10.0), (x: 20.0, y: 10.0)],
        ])
        .into();
        assert_point(representative_point(&geometry).unwrap(), 0.0, 1.0);
    }

    #[test]
    fn test_empty_and_unsupported() {
        let empty: Geometry<f64> = LineString::<f64>::new(vec![]).into();
        assert_eq!(representative_point(&empty), Err(GeometryIssue::Empty));

        let no_paths: Geometry<f64> = MultiLineString::<f64>::new(vec![]).into();
        assert_eq!(representative_point(&no_paths), Err(GeometryIssue::Empty));

        let points: Geometry<f64> = MultiPoint::new(vec![point!(x: 1.0, y: 1.0)]).into();
        assert_eq!(representative_point(&points), Err(GeometryIssue::Unsupported));

        let collection: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::<f64>::new_from(vec![]));
        assert_eq!(geometry_kind(&collection), "GeometryCollection");
        assert_eq!(representative_point(&collection), Err(GeometryIssue::Unsupported));
    }
}
