//! Geometry engine adapter.
//!
//! Thin layer over the `geo` crate family: parsing and serialization (WKT, GeoJSON),
//! boolean operations, predicates and metrics. Geometries are always `geo::Geometry<f64>`,
//! which carries x/y only, so any z ordinate is dropped while parsing.

use geo::line_intersection::line_intersection;
use geo::orient::Direction;
use geo::{
    unary_union, Area, BooleanOps, BoundingRect, Contains, Geometry, GeometryCollection,
    HasDimensions, Intersects, Line, LineIntersection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Orient, Point, Polygon, Rect,
};
use geojson::GeoJson;
use meridian_core::error::{MeridianError, Result};
use wkt::{ToWkt, TryFromWkt};

/// Parse a WKT string
pub fn parse_wkt(text: &str) -> Result<Geometry> {
    Geometry::<f64>::try_from_wkt_str(text)
        .map_err(|e| MeridianError::no_geometry(format!("Failed to parse WKT: {}", e)))
}

/// Serialize to WKT
pub fn to_wkt(geometry: &Geometry) -> String {
    geometry.wkt_string()
}

/// Parse a GeoJSON document (geometry, feature or feature collection)
pub fn parse_geojson(text: &str) -> Result<Geometry> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| MeridianError::no_geometry(format!("Failed to parse GeoJSON: {}", e)))?;
    from_geojson(geojson)
}

/// Parse an already-decoded GeoJSON value
pub fn parse_geojson_value(value: serde_json::Value) -> Result<Geometry> {
    let geojson = GeoJson::from_json_value(value)
        .map_err(|e| MeridianError::no_geometry(format!("Failed to parse GeoJSON: {}", e)))?;
    from_geojson(geojson)
}

fn from_geojson(geojson: GeoJson) -> Result<Geometry> {
    match geojson {
        GeoJson::Geometry(geometry) => convert_geojson_geometry(geometry),
        GeoJson::Feature(feature) => match feature.geometry {
            Some(geometry) => convert_geojson_geometry(geometry),
            None => Err(MeridianError::no_geometry("GeoJSON feature has no geometry")),
        },
        GeoJson::FeatureCollection(collection) => {
            let mut geometries = collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .map(convert_geojson_geometry)
                .collect::<Result<Vec<_>>>()?;

            match geometries.len() {
                0 => Err(MeridianError::no_geometry("GeoJSON feature collection has no geometries")),
                1 => Ok(geometries.remove(0)),
                _ => Ok(Geometry::GeometryCollection(GeometryCollection(geometries))),
            }
        }
    }
}

fn convert_geojson_geometry(geometry: geojson::Geometry) -> Result<Geometry> {
    Geometry::<f64>::try_from(geometry)
        .map_err(|e| MeridianError::no_geometry(format!("Unsupported GeoJSON geometry: {}", e)))
}

/// Serialize to a GeoJSON geometry object
pub fn to_geojson(geometry: &Geometry) -> Result<String> {
    let geojson = geojson::Geometry::new(geojson::Value::from(geometry));
    serde_json::to_string(&geojson).map_err(|e| MeridianError::Serialization(e.to_string()))
}

/// Bounding rectangle, `None` for empty geometries
pub fn envelope(geometry: &Geometry) -> Option<Rect> {
    geometry.bounding_rect()
}

pub fn is_empty(geometry: &Geometry) -> bool {
    geometry.is_empty()
}

/// Planar area in the units of the geometry's CRS
pub fn area(geometry: &Geometry) -> f64 {
    geometry.unsigned_area()
}

pub fn intersects(a: &Geometry, b: &Geometry) -> bool {
    a.intersects(b)
}

/// `geometry` lies completely inside `container`
pub fn within(geometry: &Geometry, container: &Geometry) -> bool {
    container.contains(geometry)
}

/// Coordinates of a point-like geometry
pub fn point_coords(geometry: &Geometry) -> Option<Vec<(f64, f64)>> {
    match geometry {
        Geometry::Point(p) => Some(vec![p.x_y()]),
        Geometry::MultiPoint(mp) => Some(mp.iter().map(|p| p.x_y()).collect()),
        _ => None,
    }
}

/// Set intersection of two geometries.
///
/// Areal/areal goes through the boolean overlay, lines are clipped by polygons, line
/// pairs meet in points and shared segments, and points are kept where they touch the
/// other operand. Collections are dissolved first and then intersected part by part.
pub fn intersection(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    let is_collection = |g: &Geometry| matches!(g, Geometry::GeometryCollection(_));
    if is_collection(a) || is_collection(b) {
        return match (dissolve(a), dissolve(b)) {
            (Geometry::GeometryCollection(collection), other)
            | (other, Geometry::GeometryCollection(collection)) => {
                intersect_collection(&collection, &other)
            }
            (a, b) => intersection(&a, &b),
        };
    }

    if let Some(points) = puntal(a) {
        return Ok(collapse(Geometry::MultiPoint(points_touching(points, b))));
    }
    if let Some(points) = puntal(b) {
        return Ok(collapse(Geometry::MultiPoint(points_touching(points, a))));
    }

    match (areal(a), areal(b)) {
        (Some(pa), Some(pb)) => Ok(collapse(Geometry::MultiPolygon(pa.intersection(&pb)))),
        (Some(polygons), None) => match lineal(b) {
            Some(lines) => Ok(collapse(Geometry::MultiLineString(polygons.clip(&lines, false)))),
            None => Err(unsupported_pair("intersection", a, b)),
        },
        (None, Some(polygons)) => match lineal(a) {
            Some(lines) => Ok(collapse(Geometry::MultiLineString(polygons.clip(&lines, false)))),
            None => Err(unsupported_pair("intersection", a, b)),
        },
        (None, None) => match (lineal(a), lineal(b)) {
            (Some(la), Some(lb)) => Ok(intersect_lines(&la, &lb)),
            _ => Err(unsupported_pair("intersection", a, b)),
        },
    }
}

fn unsupported_pair(operation: &str, a: &Geometry, b: &Geometry) -> MeridianError {
    MeridianError::unsupported(format!(
        "{} of {} and {} is not supported",
        operation,
        geometry_type_name(a),
        geometry_type_name(b)
    ))
}

fn intersect_collection(collection: &GeometryCollection, other: &Geometry) -> Result<Geometry> {
    let mut parts = Vec::new();
    for member in collection.iter() {
        let part = intersection(member, other)?;
        if !part.is_empty() {
            parts.push(part);
        }
    }
    Ok(Geometry::GeometryCollection(GeometryCollection(parts)))
}

fn points_touching(points: MultiPoint, other: &Geometry) -> MultiPoint {
    points.into_iter().filter(|p| other.intersects(&Geometry::Point(*p))).collect()
}

/// Crossing points and shared segments of two lineal geometries, segment by segment
fn intersect_lines(a: &MultiLineString, b: &MultiLineString) -> Geometry {
    let mut parts = Parts::default();

    for p in a.iter().flat_map(|ls| ls.lines()) {
        for q in b.iter().flat_map(|ls| ls.lines()) {
            match line_intersection(p, q) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    parts.add_point(Point::from(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    parts.lines.push(line_string(&intersection));
                }
                None => {}
            }
        }
    }

    // Points already lying on a shared segment add nothing
    let lines = Geometry::MultiLineString(MultiLineString::new(parts.lines.clone()));
    parts.points.retain(|p| !lines.intersects(p));
    parts.into_geometry()
}

/// Set union of two geometries.
///
/// Both operands are flattened by dimension, so collection members take part too.
/// Polygons are dissolved through the boolean overlay; points and lines are merged into
/// one multi-geometry per dimension; mixed dimensions come back as a collection.
pub fn union(a: &Geometry, b: &Geometry) -> Geometry {
    let mut parts = Parts::default();
    parts.extend(a);
    parts.extend(b);
    parts.into_geometry()
}

/// Merge overlapping members of a collection; other geometries are returned as they are
pub fn dissolve(geometry: &Geometry) -> Geometry {
    match geometry {
        Geometry::GeometryCollection(_) => {
            let mut parts = Parts::default();
            parts.extend(geometry);
            parts.into_geometry()
        }
        other => other.clone(),
    }
}

/// Geometry members grouped by dimension
#[derive(Default)]
struct Parts {
    polygons: Vec<Polygon>,
    lines: Vec<LineString>,
    points: Vec<Point>,
}

impl Parts {
    fn extend(&mut self, geometry: &Geometry) {
        if let Geometry::GeometryCollection(collection) = geometry {
            for member in collection.iter() {
                self.extend(member);
            }
        } else if let Some(polygons) = areal(geometry) {
            // The overlay picks its fill rule from the first ring's winding
            self.polygons.extend(polygons.iter().map(|p| p.orient(Direction::Default)));
        } else if let Some(lines) = lineal(geometry) {
            self.lines.extend(lines);
        } else if let Some(points) = puntal(geometry) {
            for point in points {
                self.add_point(point);
            }
        }
    }

    fn add_point(&mut self, point: Point) {
        if !self.points.contains(&point) {
            self.points.push(point);
        }
    }

    fn into_geometry(self) -> Geometry {
        let mut members = Vec::new();
        if !self.polygons.is_empty() {
            members.push(collapse(Geometry::MultiPolygon(unary_union(&self.polygons))));
        }
        if !self.lines.is_empty() {
            members.push(collapse(Geometry::MultiLineString(MultiLineString::new(self.lines))));
        }
        if !self.points.is_empty() {
            members.push(collapse(Geometry::MultiPoint(MultiPoint::new(self.points))));
        }

        match members.len() {
            1 => members.remove(0),
            _ => Geometry::GeometryCollection(GeometryCollection(members)),
        }
    }
}

/// Unwrap single-member multi-geometries
pub fn collapse(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::MultiPolygon(mut mp) if mp.0.len() == 1 => Geometry::Polygon(mp.0.remove(0)),
        Geometry::MultiLineString(mut mls) if mls.0.len() == 1 => {
            Geometry::LineString(mls.0.remove(0))
        }
        Geometry::MultiPoint(mut mp) if mp.0.len() == 1 => Geometry::Point(mp.0.remove(0)),
        other => other,
    }
}

fn areal(geometry: &Geometry) -> Option<MultiPolygon> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

fn lineal(geometry: &Geometry) -> Option<MultiLineString> {
    match geometry {
        Geometry::Line(l) => Some(MultiLineString::new(vec![line_string(l)])),
        Geometry::LineString(ls) => Some(MultiLineString::new(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Some(mls.clone()),
        _ => None,
    }
}

fn line_string(line: &Line) -> LineString {
    LineString::from(vec![line.start, line.end])
}

fn puntal(geometry: &Geometry) -> Option<MultiPoint> {
    match geometry {
        Geometry::Point(p) => Some(MultiPoint::new(vec![*p])),
        Geometry::MultiPoint(mp) => Some(mp.clone()),
        _ => None,
    }
}

/// Geometry type name as used in WKT
pub fn geometry_type_name(geometry: &Geometry) -> &'static str {
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
