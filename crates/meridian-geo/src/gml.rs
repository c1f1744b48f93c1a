//! GML geometry reader.
//!
//! Covers the GML 2 and GML 3 simple-feature encodings: `Point`, `LineString`,
//! `LinearRing`, `Polygon`, `Envelope`/`Box` and their multi variants. Coordinates are
//! read as `x y` in document order; `srsName` is not interpreted.

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon, Rect,
};
use meridian_core::error::{MeridianError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All descendants called `name`, without descending into matches
    fn descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            } else {
                child.descendants(name, found);
            }
        }
    }

    fn first_descendant(&self, name: &str) -> Option<&Element> {
        let mut found = Vec::new();
        self.descendants(name, &mut found);
        found.into_iter().next()
    }
}

/// Parse a GML fragment into a geometry
pub fn parse_gml(text: &str) -> Result<Geometry> {
    let root = parse_tree(text)?;
    let geometry = convert(&root, 2)?
        .ok_or_else(|| MeridianError::no_geometry("GML document contains no geometry"))?;

    tracing::trace!(root = %root.name, "parsed GML geometry");
    Ok(geometry)
}

fn malformed(reason: impl std::fmt::Display) -> MeridianError {
    MeridianError::no_geometry(format!("Failed to parse GML: {}", reason))
}

fn parse_tree(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(open_element(&start)?),
            Ok(Event::Empty(start)) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(malformed)?;
                if let Some(current) = stack.last_mut() {
                    if !current.text.is_empty() {
                        current.text.push(' ');
                    }
                    current.text.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e)),
        }
    }

    if !stack.is_empty() {
        return Err(malformed("unexpected end of document"));
    }
    root.ok_or_else(|| MeridianError::no_geometry("GML document is empty"))
}

fn open_element(start: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attrs = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        attrs.push((key, value));
    }

    Ok(Element { name, attrs, ..Default::default() })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn dimension(element: &Element, inherited: usize) -> usize {
    element.attr("srsDimension").and_then(|d| d.parse().ok()).unwrap_or(inherited)
}

fn convert(element: &Element, dim: usize) -> Result<Option<Geometry>> {
    let dim = dimension(element, dim);

    let geometry = match element.name.as_str() {
        "Point" => Geometry::Point(point(element, dim)?),
        "LineString" | "LinearRing" => Geometry::LineString(line(element, dim)?),
        "Polygon" => Geometry::Polygon(polygon(element, dim)?),
        "Envelope" | "Box" => Geometry::Polygon(envelope(element, dim)?),
        "MultiPoint" => {
            let points = members(element, "Point", dim, point)?;
            Geometry::MultiPoint(MultiPoint::new(points))
        }
        "MultiLineString" | "MultiCurve" => {
            let lines = members(element, "LineString", dim, line)?;
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        "MultiPolygon" | "MultiSurface" => {
            let polygons = members(element, "Polygon", dim, polygon)?;
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
        "MultiGeometry" => {
            let mut parts = Vec::new();
            for member in &element.children {
                for child in &member.children {
                    if let Some(geometry) = convert(child, dim)? {
                        parts.push(geometry);
                    }
                }
            }
            if parts.is_empty() {
                return Ok(None);
            }
            Geometry::GeometryCollection(GeometryCollection(parts))
        }
        // Wrappers such as featureMember or geometryProperty
        _ => {
            for child in &element.children {
                if let Some(geometry) = convert(child, dim)? {
                    return Ok(Some(geometry));
                }
            }
            return Ok(None);
        }
    };

    Ok(Some(geometry))
}

fn members<T>(
    element: &Element,
    name: &str,
    dim: usize,
    build: fn(&Element, usize) -> Result<T>,
) -> Result<Vec<T>> {
    let mut found = Vec::new();
    element.descendants(name, &mut found);
    found.into_iter().map(|member| build(member, dimension(member, dim))).collect()
}

fn point(element: &Element, dim: usize) -> Result<Point> {
    coords(element, dim)?
        .into_iter()
        .next()
        .map(Point::from)
        .ok_or_else(|| MeridianError::no_geometry("GML Point has no coordinates"))
}

fn line(element: &Element, dim: usize) -> Result<LineString> {
    let coords = coords(element, dim)?;
    if coords.is_empty() {
        return Err(MeridianError::no_geometry(format!("GML {} has no coordinates", element.name)));
    }
    Ok(LineString::new(coords))
}

fn ring(boundary: &Element, dim: usize) -> Result<LineString> {
    let ring = boundary
        .first_descendant("LinearRing")
        .ok_or_else(|| MeridianError::no_geometry("GML polygon boundary has no LinearRing"))?;
    line(ring, dimension(ring, dim))
}

fn polygon(element: &Element, dim: usize) -> Result<Polygon> {
    let exterior = element
        .children
        .iter()
        .find(|c| c.name == "exterior" || c.name == "outerBoundaryIs")
        .ok_or_else(|| MeridianError::no_geometry("GML Polygon has no exterior ring"))?;

    let interiors = element
        .children
        .iter()
        .filter(|c| c.name == "interior" || c.name == "innerBoundaryIs")
        .map(|boundary| ring(boundary, dim))
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(ring(exterior, dim)?, interiors))
}

fn envelope(element: &Element, dim: usize) -> Result<Polygon> {
    let corners = match (element.child("lowerCorner"), element.child("upperCorner")) {
        (Some(lower), Some(upper)) => {
            let mut corners = parse_numbers(&lower.text, dim)?;
            corners.extend(parse_numbers(&upper.text, dim)?);
            corners
        }
        _ => coords(element, dim)?,
    };

    match corners.as_slice() {
        [lower, upper, ..] => Ok(Rect::new(*lower, *upper).to_polygon()),
        _ => Err(MeridianError::no_geometry(format!("GML {} needs two corners", element.name))),
    }
}

/// Coordinates held directly by a geometry element, in any of the GML encodings
fn coords(element: &Element, dim: usize) -> Result<Vec<Coord>> {
    let mut out = Vec::new();

    for child in &element.children {
        match child.name.as_str() {
            "posList" => out.extend(parse_numbers(&child.text, dimension(child, dim))?),
            "pos" => out.extend(parse_numbers(&child.text, dimension(child, dim))?.into_iter().take(1)),
            "coordinates" => out.extend(parse_coordinates(child)?),
            "coord" => {
                let x = child.child("X").map(|x| parse_number(&x.text)).transpose()?;
                let y = child.child("Y").map(|y| parse_number(&y.text)).transpose()?;
                match (x, y) {
                    (Some(x), Some(y)) => out.push(Coord { x, y }),
                    _ => return Err(malformed("coord element needs X and Y")),
                }
            }
            "pointProperty" | "pointMember" => {
                if let Some(p) = child.first_descendant("Point") {
                    out.push(point(p, dimension(p, dim))?.0);
                }
            }
            _ => {}
        }
    }

    Ok(out)
}

fn parse_number(text: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| malformed(format!("invalid number '{}'", text.trim())))
}

/// Whitespace-separated ordinates grouped into tuples of `dim`
fn parse_numbers(text: &str, dim: usize) -> Result<Vec<Coord>> {
    let dim = dim.max(2);
    let values = text.split_whitespace().map(parse_number).collect::<Result<Vec<_>>>()?;

    if values.len() % dim != 0 {
        return Err(malformed(format!(
            "{} ordinates do not divide into tuples of {}",
            values.len(),
            dim
        )));
    }

    Ok(values.chunks(dim).map(|c| Coord { x: c[0], y: c[1] }).collect())
}

/// GML 2 `coordinates`: tuples separated by `ts`, ordinates by `cs`
fn parse_coordinates(element: &Element) -> Result<Vec<Coord>> {
    let cs = element.attr("cs").unwrap_or(",");
    let decimal = element.attr("decimal").unwrap_or(".");
    let ts = element.attr("ts").filter(|ts| !ts.trim().is_empty());

    let tuples: Vec<&str> = match ts {
        Some(ts) => element.text.split(ts).collect(),
        None => element.text.split_whitespace().collect(),
    };

    let mut out = Vec::new();
    for tuple in tuples.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
        let values = tuple
            .split(cs)
            .map(|v| parse_number(&v.replace(decimal, ".")))
            .collect::<Result<Vec<_>>>()?;
        match values.as_slice() {
            [x, y, ..] => out.push(Coord { x: *x, y: *y }),
            _ => return Err(malformed(format!("coordinate tuple '{}' needs two ordinates", tuple))),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gml3_point() {
        let gml = r#"<gml:Point xmlns:gml="http://www.opengis.net/gml"><gml:pos>115.2 -8.6</gml:pos></gml:Point>"#;
        assert_eq!(parse_gml(gml).unwrap(), Geometry::Point(Point::new(115.2, -8.6)));
    }

    #[test]
    fn test_gml2_coordinates_polygon() {
        let gml = r#"
            <gml:Polygon xmlns:gml="http://www.opengis.net/gml">
              <gml:outerBoundaryIs>
                <gml:LinearRing>
                  <gml:coordinates>0,0 10,0 10,10 0,10 0,0</gml:coordinates>
                </gml:LinearRing>
              </gml:outerBoundaryIs>
              <gml:innerBoundaryIs>
                <gml:LinearRing>
                  <gml:coordinates>2,2 4,2 4,4 2,2</gml:coordinates>
                </gml:LinearRing>
              </gml:innerBoundaryIs>
            </gml:Polygon>"#;

        match parse_gml(gml).unwrap() {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("Expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_gml3_poslist_with_dimension() {
        let gml = r#"
            <gml:LineString xmlns:gml="http://www.opengis.net/gml" srsDimension="3">
              <gml:posList>0 0 5 1 1 5 2 0 5</gml:posList>
            </gml:LineString>"#;

        assert_eq!(
            parse_gml(gml).unwrap(),
            Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))
        );
    }

    #[test]
    fn test_multi_surface() {
        let gml = r#"
            <gml:MultiSurface xmlns:gml="http://www.opengis.net/gml">
              <gml:surfaceMember>
                <gml:Polygon><gml:exterior><gml:LinearRing>
                  <gml:posList>0 0 1 0 1 1 0 0</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon>
              </gml:surfaceMember>
              <gml:surfaceMember>
                <gml:Polygon><gml:exterior><gml:LinearRing>
                  <gml:posList>5 5 6 5 6 6 5 5</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon>
              </gml:surfaceMember>
            </gml:MultiSurface>"#;

        match parse_gml(gml).unwrap() {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope() {
        let gml = r#"<gml:Envelope xmlns:gml="http://www.opengis.net/gml"><gml:lowerCorner>0 0</gml:lowerCorner><gml:upperCorner>2 3</gml:upperCorner></gml:Envelope>"#;
        let geometry = parse_gml(gml).unwrap();
        assert!((crate::engine::area(&geometry) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_geometry_inside_feature_wrapper() {
        let gml = r#"<wfs:member xmlns:wfs="w" xmlns:gml="g"><app:site xmlns:app="a"><app:location><gml:Point><gml:pos>1 2</gml:pos></gml:Point></app:location></app:site></wfs:member>"#;
        assert_eq!(parse_gml(gml).unwrap(), Geometry::Point(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_malformed_and_empty_documents() {
        assert!(matches!(parse_gml("<gml:Point><gml:pos>1 2"), Err(MeridianError::NoGeometry { .. })));
        assert!(matches!(parse_gml("<root><child/></root>"), Err(MeridianError::NoGeometry { .. })));
        assert!(matches!(
            parse_gml("<gml:Point><gml:pos>1 abc</gml:pos></gml:Point>"),
            Err(MeridianError::NoGeometry { .. })
        ));
    }
}
