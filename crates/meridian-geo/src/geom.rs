//! The `Geom` value type: one native geometry plus the CRS its coordinates are in.

use crate::antimeridian;
use crate::engine;
use crate::gml;
use crate::resolver::{make_transform, Transform};
use crate::validation::{check_geometry, validate_geometry};
use geo::{Coord, Geometry, LineString, MultiPoint, Point, Polygon};
use meridian_core::error::{MeridianError, Result};
use meridian_core::models::{Crs, CrsLookup, GeomOptions, Limits, ValidityMode};
use std::path::{Path, PathBuf};

/// Coordinates of a polygon's exterior ring
#[derive(Debug, Clone, PartialEq)]
pub enum RingData {
    /// Two rows: all x values, then all y values
    Table(Vec<Vec<f64>>),
    /// Sequence of (x, y) pairs
    Pairs(Vec<(f64, f64)>),
}

impl RingData {
    /// Interpret loosely typed JSON ring data.
    ///
    /// `[[x, y], ...]` is read as pairs, `[[x0, x1, ...], [y0, y1, ...]]` as a table.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let rows = value
            .as_array()
            .ok_or_else(|| MeridianError::unsupported("polygon data must be an array"))?;

        let rows = rows
            .iter()
            .map(|row| {
                row.as_array()
                    .and_then(|cells| cells.iter().map(|c| c.as_f64()).collect::<Option<Vec<_>>>())
                    .ok_or_else(|| {
                        MeridianError::unsupported("polygon data rows must be arrays of numbers")
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if rows.iter().all(|row| row.len() == 2) {
            return Ok(RingData::Pairs(rows.into_iter().map(|r| (r[0], r[1])).collect()));
        }
        Ok(RingData::Table(rows))
    }

    fn into_coords(self) -> Result<Vec<Coord>> {
        match self {
            RingData::Pairs(pairs) => Ok(pairs.into_iter().map(Coord::from).collect()),
            RingData::Table(rows) => match rows.as_slice() {
                [xs, ys] if xs.len() == ys.len() => {
                    Ok(xs.iter().zip(ys).map(|(&x, &y)| Coord { x, y }).collect())
                }
                [xs, ys] => Err(MeridianError::unsupported(format!(
                    "coordinate table rows differ in length ({} vs {})",
                    xs.len(),
                    ys.len()
                ))),
                _ => Err(MeridianError::unsupported(format!(
                    "coordinate table must have 2 rows, found {}",
                    rows.len()
                ))),
            },
        }
    }
}

impl From<Vec<(f64, f64)>> for RingData {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        RingData::Pairs(pairs)
    }
}

/// GeoJSON given as a decoded value, as text, or as a file path
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonInput {
    Value(serde_json::Value),
    Text(String),
    Path(PathBuf),
}

impl GeoJsonInput {
    /// Text starting with `{` is GeoJSON, anything else is a path
    pub fn detect(input: &str) -> Self {
        if input.trim_start().starts_with('{') {
            GeoJsonInput::Text(input.to_string())
        } else {
            GeoJsonInput::Path(PathBuf::from(input))
        }
    }

    fn parse(self) -> Result<Geometry> {
        match self {
            GeoJsonInput::Value(value) => engine::parse_geojson_value(value),
            GeoJsonInput::Text(text) => engine::parse_geojson(&text),
            GeoJsonInput::Path(path) => {
                if !path.exists() {
                    return Err(MeridianError::PathError { path });
                }
                let text = std::fs::read_to_string(&path)?;
                engine::parse_geojson(&text)
            }
        }
    }
}

/// Input a `Geom` is built from
#[derive(Debug, Clone, PartialEq)]
pub enum GeomSource {
    Ring(RingData),
    Point((f64, f64)),
    MultiPoint(Vec<(f64, f64)>),
    GeoJson(GeoJsonInput),
    Wkt(String),
    Gml(String),
    Geometry(Geometry),
}

impl GeomSource {
    /// Point inputs never wrap the antimeridian
    pub fn allows_antimeridian_fix(&self) -> bool {
        !matches!(self, GeomSource::Point(_) | GeomSource::MultiPoint(_))
    }

    fn build(self) -> Result<Geometry> {
        match self {
            GeomSource::Ring(ring) => {
                Ok(Geometry::Polygon(Polygon::new(LineString::new(ring.into_coords()?), vec![])))
            }
            GeomSource::Point(xy) => Ok(Geometry::Point(Point::from(xy))),
            GeomSource::MultiPoint(points) => Ok(Geometry::MultiPoint(MultiPoint::from(points))),
            GeomSource::GeoJson(input) => input.parse(),
            GeomSource::Wkt(text) => engine::parse_wkt(&text),
            GeomSource::Gml(text) => gml::parse_gml(&text),
            GeomSource::Geometry(geometry) => Ok(geometry),
        }
    }
}

/// A 2D geometry tagged with the CRS of its coordinates.
///
/// Always non-empty after construction, split at the antimeridian when fixing is on, and
/// valid unless validity checking was disabled.
#[derive(Debug, Clone)]
pub struct Geom {
    geometry: Geometry,
    crs: Crs,
    lookup: CrsLookup,
    validity: ValidityMode,
}

impl Geom {
    pub fn new(source: GeomSource, options: GeomOptions) -> Result<Self> {
        let fix = options.fix_antimeridian && source.allows_antimeridian_fix();

        // geo geometries are x/y only, so every input is already flat
        let mut geometry = source.build()?;
        if engine::is_empty(&geometry) {
            return Err(MeridianError::no_geometry("input produced an empty geometry"));
        }

        if fix {
            geometry = antimeridian::normalize(geometry)?;
        }

        check_geometry(&geometry, options.validity)?;

        Ok(Self {
            geometry,
            crs: options.crs,
            lookup: options.lookup,
            validity: options.validity,
        })
    }

    pub fn builder() -> GeomBuilder {
        GeomBuilder::default()
    }

    pub fn point(xy: (f64, f64), options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::Point(xy), options)
    }

    pub fn multipoint(points: Vec<(f64, f64)>, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::MultiPoint(points), options)
    }

    pub fn polygon(ring: impl Into<RingData>, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::Ring(ring.into()), options)
    }

    pub fn from_wkt(wkt: &str, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::Wkt(wkt.to_string()), options)
    }

    pub fn from_geojson(input: GeoJsonInput, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::GeoJson(input), options)
    }

    pub fn from_gml(gml: &str, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::Gml(gml.to_string()), options)
    }

    pub fn from_geometry(geometry: Geometry, options: GeomOptions) -> Result<Self> {
        Self::new(GeomSource::Geometry(geometry), options)
    }

    /// CRS the geometry was constructed in. Not updated by `to_proj`.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn into_geometry(self) -> Geometry {
        self.geometry
    }

    /// Reproject coordinates in place from the stored CRS to `target`
    pub fn to_proj(&mut self, target: &Crs) -> Result<()> {
        let transform = make_transform(&self.crs, target, self.lookup)?;
        self.to_proj_with(&transform)
    }

    /// Apply a prebuilt transform in place
    pub fn to_proj_with(&mut self, transform: &Transform) -> Result<()> {
        transform.apply(&mut self.geometry)
    }

    pub fn intersects(&self, other: &Geom) -> bool {
        engine::intersects(&self.geometry, &other.geometry)
    }

    pub fn within(&self, polygon: &Geom) -> bool {
        engine::within(&self.geometry, &polygon.geometry)
    }

    /// Planar area in the units of the current coordinates
    pub fn area(&self) -> f64 {
        engine::area(&self.geometry)
    }

    /// Intersection with `other`, tagged with this geometry's CRS.
    ///
    /// Collections are dissolved first, so overlapping members are counted once.
    pub fn intersection(&self, other: &Geom) -> Result<Geom> {
        Ok(Geom {
            geometry: engine::intersection(&self.geometry, &other.geometry)?,
            crs: self.crs.clone(),
            lookup: self.lookup,
            validity: self.validity,
        })
    }

    /// Percentage of this geometry's area covered by `other`
    pub fn coverage(&self, other: &Geom) -> Result<f64> {
        let area = self.area();
        if area == 0.0 {
            return Err(MeridianError::unsupported(format!(
                "coverage of a {} with zero area",
                engine::geometry_type_name(&self.geometry)
            )));
        }

        let common = engine::intersection(&self.geometry, &other.geometry)?;
        Ok(engine::area(&common) / area * 100.0)
    }

    /// Merge `other` into this geometry, then re-check validity.
    ///
    /// Collection members are flattened and overlapping areas dissolved.
    pub fn add(&mut self, other: &Geom) -> Result<()> {
        self.geometry = engine::union(&self.geometry, &other.geometry);
        check_geometry(&self.geometry, self.validity)
    }

    /// First coordinate of a point or multipoint
    pub fn coords(&self) -> Result<(f64, f64)> {
        self.points().and_then(|points| points.into_iter().next()).ok_or_else(|| {
            MeridianError::unsupported(format!(
                "coords() needs a point geometry, found {}",
                engine::geometry_type_name(&self.geometry)
            ))
        })
    }

    /// All coordinates of a point or multipoint
    pub fn points(&self) -> Option<Vec<(f64, f64)>> {
        engine::point_coords(&self.geometry)
    }

    pub fn is_valid(&self) -> bool {
        validate_geometry(&self.geometry).is_valid
    }

    pub fn wkt(&self) -> String {
        engine::to_wkt(&self.geometry)
    }

    pub fn geojson(&self) -> Result<String> {
        engine::to_geojson(&self.geometry)
    }

    pub fn limits(&self) -> Option<Limits> {
        engine::envelope(&self.geometry)
            .map(|rect| Limits::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Write the GeoJSON serialization to `path`, replacing any existing file
    pub fn save_as_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.geojson()?)?;
        tracing::debug!(path = %path.display(), "saved geometry as GeoJSON");
        Ok(())
    }
}

/// Collects construction inputs; the first present one wins in the order
/// ring, point, points, GeoJSON, WKT, GML, native geometry.
#[derive(Debug, Clone, Default)]
pub struct GeomBuilder {
    ring: Option<RingData>,
    point: Option<(f64, f64)>,
    points: Option<Vec<(f64, f64)>>,
    geojson: Option<GeoJsonInput>,
    wkt: Option<String>,
    gml: Option<String>,
    geometry: Option<Geometry>,
    options: GeomOptions,
}

impl GeomBuilder {
    pub fn ring(mut self, ring: impl Into<RingData>) -> Self {
        self.ring = Some(ring.into());
        self
    }

    pub fn point(mut self, xy: (f64, f64)) -> Self {
        self.point = Some(xy);
        self
    }

    pub fn points(mut self, points: Vec<(f64, f64)>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn geojson(mut self, input: GeoJsonInput) -> Self {
        self.geojson = Some(input);
        self
    }

    pub fn wkt(mut self, wkt: impl Into<String>) -> Self {
        self.wkt = Some(wkt.into());
        self
    }

    pub fn gml(mut self, gml: impl Into<String>) -> Self {
        self.gml = Some(gml.into());
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn options(mut self, options: GeomOptions) -> Self {
        self.options = options;
        self
    }

    pub fn crs(mut self, crs: impl Into<Crs>) -> Self {
        self.options.crs = crs.into();
        self
    }

    pub fn validity(mut self, validity: ValidityMode) -> Self {
        self.options.validity = validity;
        self
    }

    pub fn fix_antimeridian(mut self, fix: bool) -> Self {
        self.options.fix_antimeridian = fix;
        self
    }

    pub fn lookup(mut self, lookup: CrsLookup) -> Self {
        self.options.lookup = lookup;
        self
    }

    /// The input that will be used, if any
    pub fn source(self) -> Option<GeomSource> {
        if let Some(ring) = self.ring {
            return Some(GeomSource::Ring(ring));
        }
        if let Some(xy) = self.point {
            return Some(GeomSource::Point(xy));
        }
        if let Some(points) = self.points {
            return Some(GeomSource::MultiPoint(points));
        }
        if let Some(input) = self.geojson {
            return Some(GeomSource::GeoJson(input));
        }
        if let Some(wkt) = self.wkt {
            return Some(GeomSource::Wkt(wkt));
        }
        if let Some(gml) = self.gml {
            return Some(GeomSource::Gml(gml));
        }
        self.geometry.map(GeomSource::Geometry)
    }

    pub fn build(mut self) -> Result<Geom> {
        let options = std::mem::take(&mut self.options);
        let source =
            self.source().ok_or_else(|| MeridianError::no_geometry("no geometry input given"))?;
        Geom::new(source, options)
    }
}

/// Reproject a single (x, y) pair
pub fn convert_coords(xy: (f64, f64), from: &Crs, to: &Crs) -> Result<(f64, f64)> {
    let mut geom = Geom::point(xy, GeomOptions::new(from.clone()))?;
    geom.to_proj(to)?;
    geom.coords()
}

/// Reproject geographic (lon, lat) pairs into `to`
pub fn project_points(points: &[(f64, f64)], to: &Crs) -> Result<Vec<(f64, f64)>> {
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let mut geom = Geom::multipoint(points.to_vec(), GeomOptions::default())?;
    geom.to_proj(to)?;
    geom.points().ok_or_else(|| MeridianError::no_geometry("projected points were lost"))
}
