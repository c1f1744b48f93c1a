//! Meridian Geo - Geometry construction, antimeridian handling and reprojection
//!
//! This crate builds geometries from coordinates, WKT, GeoJSON and GML, keeps them
//! consistent across the ±180° meridian, and reprojects them between CRSs.

pub mod antimeridian;
pub mod distance;
pub mod engine;
pub mod geom;
pub mod gml;
pub mod resolver;
pub mod validation;

pub use distance::{distance, fast_distance, haversine};
pub use geom::{
    convert_coords, project_points, GeoJsonInput, Geom, GeomBuilder, GeomSource, RingData,
};
pub use resolver::{make_transform, resolve, CrsDefinition, Transform};
