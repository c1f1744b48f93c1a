//! Integration tests for building geometries from serialized inputs
//!
//! This test suite verifies that:
//! - GeoJSON is read from values, text and files
//! - Missing GeoJSON files are reported as path errors
//! - WKT and GML inputs produce the same geometry
//! - Geometries written with save_as_geojson read back unchanged

use meridian_core::models::{Crs, GeomOptions};
use meridian_core::MeridianError;
use meridian_geo::{GeoJsonInput, Geom};
use std::fs;
use tempfile::TempDir;

const SQUARE_WKT: &str = "POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0))";

#[test]
fn test_geojson_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("area.geojson");

    let content = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]
                },
                "properties": {"name": "square"}
            }
        ]
    }"#;
    fs::write(&file_path, content).unwrap();

    let input = GeoJsonInput::detect(file_path.to_str().unwrap());
    let geom = Geom::from_geojson(input, GeomOptions::default()).unwrap();

    assert!((geom.area() - 4.0).abs() < 1e-12);
}

#[test]
fn test_missing_geojson_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.geojson");

    let err = Geom::from_geojson(GeoJsonInput::Path(missing.clone()), GeomOptions::default())
        .unwrap_err();

    match err {
        MeridianError::PathError { path } => assert_eq!(path, missing),
        other => panic!("Expected PathError, got {:?}", other),
    }
}

#[test]
fn test_empty_feature_collection() {
    let input = GeoJsonInput::Text(r#"{"type":"FeatureCollection","features":[]}"#.to_string());
    let err = Geom::from_geojson(input, GeomOptions::default()).unwrap_err();
    assert!(matches!(err, MeridianError::NoGeometry { .. }));
}

#[test]
fn test_wkt_and_gml_agree() {
    let gml = r#"
        <gml:Polygon xmlns:gml="http://www.opengis.net/gml/3.2">
          <gml:exterior>
            <gml:LinearRing>
              <gml:posList>0 0 2 0 2 2 0 2 0 0</gml:posList>
            </gml:LinearRing>
          </gml:exterior>
        </gml:Polygon>"#;

    let from_gml = Geom::from_gml(gml, GeomOptions::default()).unwrap();
    let from_wkt = Geom::from_wkt(SQUARE_WKT, GeomOptions::default()).unwrap();

    assert_eq!(from_gml.wkt(), from_wkt.wkt());
}

#[test]
fn test_save_as_geojson_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("out.geojson");

    // Existing content is replaced
    fs::write(&file_path, "stale").unwrap();

    let geom = Geom::from_wkt(SQUARE_WKT, GeomOptions::default()).unwrap();
    geom.save_as_geojson(&file_path).unwrap();

    let reread = Geom::from_geojson(GeoJsonInput::Path(file_path), GeomOptions::default()).unwrap();
    assert_eq!(reread.wkt(), geom.wkt());
}

#[test]
fn test_geojson_from_projected_crs() {
    let input = GeoJsonInput::Text(
        r#"{"type":"Point","coordinates":[111319.49079327357, 0.0]}"#.to_string(),
    );
    let mut geom = Geom::from_geojson(input, GeomOptions::new(3857)).unwrap();
    geom.to_proj(&Crs::wgs84()).unwrap();

    let (lon, lat) = geom.coords().unwrap();
    assert!((lon - 1.0).abs() < 1e-9);
    assert!(lat.abs() < 1e-9);
}
