//! Antimeridian normalization.
//!
//! A geometry given in geographic degrees whose envelope reaches both below -90° and
//! above +90° longitude is taken to wrap the ±180° meridian. Negative longitudes are
//! shifted by +360 and the result is cut into the parts east and west of the 180°
//! meridian, each kept a small buffer away from the seam.

use crate::engine;
use geo::{Geometry, HasDimensions, MapCoordsInPlace, MultiPolygon, Rect};
use meridian_core::error::{MeridianError, Result};

/// Gap kept on either side of the 180° meridian, in degrees
pub const SEAM_BUFFER: f64 = 0.001;

/// Envelope extends beyond both -90° and +90°
pub fn crosses_antimeridian(geometry: &Geometry) -> bool {
    match engine::envelope(geometry) {
        Some(rect) => rect.min().x < -90.0 && rect.max().x > 90.0,
        None => false,
    }
}

/// Add 360 to every negative longitude
pub fn shift_longitudes(geometry: &mut Geometry) {
    geometry.map_coords_in_place(|mut c| {
        if c.x < 0.0 {
            c.x += 360.0;
        }
        c
    });
}

/// Region east of the seam once longitudes have been shifted into [0, 360)
pub fn east_half() -> MultiPolygon {
    MultiPolygon::new(vec![Rect::new((180.0 + SEAM_BUFFER, -90.0), (360.0, 90.0)).to_polygon()])
}

/// Region west of the seam
pub fn west_half() -> MultiPolygon {
    MultiPolygon::new(vec![Rect::new((0.0, -90.0), (180.0 - SEAM_BUFFER, 90.0)).to_polygon()])
}

/// Split a geometry that wraps the antimeridian; anything else is returned unchanged.
///
/// Fails with `NoGeometry` when both halves come out empty.
pub fn normalize(geometry: Geometry) -> Result<Geometry> {
    if !crosses_antimeridian(&geometry) {
        return Ok(geometry);
    }

    let mut shifted = geometry;
    shift_longitudes(&mut shifted);

    let east = engine::intersection(&shifted, &Geometry::MultiPolygon(east_half()))?;
    let west = engine::intersection(&shifted, &Geometry::MultiPolygon(west_half()))?;

    tracing::debug!(
        geometry = engine::geometry_type_name(&shifted),
        east_empty = east.is_empty(),
        west_empty = west.is_empty(),
        "split geometry at the antimeridian"
    );

    match (east.is_empty(), west.is_empty()) {
        (false, false) => Ok(engine::union(&east, &west)),
        (false, true) => Ok(east),
        (true, false) => Ok(west),
        (true, true) => Err(MeridianError::no_geometry(
            "geometry is empty after antimeridian normalization",
        )),
    }
}
