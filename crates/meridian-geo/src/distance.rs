//! Point-to-point distances on geographic coordinates.

use crate::geom::Geom;
use meridian_core::error::Result;
use meridian_core::models::{Crs, GeomOptions};

/// Spherical Earth radius used by the haversine formula, in metres
pub const EARTH_RADIUS_M: f64 = 6_372_800.0;

/// Length of one degree of latitude, in kilometres
pub const KM_PER_DEGREE: f64 = 111.0;

/// Equirectangular approximation in kilometres.
///
/// Longitude differences are scaled by the cosine of the mean latitude. Good enough for
/// short distances away from the poles.
pub fn fast_distance(p0: (f64, f64), p1: (f64, f64)) -> f64 {
    let (lon0, lat0) = p0;
    let (lon1, lat1) = p1;

    let dx = (lon1 - lon0).abs() * KM_PER_DEGREE * ((lat0 + lat1) / 2.0).to_radians().cos();
    let dy = (lat1 - lat0).abs() * KM_PER_DEGREE;

    (dx * dx + dy * dy).sqrt()
}

/// Great-circle distance in metres between two (lon, lat) pairs
pub fn haversine(p0: (f64, f64), p1: (f64, f64)) -> f64 {
    let (lon0, lat0) = p0;
    let (lon1, lat1) = p1;

    let phi0 = lat0.to_radians();
    let phi1 = lat1.to_radians();
    let dphi = (lat1 - lat0).to_radians();
    let dlambda = (lon1 - lon0).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi0.cos() * phi1.cos() * (dlambda / 2.0).sin().powi(2);
    // rounding can push antipodal points just past 1
    let a = a.min(1.0);

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance in metres.
///
/// With `crs`, `p0` is given in that CRS and reprojected to EPSG:4326 first; `p1` is
/// always geographic.
pub fn distance(p0: (f64, f64), p1: (f64, f64), crs: Option<&Crs>) -> Result<f64> {
    let p0 = match crs {
        Some(crs) => {
            let mut point = Geom::point(p0, GeomOptions::new(crs.clone()))?;
            point.to_proj(&Crs::wgs84())?;
            point.coords()?
        }
        None => p0,
    };

    Ok(haversine(p0, p1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PARIS: (f64, f64) = (2.3522, 48.8566);
    const NEW_YORK: (f64, f64) = (-74.0060, 40.7128);

    #[test]
    fn test_paris_new_york() {
        let meters = distance(PARIS, NEW_YORK, None).unwrap();
        assert!((meters - 5_837_000.0).abs() < 58_370.0, "got {}", meters);

        let km = fast_distance(PARIS, NEW_YORK);
        assert!(km > 5_000.0 && km < 7_000.0, "got {}", km);
    }

    #[test]
    fn test_zero_distance() {
        assert_eq!(fast_distance(PARIS, PARIS), 0.0);
        assert_eq!(distance(PARIS, PARIS, None).unwrap(), 0.0);
    }

    #[test]
    fn test_antipodal_points() {
        let meters = haversine((0.0, 0.0), (180.0, 0.0));
        assert!((meters - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-3);
    }

    #[test]
    fn test_projected_origin() {
        let paris_mercator = crate::geom::convert_coords(PARIS, &Crs::wgs84(), &Crs::web_mercator())
            .unwrap();

        let projected = distance(paris_mercator, NEW_YORK, Some(&Crs::web_mercator())).unwrap();
        let geographic = distance(PARIS, NEW_YORK, None).unwrap();
        assert!((projected - geographic).abs() < 1.0);
    }

    #[test]
    fn test_invalid_crs() {
        assert!(distance(PARIS, NEW_YORK, Some(&Crs::Epsg(999_999))).is_err());
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric_and_non_negative(
            lon0 in -180.0f64..180.0, lat0 in -90.0f64..90.0,
            lon1 in -180.0f64..180.0, lat1 in -90.0f64..90.0,
        ) {
            let d01 = haversine((lon0, lat0), (lon1, lat1));
            let d10 = haversine((lon1, lat1), (lon0, lat0));

            prop_assert!(d01 >= 0.0);
            prop_assert!((d01 - d10).abs() < 1e-6);
            prop_assert!(fast_distance((lon0, lat0), (lon1, lat1)) >= 0.0);
        }

        #[test]
        fn prop_distance_to_self_is_zero(lon in -180.0f64..180.0, lat in -90.0f64..90.0) {
            prop_assert_eq!(haversine((lon, lat), (lon, lat)), 0.0);
            prop_assert_eq!(fast_distance((lon, lat), (lon, lat)), 0.0);
        }
    }
}
