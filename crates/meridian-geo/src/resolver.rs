//! CRS resolution and coordinate transforms

use geo::{Coord, Geometry, MapCoordsInPlace};
use meridian_core::error::{MeridianError, Result};
use meridian_core::models::{Crs, CrsLookup};
use proj::Proj;
use std::fmt;

/// A CRS definition the CRS library has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsDefinition(String);

impl CrsDefinition {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrsDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a CRS reference into a definition PROJ can instantiate
pub fn resolve(crs: &Crs, lookup: CrsLookup) -> Result<CrsDefinition> {
    let definition = crs.definition(lookup);
    if definition.is_empty() {
        return Err(MeridianError::InvalidCrs {
            crs: crs.to_string(),
            reason: "empty CRS definition".to_string(),
        });
    }

    Proj::new(&definition).map_err(|e| MeridianError::InvalidCrs {
        crs: crs.to_string(),
        reason: e.to_string(),
    })?;

    tracing::trace!(crs = %crs, definition = %definition, "resolved CRS");
    Ok(CrsDefinition(definition))
}

/// Build a transform between two CRS, both in traditional GIS axis order (x = lon/easting)
pub fn make_transform(from: &Crs, to: &Crs, lookup: CrsLookup) -> Result<Transform> {
    let from_def = resolve(from, lookup)?;
    let to_def = resolve(to, lookup)?;

    // If CRS are the same, no transformation needed
    if from_def == to_def {
        return Ok(Transform { proj: None, from: from_def, to: to_def });
    }

    let proj = Proj::new_known_crs(from_def.as_str(), to_def.as_str(), None).map_err(|e| {
        MeridianError::InvalidCrs {
            crs: format!("{} -> {}", from, to),
            reason: format!("Failed to create projection: {}", e),
        }
    })?;

    Ok(Transform { proj: Some(proj), from: from_def, to: to_def })
}

/// Coordinate transform between two resolved CRS
pub struct Transform {
    proj: Option<Proj>,
    from: CrsDefinition,
    to: CrsDefinition,
}

impl Transform {
    pub fn source(&self) -> &CrsDefinition {
        &self.from
    }

    pub fn target(&self) -> &CrsDefinition {
        &self.to
    }

    /// True when source and target resolve to the same definition
    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    /// Transform a single (x, y) pair
    pub fn convert(&self, point: (f64, f64)) -> Result<(f64, f64)> {
        match &self.proj {
            Some(proj) => proj.convert(point).map_err(|e| MeridianError::Transform {
                reason: format!("({}, {}) from {} to {}: {}", point.0, point.1, self.from, self.to, e),
            }),
            None => Ok(point),
        }
    }

    /// Transform every coordinate of a geometry in place
    pub fn apply(&self, geometry: &mut Geometry) -> Result<()> {
        if self.proj.is_none() {
            return Ok(());
        }

        geometry.try_map_coords_in_place(|coord| {
            self.convert((coord.x, coord.y)).map(|(x, y)| Coord { x, y })
        })
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("identity", &self.is_identity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::models::WEB_MERCATOR_PROJ;

    const EARTH_A: f64 = 6_378_137.0;

    #[test]
    fn test_resolve_registry_code() {
        let definition = resolve(&Crs::wgs84(), CrsLookup::Registry).unwrap();
        assert_eq!(definition.as_str(), "EPSG:4326");
    }

    #[test]
    fn test_resolve_builtin_web_mercator() {
        let definition = resolve(&Crs::web_mercator(), CrsLookup::Builtin).unwrap();
        assert!(definition.as_str().starts_with("+proj=merc"));
    }

    #[test]
    fn test_resolve_invalid_crs() {
        let result = resolve(&Crs::from("+proj=notaprojection"), CrsLookup::Registry);
        assert!(matches!(result, Err(MeridianError::InvalidCrs { .. })));

        let result = resolve(&Crs::Epsg(999_999), CrsLookup::Registry);
        assert!(matches!(result, Err(MeridianError::InvalidCrs { .. })));
    }

    #[test]
    fn test_identity_transform() {
        let transform =
            make_transform(&Crs::wgs84(), &Crs::from("EPSG:4326"), CrsLookup::Registry).unwrap();
        assert!(transform.is_identity());
        assert_eq!(transform.convert((12.5, -3.25)).unwrap(), (12.5, -3.25));
    }

    #[test]
    fn test_traditional_axis_order() {
        // EPSG:4326 is lat/lon in the registry; the transform must still take lon first
        let transform =
            make_transform(&Crs::wgs84(), &Crs::web_mercator(), CrsLookup::Registry).unwrap();
        let (x, y) = transform.convert((10.0, 0.0)).unwrap();

        assert!((x - EARTH_A * 10f64.to_radians()).abs() < 1e-3);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_builtin_and_registry_mercator_agree() {
        let registry =
            make_transform(&Crs::wgs84(), &Crs::web_mercator(), CrsLookup::Registry).unwrap();
        let builtin =
            make_transform(&Crs::wgs84(), &Crs::web_mercator(), CrsLookup::Builtin).unwrap();
        assert!(builtin.target().as_str().starts_with(WEB_MERCATOR_PROJ));

        let a = registry.convert((-73.9857, 40.7484)).unwrap();
        let b = builtin.convert((-73.9857, 40.7484)).unwrap();
        assert!((a.0 - b.0).abs() < 1e-3);
        assert!((a.1 - b.1).abs() < 1e-3);
    }

    #[test]
    fn test_apply_to_geometry() {
        let transform =
            make_transform(&Crs::wgs84(), &Crs::web_mercator(), CrsLookup::Registry).unwrap();
        let mut geometry = Geometry::LineString(geo::LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]));

        transform.apply(&mut geometry).unwrap();

        if let Geometry::LineString(ls) = geometry {
            assert!(ls.0[0].x.abs() < 1e-6);
            assert!((ls.0[1].x - EARTH_A * 1f64.to_radians()).abs() < 1e-3);
        } else {
            panic!("Expected LineString geometry");
        }
    }
}
