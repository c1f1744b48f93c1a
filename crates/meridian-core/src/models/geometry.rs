//! Geometry-side value types shared across meridian crates.

use crate::models::crs::{Crs, CrsLookup};
use serde::{Deserialize, Serialize};

/// Geometry validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidityMode {
    /// Reject geometries that fail the validity predicate
    #[default]
    Strict,
    /// Skip the validity check entirely
    Disabled,
}

impl ValidityMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ValidityMode::Strict)
    }
}

/// Axis-aligned bounding box of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Limits {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Options applied while constructing a geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomOptions {
    /// CRS the input coordinates are expressed in
    pub crs: Crs,
    pub validity: ValidityMode,
    /// Split geometries that wrap around the ±180° meridian
    pub fix_antimeridian: bool,
    pub lookup: CrsLookup,
}

impl Default for GeomOptions {
    fn default() -> Self {
        Self {
            crs: Crs::wgs84(),
            validity: ValidityMode::Strict,
            fix_antimeridian: true,
            lookup: CrsLookup::Registry,
        }
    }
}

impl GeomOptions {
    /// Default options for coordinates in `crs`
    pub fn new(crs: impl Into<Crs>) -> Self {
        Self { crs: crs.into(), ..Default::default() }
    }

    /// Set the validity mode
    pub fn validity(mut self, validity: ValidityMode) -> Self {
        self.validity = validity;
        self
    }

    /// Enable or disable antimeridian fixing
    pub fn fix_antimeridian(mut self, fix: bool) -> Self {
        self.fix_antimeridian = fix;
        self
    }

    /// Set the CRS lookup strategy
    pub fn lookup(mut self, lookup: CrsLookup) -> Self {
        self.lookup = lookup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = GeomOptions::default();
        assert_eq!(options.crs, Crs::wgs84());
        assert_eq!(options.validity, ValidityMode::Strict);
        assert!(options.fix_antimeridian);
        assert_eq!(options.lookup, CrsLookup::Registry);
    }

    #[test]
    fn test_options_builder() {
        let options = GeomOptions::new(3857)
            .validity(ValidityMode::Disabled)
            .fix_antimeridian(false)
            .lookup(CrsLookup::Builtin);

        assert_eq!(options.crs.epsg(), Some(3857));
        assert!(!options.validity.is_enabled());
        assert!(!options.fix_antimeridian);
        assert_eq!(options.lookup, CrsLookup::Builtin);
    }

    #[test]
    fn test_limits_serialization() {
        let limits = Limits::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(limits.width(), 20.0);
        assert_eq!(limits.height(), 10.0);

        let json = serde_json::to_value(limits).unwrap();
        assert_eq!(json["x0"], -10.0);
        assert_eq!(json["y1"], 5.0);
    }
}
