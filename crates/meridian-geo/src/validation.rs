use crate::engine::geometry_type_name;
use geo::{Geometry, Validation};
use meridian_core::error::{MeridianError, Result};
use meridian_core::models::ValidityMode;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// First error reason, if any
    pub fn first_reason(&self) -> Option<&str> {
        self.errors.first().map(|e| e.reason.as_str())
    }
}

/// Validate a geometry against the OGC simple-features rules
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let location = geometry_type_name(geometry).to_string();

    for error in geometry.validation_errors() {
        result.add_error(location.clone(), error.to_string());
    }

    result
}

/// Fail with `InvalidGeometry` when validation is enabled and the geometry is invalid
pub fn check_geometry(geometry: &Geometry, mode: ValidityMode) -> Result<()> {
    if !mode.is_enabled() {
        return Ok(());
    }

    let validation = validate_geometry(geometry);
    if validation.is_valid {
        return Ok(());
    }

    tracing::debug!(
        geometry = geometry_type_name(geometry),
        errors = validation.errors.len(),
        "geometry failed validation"
    );
    Err(MeridianError::invalid_geometry(
        validation.first_reason().unwrap_or("Invalid geometry").to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point, Polygon};

    fn bowtie() -> Geometry {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![],
        ))
    }

    #[test]
    fn test_valid_polygon() {
        let square = Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        ));
        let result = validate_geometry(&square);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(check_geometry(&square, ValidityMode::Strict).is_ok());
    }

    #[test]
    fn test_self_intersecting_polygon() {
        let result = validate_geometry(&bowtie());
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].location, "Polygon");

        let err = check_geometry(&bowtie(), ValidityMode::Strict).unwrap_err();
        assert!(matches!(err, MeridianError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_disabled_mode_skips_check() {
        assert!(check_geometry(&bowtie(), ValidityMode::Disabled).is_ok());
    }

    #[test]
    fn test_non_finite_point() {
        let point = Geometry::Point(Point::new(f64::NAN, 1.0));
        assert!(!validate_geometry(&point).is_valid);
    }
}
