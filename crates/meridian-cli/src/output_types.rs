use meridian_core::models::Limits;
use serde::Serialize;

/// Output for distance command
#[derive(Debug, Serialize)]
pub struct DistanceOutput {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub crs: Option<String>,
    pub distance: f64,
    pub unit: &'static str,
    pub method: &'static str,
}

/// Output for convert command
#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub from_crs: String,
    pub to_crs: String,
    pub input: (f64, f64),
    pub output: (f64, f64),
}

/// Output for normalize command
#[derive(Debug, Serialize)]
pub struct NormalizeOutput {
    pub geometry_type: String,
    pub crs: String,
    pub reprojected_to: Option<String>,
    pub wkt: String,
    pub saved_to: Option<String>,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub geometry_type: String,
    pub crs: String,
    pub valid: bool,
    pub area: f64,
    pub limits: Option<Limits>,
    pub crosses_antimeridian: bool,
    pub wkt: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub crs: ConfigValue<String>,
    pub geometry_validity: ConfigValue<String>,
    pub fix_antimeridian: ConfigValue<String>,
    pub crs_lookup: ConfigValue<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: String,
}
