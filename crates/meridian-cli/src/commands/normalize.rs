//! Normalize command implementation

use super::load_geom;
use crate::cli::NormalizeArgs;
use crate::output::{OutputWriter, Report};
use crate::output_types::NormalizeOutput;
use anyhow::{Context, Result};
use meridian_core::config::LayeredConfig;
use meridian_geo::engine::geometry_type_name;

pub fn execute(args: NormalizeArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut geom = load_geom(&args.geometry, config)?;

    if let Some(target) = &args.to {
        geom.to_proj(target)
            .with_context(|| format!("Failed to reproject to {}", target))?;
    }

    if let Some(path) = &args.output {
        geom.save_as_geojson(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let result = NormalizeOutput {
        geometry_type: geometry_type_name(geom.geometry()).to_string(),
        crs: geom.crs().to_string(),
        reprojected_to: args.to.as_ref().map(ToString::to_string),
        wkt: geom.wkt(),
        saved_to: args.output.as_ref().map(|p| p.display().to_string()),
    };

    let mut report = Report::new("Normalized geometry")
        .field("Type", &result.geometry_type)
        .field("CRS", &result.crs)
        .field_opt("Coordinates in", result.reprojected_to.as_ref())
        .field("WKT", &result.wkt);
    if let Some(path) = &result.saved_to {
        report = report.done(format!("Saved GeoJSON to {}", path));
    }

    output.emit(&result, report)
}
