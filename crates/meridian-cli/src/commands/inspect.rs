//! Inspect command implementation

use super::load_geom;
use crate::cli::InspectArgs;
use crate::output::{OutputWriter, Report};
use crate::output_types::InspectOutput;
use anyhow::Result;
use meridian_core::config::LayeredConfig;
use meridian_geo::antimeridian::crosses_antimeridian;
use meridian_geo::engine::geometry_type_name;

pub fn execute(args: InspectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let geom = load_geom(&args.geometry, config)?;

    let result = InspectOutput {
        geometry_type: geometry_type_name(geom.geometry()).to_string(),
        crs: geom.crs().to_string(),
        valid: geom.is_valid(),
        area: geom.area(),
        limits: geom.limits(),
        crosses_antimeridian: crosses_antimeridian(geom.geometry()),
        wkt: geom.wkt(),
    };

    let mut report = Report::new("Geometry")
        .field("Type", &result.geometry_type)
        .field("CRS", &result.crs)
        .field("Area", format!("{:.6}", result.area))
        .field_opt(
            "Limits",
            result.limits.as_ref().map(|l| format!("x {} .. {}, y {} .. {}", l.x0, l.x1, l.y0, l.y1)),
        )
        .field("WKT", &result.wkt);
    if !result.valid {
        report = report.warning("Geometry is not valid");
    }
    if result.crosses_antimeridian {
        report = report
            .info("Geometry still spans both sides of the antimeridian (use without --no-fix to split it)");
    }

    output.emit(&result, report)
}
