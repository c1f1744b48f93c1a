//! Distance command implementation

use crate::cli::DistanceArgs;
use crate::output::{OutputWriter, Report};
use crate::output_types::DistanceOutput;
use anyhow::{Context, Result};
use meridian_core::config::LayeredConfig;
use meridian_geo::{distance, fast_distance};

pub fn execute(args: DistanceArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let from = (args.lon0, args.lat0);
    let to = (args.lon1, args.lat1);

    let result = if args.fast {
        DistanceOutput {
            from,
            to,
            crs: None,
            distance: fast_distance(from, to),
            unit: "km",
            method: "equirectangular",
        }
    } else {
        let meters = distance(from, to, args.crs.as_ref()).context("Failed to compute distance")?;
        DistanceOutput {
            from,
            to,
            crs: args.crs.as_ref().map(ToString::to_string),
            distance: meters,
            unit: "m",
            method: "haversine",
        }
    };

    tracing::debug!(lookup = ?config.crs_lookup.value, method = result.method, "computed distance");

    let mut report = Report::new("Distance")
        .coords("From", result.from)
        .coords("To", result.to)
        .field_opt("CRS", result.crs.as_ref())
        .field("Distance", format!("{:.3} {}", result.distance, result.unit))
        .field("Method", result.method);
    if args.fast && args.crs.is_some() {
        report = report.warning("--crs is ignored with --fast; both points are read as lon/lat");
    }

    output.emit(&result, report)
}
