//! Convert command implementation

use crate::cli::ConvertArgs;
use crate::output::{OutputWriter, Report};
use crate::output_types::ConvertOutput;
use anyhow::{Context, Result};
use meridian_core::config::LayeredConfig;
use meridian_geo::make_transform;

pub fn execute(args: ConvertArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let transform = make_transform(&args.from, &args.to, config.crs_lookup.value)
        .context("Failed to build coordinate transform")?;
    let converted = transform.convert((args.x, args.y))?;

    let result = ConvertOutput {
        from_crs: args.from.to_string(),
        to_crs: args.to.to_string(),
        input: (args.x, args.y),
        output: converted,
    };

    let mut report = Report::new("Converted coordinates")
        .coords(&result.from_crs, result.input)
        .coords(&result.to_crs, result.output);
    if transform.is_identity() {
        report = report.info("Both CRS resolve to the same definition; coordinates are unchanged");
    }

    output.emit(&result, report)
}
