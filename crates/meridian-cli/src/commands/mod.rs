//! Command implementations

mod config;
mod convert;
mod distance;
mod inspect;
mod normalize;

use crate::cli::{Cli, Commands, GeometryInput, InputFormat};
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use meridian_core::config::{CliConfigOverrides, LayeredConfig};
use meridian_core::models::ValidityMode;
use meridian_geo::{GeoJsonInput, Geom, GeomSource};
use std::fs;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let base_overrides = CliConfigOverrides {
        crs_lookup: cli.crs_lookup.map(Into::into),
        ..Default::default()
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Distance(args) => {
            let config = load_config_with_overrides(config_path, base_overrides)?;
            distance::execute(args, &config, output)
        }
        Commands::Convert(args) => {
            let config = load_config_with_overrides(config_path, base_overrides)?;
            convert::execute(args, &config, output)
        }
        Commands::Normalize(args) => {
            let config = load_config_with_overrides(
                config_path,
                geometry_overrides(&args.geometry, base_overrides),
            )?;
            normalize::execute(args, &config, output)
        }
        Commands::Inspect(args) => {
            let config = load_config_with_overrides(
                config_path,
                geometry_overrides(&args.geometry, base_overrides),
            )?;
            inspect::execute(args, &config, output)
        }
        Commands::Config => {
            let config = load_config_with_overrides(config_path, base_overrides)?;
            config::execute(&config, output)
        }
    }
}

fn geometry_overrides(input: &GeometryInput, base: CliConfigOverrides) -> CliConfigOverrides {
    CliConfigOverrides {
        crs: input.crs.clone(),
        geometry_validity: input.no_validity.then_some(ValidityMode::Disabled),
        fix_antimeridian: input.no_fix.then_some(false),
        ..base
    }
}

/// Guess the format of a file from its extension
fn format_from_extension(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "geojson" | "json" => Some(InputFormat::Geojson),
        "gml" | "xml" => Some(InputFormat::Gml),
        "wkt" | "txt" => Some(InputFormat::Wkt),
        _ => None,
    }
}

/// Guess the format of geometry text from its first character
fn format_from_content(text: &str) -> InputFormat {
    match text.trim_start().chars().next() {
        Some('{') => InputFormat::Geojson,
        Some('<') => InputFormat::Gml,
        _ => InputFormat::Wkt,
    }
}

/// Turn a command-line geometry argument into a construction source
fn geometry_source(input: &GeometryInput) -> Result<GeomSource> {
    let path = Path::new(&input.input);

    if path.is_file() {
        let format = match input.format.or_else(|| format_from_extension(path)) {
            Some(format) => format,
            None => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                format_from_content(&text)
            }
        };

        tracing::debug!(path = %path.display(), ?format, "reading geometry file");
        let source = match format {
            InputFormat::Geojson => GeomSource::GeoJson(GeoJsonInput::Path(path.to_path_buf())),
            InputFormat::Wkt => GeomSource::Wkt(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            ),
            InputFormat::Gml => GeomSource::Gml(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            ),
        };
        return Ok(source);
    }

    let text = input.input.clone();
    let source = match input.format.unwrap_or_else(|| format_from_content(&text)) {
        InputFormat::Geojson => GeomSource::GeoJson(GeoJsonInput::detect(&text)),
        InputFormat::Wkt => GeomSource::Wkt(text),
        InputFormat::Gml => GeomSource::Gml(text),
    };
    Ok(source)
}

/// Build a geometry from a command-line argument using the effective configuration
fn load_geom(input: &GeometryInput, config: &LayeredConfig) -> Result<Geom> {
    let source = geometry_source(input)?;
    Geom::new(source, config.geom_options()).context("Failed to build geometry")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> GeometryInput {
        GeometryInput {
            input: text.to_string(),
            format: None,
            crs: None,
            no_fix: false,
            no_validity: false,
        }
    }

    #[test]
    fn test_format_from_content() {
        assert_eq!(format_from_content(r#"{"type":"Point"}"#), InputFormat::Geojson);
        assert_eq!(format_from_content("  <gml:Point/>"), InputFormat::Gml);
        assert_eq!(format_from_content("POINT (1 2)"), InputFormat::Wkt);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_from_extension(Path::new("a/b.GeoJSON")), Some(InputFormat::Geojson));
        assert_eq!(format_from_extension(Path::new("shape.gml")), Some(InputFormat::Gml));
        assert_eq!(format_from_extension(Path::new("shape.shp")), None);
    }

    #[test]
    fn test_literal_wkt_source() {
        let source = geometry_source(&input("POINT (1 2)")).unwrap();
        assert_eq!(source, GeomSource::Wkt("POINT (1 2)".to_string()));
    }

    #[test]
    fn test_file_source_uses_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ring.wkt");
        fs::write(&path, "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();

        let source = geometry_source(&input(path.to_str().unwrap())).unwrap();
        assert!(matches!(source, GeomSource::Wkt(ref wkt) if wkt.starts_with("POLYGON")));
    }

    #[test]
    fn test_overrides_from_flags() {
        let mut args = input("POINT (1 2)");
        args.no_fix = true;
        args.no_validity = true;

        let overrides = geometry_overrides(&args, CliConfigOverrides::default());
        assert_eq!(overrides.fix_antimeridian, Some(false));
        assert_eq!(overrides.geometry_validity, Some(ValidityMode::Disabled));
        assert!(overrides.crs.is_none());
    }
}
