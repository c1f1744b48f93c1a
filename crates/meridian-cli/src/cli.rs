use clap::{Parser, Subcommand, ValueEnum};
use meridian_core::models::{Crs, CrsLookup};
use std::path::PathBuf;

/// Meridian - Geometry normalization and reprojection
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(about = "Antimeridian-safe geometry handling and reprojection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How numeric CRS codes are resolved
    #[arg(long, global = true, value_enum)]
    pub crs_lookup: Option<LookupArg>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CRS lookup selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LookupArg {
    /// Resolve codes through the PROJ registry
    Registry,
    /// Prefer built-in parameter strings where available
    Builtin,
}

impl From<LookupArg> for CrsLookup {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::Registry => CrsLookup::Registry,
            LookupArg::Builtin => CrsLookup::Builtin,
        }
    }
}

/// Serialized geometry format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Wkt,
    Geojson,
    Gml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Distance between two points
    Distance(DistanceArgs),

    /// Reproject a single coordinate pair
    Convert(ConvertArgs),

    /// Build a geometry and print its normalized form
    Normalize(NormalizeArgs),

    /// Show metrics of a geometry
    Inspect(InspectArgs),

    /// Show the effective configuration
    Config,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct DistanceArgs {
    /// Longitude (or easting, with --crs) of the first point
    pub lon0: f64,
    /// Latitude (or northing, with --crs) of the first point
    pub lat0: f64,
    /// Longitude of the second point
    pub lon1: f64,
    /// Latitude of the second point
    pub lat1: f64,

    /// CRS of the first point (e.g. 3857 or "+proj=utm +zone=50 +south")
    #[arg(long)]
    pub crs: Option<Crs>,

    /// Equirectangular approximation in kilometres instead of great-circle metres
    #[arg(long)]
    pub fast: bool,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct ConvertArgs {
    pub x: f64,
    pub y: f64,

    /// Source CRS
    #[arg(long)]
    pub from: Crs,

    /// Target CRS
    #[arg(long)]
    pub to: Crs,
}

/// Geometry input shared by normalize and inspect
#[derive(Parser, Debug)]
pub struct GeometryInput {
    /// Geometry text (WKT, GeoJSON, GML) or a path to a file holding it
    pub input: String,

    /// Input format (detected from the file extension or content when omitted)
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// CRS of the input coordinates
    #[arg(long)]
    pub crs: Option<Crs>,

    /// Keep geometries that wrap the antimeridian as they are
    #[arg(long)]
    pub no_fix: bool,

    /// Skip the geometry validity check
    #[arg(long)]
    pub no_validity: bool,
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub geometry: GeometryInput,

    /// Reproject the result into this CRS
    #[arg(long)]
    pub to: Option<Crs>,

    /// Write the result as GeoJSON to this path
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub geometry: GeometryInput,
}
