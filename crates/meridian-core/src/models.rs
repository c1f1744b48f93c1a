pub mod crs;
pub mod geometry;

pub use crs::{Crs, CrsLookup, WEB_MERCATOR_PROJ};
pub use geometry::{GeomOptions, Limits, ValidityMode};
