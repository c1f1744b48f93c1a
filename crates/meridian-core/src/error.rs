//! Error types for Meridian

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeridianError {
    // CRS errors
    #[error("Invalid CRS {crs}: {reason}")]
    InvalidCrs { crs: String, reason: String },

    #[error("Coordinate transform failed: {reason}")]
    Transform { reason: String },

    // Geometry errors
    #[error("No geometry: {reason}")]
    NoGeometry { reason: String },

    #[error("Unsupported input: {reason}")]
    UnsupportedInput { reason: String },

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    // File errors
    #[error("Path does not exist: {path}")]
    PathError { path: PathBuf },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MeridianError {
    pub fn no_geometry(reason: impl Into<String>) -> Self {
        Self::NoGeometry { reason: reason.into() }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedInput { reason: reason.into() }
    }

    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, MeridianError>;
