//! Meridian Core - Shared models, errors and configuration
//!
//! This crate contains the value types (CRS references, geometry options, bounding
//! limits), the error type and the layered configuration used by every meridian crate.

pub mod config;
pub mod error;
pub mod models;

pub use error::{MeridianError, Result};
