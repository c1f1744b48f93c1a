//! Coordinate Reference System references.
//!
//! A [`Crs`] is either a registry code or a raw PROJ parameter string. Two references
//! compare equal when their normalized definitions match, so `Crs::Epsg(4326)` and
//! `Crs::Proj("EPSG:4326")` are the same CRS.

use crate::error::{MeridianError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in definition for EPSG:3857, used when registry lookup is not wanted.
pub const WEB_MERCATOR_PROJ: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m";

const WGS84_EPSG: u32 = 4326;
const WEB_MERCATOR_EPSG: u32 = 3857;

/// How numeric codes are turned into definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrsLookup {
    /// Every code goes through the CRS registry (`EPSG:<code>`)
    #[default]
    Registry,
    /// Codes with a built-in definition skip the registry
    Builtin,
}

/// Coordinate Reference System reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Crs {
    /// Registry code, e.g. 4326
    Epsg(u32),
    /// Raw definition string, e.g. `+proj=longlat +datum=WGS84`
    Proj(String),
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::Epsg(WGS84_EPSG)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::Epsg(WEB_MERCATOR_EPSG)
    }

    /// Registry code, if this reference is one
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj(_) => None,
        }
    }

    /// Normalized definition string handed to the CRS library.
    pub fn definition(&self, lookup: CrsLookup) -> String {
        match (self, lookup) {
            (Crs::Epsg(WEB_MERCATOR_EPSG), CrsLookup::Builtin) => {
                normalize_definition(WEB_MERCATOR_PROJ)
            }
            (Crs::Epsg(code), _) => format!("EPSG:{}", code),
            (Crs::Proj(definition), _) => normalize_definition(definition),
        }
    }
}

/// Collapse whitespace and tag PROJ strings as CRS definitions.
///
/// PROJ only accepts a `+proj=...` string as a CRS when it carries `+type=crs`.
pub fn normalize_definition(definition: &str) -> String {
    let trimmed = definition.trim();
    if !trimmed.starts_with('+') {
        return trimmed.to_string();
    }

    let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if !tokens.contains(&"+type=crs") {
        tokens.push("+type=crs");
    }
    tokens.join(" ")
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.definition(CrsLookup::Registry) == other.definition(CrsLookup::Registry)
    }
}

impl Eq for Crs {}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj(definition) => write!(f, "{}", definition),
        }
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Crs::Epsg(code)
    }
}

impl From<&str> for Crs {
    fn from(definition: &str) -> Self {
        Crs::Proj(definition.to_string())
    }
}

impl From<String> for Crs {
    fn from(definition: String) -> Self {
        Crs::Proj(definition)
    }
}

impl FromStr for Crs {
    type Err = MeridianError;

    /// Parse `4326`, `EPSG:4326` or a literal definition string.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MeridianError::InvalidCrs {
                crs: s.to_string(),
                reason: "empty CRS definition".to_string(),
            });
        }

        if let Ok(code) = trimmed.parse::<u32>() {
            return Ok(Crs::Epsg(code));
        }

        let upper = trimmed.to_ascii_uppercase();
        if let Some(code) = upper.strip_prefix("EPSG:") {
            return code.parse::<u32>().map(Crs::Epsg).map_err(|_| MeridianError::InvalidCrs {
                crs: s.to_string(),
                reason: format!("'{}' is not a numeric EPSG code", code),
            });
        }

        Ok(Crs::Proj(trimmed.to_string()))
    }
}
