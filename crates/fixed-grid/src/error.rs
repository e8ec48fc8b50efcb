//! Error types for the fixed-grid engine.

use std::fmt;

use thiserror::Error;

/// Result type alias using FixedGridError.
pub type FixedGridResult<T> = Result<T, FixedGridError>;

/// Which key of a `(position, sector, resolution)` lookup was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAxis {
    Position,
    Sector,
    Resolution,
}

impl fmt::Display for ConfigAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigAxis::Position => "position",
            ConfigAxis::Sector => "sector",
            ConfigAxis::Resolution => "resolution",
        };
        f.write_str(name)
    }
}

/// Errors raised by the catalog, the corner lookup table and the resolver.
///
/// The coordinate transforms never fail; they surface NaN/Inf instead.
#[derive(Debug, Error)]
pub enum FixedGridError {
    // === Catalog ===
    #[error("invalid {axis} '{value}' for fixed grid configuration")]
    InvalidConfiguration { axis: ConfigAxis, value: String },

    // === Footprint resolution ===
    #[error("degenerate corner lookup table: {0}")]
    DegenerateLookupTable(String),

    // === Corner lookup table codec ===
    #[error("corner lookup table shape mismatch: {field} has {actual} values, expected {expected}")]
    LookupTableShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("corner lookup table of {rows}x{cols} cells exceeds the fixed grid")]
    LookupTableTooLarge { rows: usize, cols: usize },

    #[error("{field} value {value} cannot be stored as i32 micro-radians")]
    UnencodableValue { field: &'static str, value: f64 },

    #[error("invalid corner lookup table magic bytes")]
    InvalidMagic,

    #[error("unsupported corner lookup table version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Configuration ===
    #[error("configuration error: {0}")]
    Config(String),
}

impl FixedGridError {
    pub(crate) fn invalid(axis: ConfigAxis, value: impl Into<String>) -> Self {
        FixedGridError::InvalidConfiguration {
            axis,
            value: value.into(),
        }
    }

    /// True for errors the caller can fix by changing its request.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            FixedGridError::InvalidConfiguration { .. } | FixedGridError::Config(_)
        )
    }
}

impl From<serde_yaml::Error> for FixedGridError {
    fn from(err: serde_yaml::Error) -> Self {
        FixedGridError::Config(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_names_axis() {
        let err = FixedGridError::invalid(ConfigAxis::Resolution, "3.0");
        assert_eq!(
            err.to_string(),
            "invalid resolution '3.0' for fixed grid configuration"
        );
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_degenerate_is_not_caller_error() {
        let err = FixedGridError::DegenerateLookupTable("2 distinct points".into());
        assert!(!err.is_caller_error());
    }
}
