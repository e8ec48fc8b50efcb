//! Engine defaults for tools built on the fixed-grid engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Resolution, Sector};
use crate::ellipsoid::SatellitePosition;
use crate::error::{FixedGridError, FixedGridResult};
use crate::footprint::DEFAULT_INFLATE;

/// Defaults for satellite geometry and footprint resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Satellite slot used for transforms and grid lookups.
    pub position: SatellitePosition,

    /// Sector used for grid lookups.
    pub sector: Sector,

    /// Nominal resolution used for grid lookups.
    pub resolution: Resolution,

    /// Footprint scale factor.
    pub inflate: f64,

    /// Corner lookup table file, if footprints are needed.
    pub corner_lut_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            position: SatellitePosition::East,
            sector: Sector::Full,
            resolution: Resolution::R2_0,
            inflate: DEFAULT_INFLATE,
            corner_lut_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; set but malformed ones are errors.
    pub fn from_env() -> FixedGridResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> FixedGridResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("FIXED_GRID_POSITION") {
            config.position = val.parse()?;
        }

        if let Some(val) = lookup("FIXED_GRID_SECTOR") {
            config.sector = val.parse()?;
        }

        if let Some(val) = lookup("FIXED_GRID_RESOLUTION") {
            config.resolution = val.parse()?;
        }

        if let Some(val) = lookup("FIXED_GRID_INFLATE") {
            config.inflate = val
                .trim()
                .parse()
                .map_err(|_| FixedGridError::Config(format!("FIXED_GRID_INFLATE: '{}'", val)))?;
        }

        if let Some(val) = lookup("CORNER_LUT_PATH") {
            if !val.trim().is_empty() {
                config.corner_lut_path = Some(PathBuf::from(val));
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> FixedGridResult<()> {
        if !(self.inflate.is_finite() && self.inflate > 0.0) {
            return Err(FixedGridError::Config(format!(
                "inflate must be a positive finite number, got {}",
                self.inflate
            )));
        }
        Ok(())
    }
}
