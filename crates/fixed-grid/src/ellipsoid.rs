//! GRS80 ellipsoid and GOES-R satellite geometry.
//!
//! Constants follow the GOES-R Product Definition and Users' Guide (PUG),
//! Volume 3, L1b data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigAxis, FixedGridError};

/// GRS80 semi-major axis (meters).
pub const GRS80_EQUATORIAL_RADIUS_M: f64 = 6378137.0;

/// GRS80 semi-minor axis (meters).
pub const GRS80_POLAR_RADIUS_M: f64 = 6356752.31414;

/// GRS80 inverse flattening.
pub const GRS80_INVERSE_FLATTENING: f64 = 298.257222096;

/// GOES-R perspective point height above the equatorial radius (meters).
pub const GOESR_SATELLITE_HEIGHT_M: f64 = 35786023.0;

/// Operational GOES-R slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatellitePosition {
    East,
    West,
    Test,
}

impl SatellitePosition {
    pub const ALL: [SatellitePosition; 3] = [
        SatellitePosition::East,
        SatellitePosition::West,
        SatellitePosition::Test,
    ];

    /// Sub-satellite (nadir) longitude in degrees.
    pub fn nadir_longitude_deg(self) -> f64 {
        match self {
            SatellitePosition::East => -75.0,
            SatellitePosition::West => -137.0,
            SatellitePosition::Test => -89.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SatellitePosition::East => "east",
            SatellitePosition::West => "west",
            SatellitePosition::Test => "test",
        }
    }
}

impl fmt::Display for SatellitePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SatellitePosition {
    type Err = FixedGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "east" => Ok(SatellitePosition::East),
            "west" => Ok(SatellitePosition::West),
            "test" => Ok(SatellitePosition::Test),
            _ => Err(FixedGridError::invalid(ConfigAxis::Position, s)),
        }
    }
}

/// Viewing geometry of a geostationary satellite over the GRS80 ellipsoid.
///
/// Immutable once built; each satellite position gets its own instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidGeometry {
    /// Semi-major axis (meters)
    pub equatorial_radius_m: f64,
    /// Semi-minor axis (meters)
    pub polar_radius_m: f64,
    /// Inverse flattening of the ellipsoid
    pub inverse_flattening: f64,
    /// First eccentricity, derived from the two radii
    pub eccentricity: f64,
    /// Perspective point height above the equatorial radius (meters)
    pub satellite_height_m: f64,
    /// Satellite distance from Earth center (meters)
    pub geocentric_distance_m: f64,
    /// Longitude of the satellite nadir point (radians)
    pub origin_longitude_rad: f64,
}

impl EllipsoidGeometry {
    /// GRS80 geometry for a GOES-R satellite parked at `origin_longitude_deg`.
    pub fn grs80(origin_longitude_deg: f64) -> Self {
        let req = GRS80_EQUATORIAL_RADIUS_M;
        let rpol = GRS80_POLAR_RADIUS_M;

        Self {
            equatorial_radius_m: req,
            polar_radius_m: rpol,
            inverse_flattening: GRS80_INVERSE_FLATTENING,
            eccentricity: (1.0 - (rpol / req).powi(2)).sqrt(),
            satellite_height_m: GOESR_SATELLITE_HEIGHT_M,
            geocentric_distance_m: GOESR_SATELLITE_HEIGHT_M + req,
            origin_longitude_rad: normalize_longitude_rad(origin_longitude_deg.to_radians()),
        }
    }

    /// Geometry for one of the operational GOES-R slots.
    pub fn for_position(position: SatellitePosition) -> Self {
        Self::grs80(position.nadir_longitude_deg())
    }

    /// GOES-East (75.0°W).
    pub fn goes_east() -> Self {
        Self::for_position(SatellitePosition::East)
    }

    /// Nadir longitude in degrees.
    pub fn origin_longitude_deg(&self) -> f64 {
        self.origin_longitude_rad.to_degrees()
    }

    /// `(Re / Rp)²`, used by the forward transform.
    #[inline]
    pub(crate) fn radius_ratio_sq(&self) -> f64 {
        (self.equatorial_radius_m / self.polar_radius_m).powi(2)
    }
}

impl Default for EllipsoidGeometry {
    fn default() -> Self {
        Self::goes_east()
    }
}

/// Wrap a longitude into (-π, π].
fn normalize_longitude_rad(lon: f64) -> f64 {
    use std::f64::consts::{PI, TAU};

    let wrapped = (lon + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        let geom = EllipsoidGeometry::goes_east();
        assert_eq!(geom.geocentric_distance_m, 42164160.0);
        assert!((geom.eccentricity - 0.0818191910435).abs() < 1e-12);
        assert!((geom.origin_longitude_rad - (-1.308996939)).abs() < 1e-9);
    }

    #[test]
    fn test_flattening_matches_radii() {
        let geom = EllipsoidGeometry::goes_east();
        let f = 1.0 - geom.polar_radius_m / geom.equatorial_radius_m;
        assert!((1.0 / f - geom.inverse_flattening).abs() < 1e-6);
    }

    #[test]
    fn test_positions() {
        for position in SatellitePosition::ALL {
            let geom = EllipsoidGeometry::for_position(position);
            assert!((geom.origin_longitude_deg() - position.nadir_longitude_deg()).abs() < 1e-12);
            assert_eq!(position.as_str().parse::<SatellitePosition>().unwrap(), position);
        }
    }

    #[test]
    fn test_longitude_wrapping() {
        let geom = EllipsoidGeometry::grs80(-180.0);
        assert!((geom.origin_longitude_rad - std::f64::consts::PI).abs() < 1e-12);

        let geom = EllipsoidGeometry::grs80(200.0);
        assert!((geom.origin_longitude_deg() - (-160.0)).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_position() {
        let err = "north".parse::<SatellitePosition>().unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::InvalidConfiguration {
                axis: ConfigAxis::Position,
                ..
            }
        ));
    }
}
