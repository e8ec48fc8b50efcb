//! Geostationary fixed-grid coordinate transforms.
//!
//! Converts between GOES-R ABI fixed grid scan angles (radians) and GRS80
//! geodetic latitude/longitude (degrees). The satellite sweeps along the x
//! axis, so `x` is the E/W scanning angle and `y` the N/S elevation angle.
//!
//! Neither direction validates its input. Angles that miss the Earth, or
//! geodetic points on the far side of it, produce numbers that are
//! mathematically defined but physically meaningless; use
//! [`EllipsoidGeometry::is_visible`] to bound inputs first.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 3,
//! Section 5.1.2.8

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ellipsoid::EllipsoidGeometry;

/// A point on the fixed grid, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanCoordinate {
    /// N/S elevation angle
    pub y: f64,
    /// E/W scanning angle
    pub x: f64,
}

impl ScanCoordinate {
    pub fn new(y: f64, x: f64) -> Self {
        Self { y, x }
    }
}

/// A GRS80 geodetic coordinate, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeodeticCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Numerical conditions noticed while computing [`scan_to_geod_checked`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanDiagnostics {
    /// The line of sight missed the ellipsoid and the negative discriminant
    /// was replaced by its absolute value.
    pub discriminant_clamped: bool,
}

impl EllipsoidGeometry {
    /// Convert a scan angle to a geodetic coordinate.
    #[inline]
    pub fn scan_to_geod(&self, scan: ScanCoordinate) -> GeodeticCoordinate {
        scan_to_geod_checked(scan.y, scan.x, self).0
    }

    /// Convert a geodetic coordinate to a scan angle.
    #[inline]
    pub fn geod_to_scan(&self, geod: GeodeticCoordinate) -> ScanCoordinate {
        geod_to_scan(geod.lat, geod.lon, self)
    }

    /// Check whether a geodetic point can be seen from the satellite.
    ///
    /// A point is hidden when `H(H - s_x) < s_y² + (Re/Rp)² s_z²`.
    pub fn is_visible(&self, geod: GeodeticCoordinate) -> bool {
        let s = satellite_frame(geod.lat, geod.lon, self);
        let h = self.geocentric_distance_m;
        h * (h - s.x) >= s.y.powi(2) + self.radius_ratio_sq() * s.z.powi(2)
    }
}

/// Convert fixed grid scan angles to geodetic latitude/longitude.
///
/// `y` is the N/S elevation angle and `x` the E/W scanning angle, both in
/// radians. Returns degrees.
pub fn scan_to_geod(y: f64, x: f64, geom: &EllipsoidGeometry) -> GeodeticCoordinate {
    scan_to_geod_checked(y, x, geom).0
}

/// Same as [`scan_to_geod`], also reporting whether the line of sight missed
/// the Earth.
pub fn scan_to_geod_checked(
    y: f64,
    x: f64,
    geom: &EllipsoidGeometry,
) -> (GeodeticCoordinate, ScanDiagnostics) {
    let h = geom.geocentric_distance_m;
    let req = geom.equatorial_radius_m;
    let ratio_sq = geom.radius_ratio_sq();

    let sin_x = x.sin();
    let cos_x = x.cos();
    let sin_y = y.sin();
    let cos_y = y.cos();

    // Quadratic coefficients for the satellite-to-surface distance
    let a = sin_x.powi(2) + cos_x.powi(2) * (cos_y.powi(2) + ratio_sq * sin_y.powi(2));
    let b = -2.0 * h * cos_x * cos_y;
    let c = h.powi(2) - req.powi(2);

    let mut diagnostics = ScanDiagnostics::default();
    let mut discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        warn!(
            y,
            x, discriminant, "Scan angle misses the ellipsoid, using |discriminant|"
        );
        diagnostics.discriminant_clamped = true;
        discriminant = discriminant.abs();
    }

    // Near intersection
    let rs = (-b - discriminant.sqrt()) / (2.0 * a);

    let sx = rs * cos_x * cos_y;
    let sy = -rs * sin_x;
    let sz = rs * cos_x * sin_y;

    let lat = (ratio_sq * sz / ((h - sx).powi(2) + sy.powi(2)).sqrt()).atan();
    let lon = geom.origin_longitude_rad - (sy / (h - sx)).atan();

    (
        GeodeticCoordinate::new(lat.to_degrees(), lon.to_degrees()),
        diagnostics,
    )
}

/// Convert geodetic latitude/longitude (degrees) to fixed grid scan angles.
///
/// Returns `(y, x)` in radians. Points on the far side of the Earth still
/// produce a value; callers must check visibility themselves.
pub fn geod_to_scan(lat: f64, lon: f64, geom: &EllipsoidGeometry) -> ScanCoordinate {
    let s = satellite_frame(lat, lon, geom);

    let y = (s.z / s.x).atan();
    let x = (-s.y / (s.x.powi(2) + s.y.powi(2) + s.z.powi(2)).sqrt()).asin();

    ScanCoordinate::new(y, x)
}

/// Equatorial radius of the GLM lightning ellipse, 14 km above GRS80 (meters).
pub const LIGHTNING_ELLIPSE_EQUATORIAL_RADIUS_M: f64 = 6378137.0 + 14.0e3;

/// Polar radius of the GLM lightning ellipse (meters).
pub const LIGHTNING_ELLIPSE_POLAR_RADIUS_M: f64 = 6362755.0;

/// Recover fixed grid scan angles from a GLM L2 event location.
///
/// GLM events, groups and flashes are navigated onto a "lightning ellipse"
/// raised above GRS80, so feeding their lat/lon to [`geod_to_scan`] puts
/// them slightly off the pixel they were seen in. This projects the point
/// back through the lightning ellipse instead, giving the `(y, x)` the
/// footprint resolver expects.
///
/// Longitude differences from the origin are wrapped into `[-180, 180]`.
pub fn lightning_ellipse_to_scan(lat: f64, lon: f64, geom: &EllipsoidGeometry) -> ScanCoordinate {
    let mut dlon = lon - geom.origin_longitude_rad.to_degrees();
    if dlon < -180.0 {
        dlon += 360.0;
    } else if dlon > 180.0 {
        dlon -= 360.0;
    }
    let dlon = dlon.to_radians();

    // Geocentric latitude on the underlying GRS80 surface
    let theta_c = ((geom.polar_radius_m / geom.equatorial_radius_m).powi(2)
        * lat.to_radians().tan())
    .atan();
    let (sin_c, cos_c) = theta_c.sin_cos();

    let re = LIGHTNING_ELLIPSE_EQUATORIAL_RADIUS_M;
    let flattening = (re - LIGHTNING_ELLIPSE_POLAR_RADIUS_M) / re;
    let r = re * (1.0 - flattening)
        / (1.0 - flattening * (2.0 - flattening) * cos_c.powi(2)).sqrt();

    // Line of sight in the satellite frame, x toward the Earth
    let vx = geom.geocentric_distance_m - r * cos_c * dlon.cos();
    let vy = -r * cos_c * dlon.sin();
    let vz = r * sin_c;
    let norm = (vx.powi(2) + vy.powi(2) + vz.powi(2)).sqrt();

    ScanCoordinate::new((vz / vx).atan(), (-vy / norm).asin())
}

/// Satellite-frame position vector of a surface point.
struct SatelliteFrame {
    x: f64,
    y: f64,
    z: f64,
}

fn satellite_frame(lat_deg: f64, lon_deg: f64, geom: &EllipsoidGeometry) -> SatelliteFrame {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let req = geom.equatorial_radius_m;
    let rpol = geom.polar_radius_m;

    // Geocentric latitude
    let theta_c = ((rpol / req).powi(2) * lat.tan()).atan();

    // Geocentric distance to the surface point
    let rc = rpol / (1.0 - geom.eccentricity.powi(2) * theta_c.cos().powi(2)).sqrt();

    let dlon = lon - geom.origin_longitude_rad;
    SatelliteFrame {
        x: geom.geocentric_distance_m - rc * theta_c.cos() * dlon.cos(),
        y: -rc * theta_c.cos() * dlon.sin(),
        z: rc * theta_c.sin(),
    }
}
