//! Scan angle <-> geodetic transform tests against reference values.

use fixed_grid::{
    geod_to_scan, scan_to_geod, scan_to_geod_checked, EllipsoidGeometry, GeodeticCoordinate,
    SatellitePosition,
};
use test_utils::fixtures::transforms::{CENTRAL_US_CORNERS, KNOWN_SCANS};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

// ============================================================================
// Reference values
// ============================================================================

#[test]
fn test_known_scan_angles() {
    let geom = EllipsoidGeometry::goes_east();
    for known in KNOWN_SCANS {
        let scan = geod_to_scan(known.lat, known.lon, &geom);
        assert_coords_approx_eq!((scan.y, scan.x), (known.y, known.x), 1e-4);
    }
}

#[test]
fn test_central_us_corners() {
    let geom = EllipsoidGeometry::goes_east();
    for corner in CENTRAL_US_CORNERS {
        let geod = scan_to_geod(corner.y, corner.x, &geom);
        assert!(
            (geod.lat - corner.lat).abs() < 1e-3 && (geod.lon - corner.lon).abs() < 1e-3,
            "{} corner: got ({}, {}), expected ({}, {})",
            corner.name,
            geod.lat,
            geod.lon,
            corner.lat,
            corner.lon
        );
    }
}

#[test]
fn test_nadir_is_origin() {
    for position in SatellitePosition::ALL {
        let geom = EllipsoidGeometry::for_position(position);
        let geod = scan_to_geod(0.0, 0.0, &geom);
        assert_approx_eq!(geod.lat, 0.0, 1e-9);
        assert_approx_eq!(geod.lon, position.nadir_longitude_deg(), 1e-9);
    }
}

// ============================================================================
// Round trip
// ============================================================================

fn assert_round_trip(geom: &EllipsoidGeometry) {
    let origin = geom.origin_longitude_deg().round() as i32;
    for lat in -60..=60 {
        for lon in (origin - 60)..=(origin + 60) {
            let (lat, lon) = (lat as f64, lon as f64);
            let scan = geod_to_scan(lat, lon, geom);
            let back = scan_to_geod(scan.y, scan.x, geom);
            assert!(
                (back.lat - lat).abs() < 1e-4 && (back.lon - lon).abs() < 1e-4,
                "round trip of ({}, {}) gave ({}, {})",
                lat,
                lon,
                back.lat,
                back.lon
            );
        }
    }
}

#[test]
fn test_round_trip_goes_east() {
    assert_round_trip(&EllipsoidGeometry::goes_east());
}

#[test]
fn test_round_trip_goes_west() {
    assert_round_trip(&EllipsoidGeometry::for_position(SatellitePosition::West));
}

#[test]
fn test_round_trip_stays_visible() {
    let geom = EllipsoidGeometry::goes_east();
    assert!(geom.is_visible(GeodeticCoordinate::new(60.0, -135.0)));
    assert!(geom.is_visible(GeodeticCoordinate::new(-60.0, -15.0)));
    assert!(!geom.is_visible(GeodeticCoordinate::new(0.0, 105.0)));
}

// ============================================================================
// Off-earth angles
// ============================================================================

#[test]
fn test_off_earth_is_flagged_not_fatal() {
    let geom = EllipsoidGeometry::goes_east();
    let (_, on_disk) = scan_to_geod_checked(0.05, 0.05, &geom);
    assert!(!on_disk.discriminant_clamped);

    let (geod, off_disk) = scan_to_geod_checked(0.2, 0.2, &geom);
    assert!(off_disk.discriminant_clamped);
    assert!(geod.lat.is_finite() && geod.lon.is_finite());
}
