//! GOES-R geostationary fixed grid coordinate engine.
//!
//! Converts between ABI fixed grid scan angles and GRS80 geodetic
//! coordinates, describes the standard sector grids, and turns point
//! events (e.g. GLM lightning detections) into pixel footprint polygons
//! using a precomputed corner lookup table.
//!
//! # Example
//!
//! ```
//! use fixed_grid::{geod_to_scan, scan_to_geod, EllipsoidGeometry};
//!
//! let geom = EllipsoidGeometry::goes_east();
//! let scan = geod_to_scan(33.943546, -84.52599, &geom);
//! let geod = scan_to_geod(scan.y, scan.x, &geom);
//! assert!((geod.lat - 33.943546).abs() < 1e-6);
//! ```

pub mod catalog;
pub mod config;
pub mod dedup;
pub mod ellipsoid;
pub mod error;
pub mod footprint;
pub mod geostationary;
pub mod interpolate;
pub mod lut;

pub use catalog::{
    get_grid_view, goesr_catalog, FixedGridCatalog, GridView, ImageBounds, Resolution, Sector,
    SectorGeometry,
};
pub use config::EngineConfig;
pub use dedup::{deduplicate, UniqueFootprint};
pub use ellipsoid::{EllipsoidGeometry, SatellitePosition};
pub use error::{ConfigAxis, FixedGridError, FixedGridResult};
pub use footprint::{resolve_footprints, Footprint, FootprintResolver, ResolveStats};
pub use geostationary::{
    geod_to_scan, lightning_ellipse_to_scan, scan_to_geod, scan_to_geod_checked,
    GeodeticCoordinate, ScanCoordinate, ScanDiagnostics,
};
pub use interpolate::ScatteredInterpolator;
pub use lut::PixelCornerLookupTable;
