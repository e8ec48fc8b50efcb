//! GOES-R fixed grid catalog.
//!
//! Static viewing geometry for each satellite position, sector and nominal
//! resolution. All angular values are radians on the fixed grid.
//!
//! Pixel counts use truncating division (`floor(span / resolution)`), never
//! rounding. With the PUG L1b spans this yields 1084 full-disk pixels at
//! 10 km rather than 1085, and downstream consumers compare against that
//! exact count.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ellipsoid::SatellitePosition;
use crate::error::{ConfigAxis, FixedGridError, FixedGridResult};

/// Half-width of the full disk (radians), PUG L1b table 5.1.2.7-4.
pub const FULL_DISK_HALF_SPAN_RAD: f64 = 0.151872;

/// Portion of the field of view covered by a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Full,
    Conus,
    Meso,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::Full, Sector::Conus, Sector::Meso];

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::Full => "full",
            Sector::Conus => "conus",
            Sector::Meso => "meso",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = FixedGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Sector::Full),
            "conus" => Ok(Sector::Conus),
            "meso" => Ok(Sector::Meso),
            _ => Err(FixedGridError::invalid(ConfigAxis::Sector, s)),
        }
    }
}

/// Nominal pixel size at nadir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "0.5")]
    R0_5,
    #[serde(rename = "1.0")]
    R1_0,
    #[serde(rename = "2.0")]
    R2_0,
    #[serde(rename = "4.0")]
    R4_0,
    /// Not part of the PUG, kept for symmetry
    #[serde(rename = "8.0")]
    R8_0,
    #[serde(rename = "10.0")]
    R10_0,
    #[serde(rename = "100.0")]
    R100_0,
}

impl Resolution {
    pub const ALL: [Resolution; 7] = [
        Resolution::R0_5,
        Resolution::R1_0,
        Resolution::R2_0,
        Resolution::R4_0,
        Resolution::R8_0,
        Resolution::R10_0,
        Resolution::R100_0,
    ];

    /// Angular size of one pixel.
    pub fn rad_per_pixel(self) -> f64 {
        match self {
            Resolution::R0_5 => 14e-6,
            Resolution::R1_0 => 28e-6,
            Resolution::R2_0 => 56e-6,
            Resolution::R4_0 => 112e-6,
            Resolution::R8_0 => 224e-6,
            Resolution::R10_0 => 280e-6,
            Resolution::R100_0 => 2800e-6,
        }
    }

    /// The nominal kilometre key, e.g. `"2.0"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::R0_5 => "0.5",
            Resolution::R1_0 => "1.0",
            Resolution::R2_0 => "2.0",
            Resolution::R4_0 => "4.0",
            Resolution::R8_0 => "8.0",
            Resolution::R10_0 => "10.0",
            Resolution::R100_0 => "100.0",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = FixedGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Resolution::ALL
            .into_iter()
            .find(|r| r.as_str() == key)
            .ok_or_else(|| FixedGridError::invalid(ConfigAxis::Resolution, s))
    }
}

/// Tabulated scan-angle limits of a sector image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Sector geometry independent of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorGeometry {
    pub span_ew_rad: f64,
    pub span_ns_rad: f64,
    #[serde(default)]
    pub center_ew_rad: f64,
    #[serde(default)]
    pub center_ns_rad: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_bounds: Option<ImageBounds>,
}

/// Fixed grid description for one `(position, sector, resolution)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridView {
    pub position: SatellitePosition,
    pub sector: Sector,
    pub resolution: Resolution,
    pub span_ew_rad: f64,
    pub span_ns_rad: f64,
    pub center_ew_rad: f64,
    pub center_ns_rad: f64,
    pub resolution_rad_per_pixel: f64,
    /// `floor(span_ew / resolution)`
    pub pixels_ew: usize,
    /// `floor(span_ns / resolution)`
    pub pixels_ns: usize,
    pub nadir_longitude_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_bounds: Option<ImageBounds>,
}

impl GridView {
    fn build(
        position: SatellitePosition,
        sector: Sector,
        resolution: Resolution,
        geometry: &SectorGeometry,
    ) -> Self {
        let res = resolution.rad_per_pixel();
        Self {
            position,
            sector,
            resolution,
            span_ew_rad: geometry.span_ew_rad,
            span_ns_rad: geometry.span_ns_rad,
            center_ew_rad: geometry.center_ew_rad,
            center_ns_rad: geometry.center_ns_rad,
            resolution_rad_per_pixel: res,
            pixels_ew: (geometry.span_ew_rad / res) as usize,
            pixels_ns: (geometry.span_ns_rad / res) as usize,
            nadir_longitude_deg: position.nadir_longitude_deg(),
            image_bounds: geometry.image_bounds,
        }
    }

    pub fn nadir_longitude_rad(&self) -> f64 {
        self.nadir_longitude_deg.to_radians()
    }

    /// Re-centre the view, e.g. a meso sector on its commanded centre.
    ///
    /// Tabulated bounds no longer apply and are dropped.
    pub fn with_center(mut self, center_ew_rad: f64, center_ns_rad: f64) -> Self {
        self.center_ew_rad = center_ew_rad;
        self.center_ns_rad = center_ns_rad;
        self.image_bounds = None;
        self
    }

    /// Image limits: tabulated where available, otherwise center ± span/2.
    pub fn image_extent(&self) -> ImageBounds {
        self.image_bounds.unwrap_or_else(|| ImageBounds {
            north: self.center_ns_rad + self.span_ns_rad / 2.0,
            south: self.center_ns_rad - self.span_ns_rad / 2.0,
            east: self.center_ew_rad + self.span_ew_rad / 2.0,
            west: self.center_ew_rad - self.span_ew_rad / 2.0,
        })
    }

    /// E/W scan angle of each pixel column, west to east.
    pub fn x_coordinates(&self) -> Vec<f64> {
        let extent = self.image_extent();
        linspace(extent.west, extent.east, self.pixels_ew)
    }

    /// N/S scan angle of each pixel row, south to north.
    pub fn y_coordinates(&self) -> Vec<f64> {
        let extent = self.image_extent();
        linspace(extent.south, extent.north, self.pixels_ns)
    }

    /// E/W cell edges: `pixels_ew + 1` values, half a pixel either side of
    /// the column centres.
    pub fn x_edges(&self) -> Vec<f64> {
        cell_edges(&self.x_coordinates(), self.resolution_rad_per_pixel / 2.0)
    }

    /// N/S cell edges: `pixels_ns + 1` values, half a pixel either side of
    /// the row centres.
    pub fn y_edges(&self) -> Vec<f64> {
        cell_edges(&self.y_coordinates(), self.resolution_rad_per_pixel / 2.0)
    }
}

fn cell_edges(centers: &[f64], half_pixel: f64) -> Vec<f64> {
    let mut edges: Vec<f64> = centers.iter().map(|c| c - half_pixel).collect();
    if let Some(last) = centers.last() {
        edges.push(last + half_pixel);
    }
    edges
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// The full set of sector geometries, keyed by position then sector.
///
/// Resolutions are not stored per row: every resolution applies to every
/// sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedGridCatalog {
    sectors: BTreeMap<SatellitePosition, BTreeMap<Sector, SectorGeometry>>,
}

impl FixedGridCatalog {
    /// The operational GOES-R table.
    pub fn goesr() -> Self {
        let full = SectorGeometry {
            span_ew_rad: FULL_DISK_HALF_SPAN_RAD * 2.0,
            span_ns_rad: FULL_DISK_HALF_SPAN_RAD * 2.0,
            center_ew_rad: 0.0,
            center_ns_rad: 0.0,
            image_bounds: None,
        };
        let conus = |center_ew_rad, center_ns_rad| SectorGeometry {
            span_ew_rad: 0.14,
            span_ns_rad: 0.084,
            center_ew_rad,
            center_ns_rad,
            image_bounds: None,
        };
        let meso = SectorGeometry {
            span_ew_rad: 0.028,
            span_ns_rad: 0.028,
            center_ew_rad: 0.0,
            center_ns_rad: 0.0,
            image_bounds: None,
        };

        let east = BTreeMap::from([
            (
                Sector::Full,
                SectorGeometry {
                    image_bounds: Some(ImageBounds {
                        north: FULL_DISK_HALF_SPAN_RAD,
                        south: -FULL_DISK_HALF_SPAN_RAD,
                        east: FULL_DISK_HALF_SPAN_RAD,
                        west: -FULL_DISK_HALF_SPAN_RAD,
                    }),
                    ..full
                },
            ),
            (
                Sector::Conus,
                SectorGeometry {
                    image_bounds: Some(ImageBounds {
                        north: 0.128240,
                        south: 0.044240,
                        east: 0.038640,
                        west: -0.101360,
                    }),
                    ..conus(-0.031360, 0.086240)
                },
            ),
            (Sector::Meso, meso),
        ]);
        let west = BTreeMap::from([
            (Sector::Full, full),
            (Sector::Conus, conus(0.0, 0.086240)),
            (Sector::Meso, meso),
        ]);
        let test = BTreeMap::from([
            (Sector::Full, full),
            (Sector::Conus, conus(-0.005040, 0.084560)),
            (Sector::Meso, meso),
        ]);

        Self {
            sectors: BTreeMap::from([
                (SatellitePosition::East, east),
                (SatellitePosition::West, west),
                (SatellitePosition::Test, test),
            ]),
        }
    }

    /// Look up one grid view.
    pub fn get_grid_view(
        &self,
        position: SatellitePosition,
        sector: Sector,
        resolution: Resolution,
    ) -> FixedGridResult<GridView> {
        let by_sector = self
            .sectors
            .get(&position)
            .ok_or_else(|| FixedGridError::invalid(ConfigAxis::Position, position.as_str()))?;
        let geometry = by_sector
            .get(&sector)
            .ok_or_else(|| FixedGridError::invalid(ConfigAxis::Sector, sector.as_str()))?;
        Ok(GridView::build(position, sector, resolution, geometry))
    }

    /// Look up one grid view from its string keys, e.g. `("east", "conus", "2.0")`.
    pub fn get_grid_view_by_name(
        &self,
        position: &str,
        sector: &str,
        resolution: &str,
    ) -> FixedGridResult<GridView> {
        self.get_grid_view(position.parse()?, sector.parse()?, resolution.parse()?)
    }

    /// Every view in the table, ordered by position, sector, resolution.
    pub fn iter_views(&self) -> impl Iterator<Item = GridView> + '_ {
        self.sectors.iter().flat_map(|(&position, by_sector)| {
            by_sector.iter().flat_map(move |(&sector, geometry)| {
                Resolution::ALL
                    .into_iter()
                    .map(move |resolution| GridView::build(position, sector, resolution, geometry))
            })
        })
    }

    /// Parse a custom table.
    pub fn from_yaml_str(yaml: &str) -> FixedGridResult<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_yaml_string(&self) -> FixedGridResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> FixedGridResult<()> {
        for (position, by_sector) in &self.sectors {
            for (sector, geometry) in by_sector {
                let spans = [geometry.span_ew_rad, geometry.span_ns_rad];
                if !spans.iter().all(|s| s.is_finite() && *s > 0.0) {
                    return Err(FixedGridError::Config(format!(
                        "{}/{}: spans must be finite and positive",
                        position, sector
                    )));
                }
                let mut angles = vec![geometry.center_ew_rad, geometry.center_ns_rad];
                if let Some(b) = &geometry.image_bounds {
                    angles.extend([b.north, b.south, b.east, b.west]);
                }
                if !angles.iter().all(|a| a.is_finite()) {
                    return Err(FixedGridError::Config(format!(
                        "{}/{}: centres and bounds must be finite",
                        position, sector
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for FixedGridCatalog {
    fn default() -> Self {
        Self::goesr()
    }
}

static GOESR_CATALOG: Lazy<FixedGridCatalog> = Lazy::new(FixedGridCatalog::goesr);

/// Process-wide GOES-R catalog, built on first use.
pub fn goesr_catalog() -> &'static FixedGridCatalog {
    &GOESR_CATALOG
}

/// Look up a view in the GOES-R catalog.
pub fn get_grid_view(
    position: SatellitePosition,
    sector: Sector,
    resolution: Resolution,
) -> FixedGridResult<GridView> {
    goesr_catalog().get_grid_view(position, sector, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_disk_east_2km() {
        let view = get_grid_view(SatellitePosition::East, Sector::Full, Resolution::R2_0).unwrap();
        assert_eq!(view.pixels_ew, 5424);
        assert_eq!(view.pixels_ns, 5424);
        assert_eq!(view.resolution_rad_per_pixel, 56e-6);
        assert_eq!(view.nadir_longitude_deg, -75.0);
    }

    #[test]
    fn test_pixel_count_truncates() {
        // 0.303744 / 280e-6 = 1084.8
        let view = get_grid_view(SatellitePosition::West, Sector::Full, Resolution::R10_0).unwrap();
        assert_eq!(view.pixels_ew, 1084);

        // 0.303744 / 2800e-6 = 108.48
        let view = get_grid_view(SatellitePosition::Test, Sector::Full, Resolution::R100_0).unwrap();
        assert_eq!(view.pixels_ns, 108);
    }

    #[test]
    fn test_conus_centers() {
        let east = get_grid_view(SatellitePosition::East, Sector::Conus, Resolution::R1_0).unwrap();
        assert_eq!((east.center_ew_rad, east.center_ns_rad), (-0.031360, 0.086240));
        assert_eq!((east.pixels_ew, east.pixels_ns), (5000, 3000));

        let west = get_grid_view(SatellitePosition::West, Sector::Conus, Resolution::R1_0).unwrap();
        assert_eq!((west.center_ew_rad, west.center_ns_rad), (0.0, 0.086240));
        assert_eq!(west.nadir_longitude_deg, -137.0);

        let test = get_grid_view(SatellitePosition::Test, Sector::Conus, Resolution::R1_0).unwrap();
        assert_eq!((test.center_ew_rad, test.center_ns_rad), (-0.005040, 0.084560));
    }

    #[test]
    fn test_image_bounds_only_where_tabulated() {
        let catalog = FixedGridCatalog::goesr();
        let with_bounds = [
            (SatellitePosition::East, Sector::Full),
            (SatellitePosition::East, Sector::Conus),
        ];
        for view in catalog.iter_views() {
            let expected = with_bounds.contains(&(view.position, view.sector));
            assert_eq!(view.image_bounds.is_some(), expected, "{:?}", view);
        }
    }

    #[test]
    fn test_derived_extent_matches_tabulated() {
        let east = get_grid_view(SatellitePosition::East, Sector::Conus, Resolution::R2_0).unwrap();
        let tabulated = east.image_extent();
        let derived = east.clone().with_center(east.center_ew_rad, east.center_ns_rad).image_extent();

        assert!((tabulated.north - derived.north).abs() < 1e-12);
        assert!((tabulated.south - derived.south).abs() < 1e-12);
        assert!((tabulated.east - derived.east).abs() < 1e-12);
        assert!((tabulated.west - derived.west).abs() < 1e-12);
    }

    #[test]
    fn test_meso_with_center() {
        let view = get_grid_view(SatellitePosition::East, Sector::Meso, Resolution::R2_0)
            .unwrap()
            .with_center(0.05, 0.1);
        let extent = view.image_extent();
        assert!((extent.west - 0.036).abs() < 1e-12);
        assert!((extent.east - 0.064).abs() < 1e-12);
        assert!((extent.south - 0.086).abs() < 1e-12);
        assert!((extent.north - 0.114).abs() < 1e-12);
        assert_eq!(view.pixels_ew, 500);
    }

    #[test]
    fn test_pixel_axes() {
        let view = get_grid_view(SatellitePosition::East, Sector::Full, Resolution::R8_0).unwrap();
        let x = view.x_coordinates();
        let y = view.y_coordinates();
        assert_eq!(x.len(), view.pixels_ew);
        assert_eq!(y.len(), view.pixels_ns);
        assert_eq!(x[0], -FULL_DISK_HALF_SPAN_RAD);
        assert_eq!(*x.last().unwrap(), FULL_DISK_HALF_SPAN_RAD);
        assert!(y.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_cell_edges() {
        let view = get_grid_view(SatellitePosition::East, Sector::Conus, Resolution::R2_0).unwrap();
        let centers = view.x_coordinates();
        let edges = view.x_edges();
        assert_eq!(edges.len(), view.pixels_ew + 1);
        assert!((edges[0] - (centers[0] - 28e-6)).abs() < 1e-15);
        assert!((edges[view.pixels_ew] - (centers[view.pixels_ew - 1] + 28e-6)).abs() < 1e-15);

        let view = get_grid_view(SatellitePosition::East, Sector::Meso, Resolution::R10_0).unwrap();
        let centers = view.y_coordinates();
        let edges = view.y_edges();
        assert_eq!(edges.len(), view.pixels_ns + 1);
        assert!((edges[1] - (centers[1] - 14e-5)).abs() < 1e-15);
        assert!((edges[view.pixels_ns] - (centers[view.pixels_ns - 1] + 14e-5)).abs() < 1e-15);
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = goesr_catalog();
        let view = catalog.get_grid_view_by_name("east", "conus", "2.0").unwrap();
        assert_eq!(view.pixels_ew, 2500);

        let err = catalog.get_grid_view_by_name("east", "conus", "3.0").unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::InvalidConfiguration {
                axis: ConfigAxis::Resolution,
                ..
            }
        ));

        let err = catalog.get_grid_view_by_name("east", "global", "2.0").unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::InvalidConfiguration {
                axis: ConfigAxis::Sector,
                ..
            }
        ));
    }

    #[test]
    fn test_iter_views_covers_table() {
        assert_eq!(FixedGridCatalog::goesr().iter_views().count(), 3 * 3 * 7);
    }

    #[test]
    fn test_yaml_round_trip() {
        let catalog = FixedGridCatalog::goesr();
        let yaml = catalog.to_yaml_string().unwrap();
        let restored = FixedGridCatalog::from_yaml_str(&yaml).unwrap();
        assert_eq!(restored, catalog);
    }

    #[test]
    fn test_yaml_missing_sector() {
        let yaml = r#"
sectors:
  east:
    full:
      span_ew_rad: 0.303744
      span_ns_rad: 0.303744
"#;
        let catalog = FixedGridCatalog::from_yaml_str(yaml).unwrap();
        assert!(catalog
            .get_grid_view(SatellitePosition::East, Sector::Full, Resolution::R2_0)
            .is_ok());

        let err = catalog
            .get_grid_view(SatellitePosition::East, Sector::Meso, Resolution::R2_0)
            .unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::InvalidConfiguration {
                axis: ConfigAxis::Sector,
                ..
            }
        ));

        let err = catalog
            .get_grid_view(SatellitePosition::West, Sector::Full, Resolution::R2_0)
            .unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::InvalidConfiguration {
                axis: ConfigAxis::Position,
                ..
            }
        ));
    }

    #[test]
    fn test_yaml_rejects_zero_span() {
        let yaml = r#"
sectors:
  east:
    meso:
      span_ew_rad: 0.0
      span_ns_rad: 0.028
"#;
        assert!(matches!(
            FixedGridCatalog::from_yaml_str(yaml),
            Err(FixedGridError::Config(_))
        ));
    }

    #[test]
    fn test_yaml_rejects_infinite_span() {
        let yaml = r#"
sectors:
  east:
    full:
      span_ew_rad: .inf
      span_ns_rad: 0.303744
"#;
        assert!(matches!(
            FixedGridCatalog::from_yaml_str(yaml),
            Err(FixedGridError::Config(_))
        ));

        let yaml = r#"
sectors:
  east:
    meso:
      span_ew_rad: 0.028
      span_ns_rad: 0.028
      center_ew_rad: .nan
"#;
        assert!(matches!(
            FixedGridCatalog::from_yaml_str(yaml),
            Err(FixedGridError::Config(_))
        ));
    }
}
