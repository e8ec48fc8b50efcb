//! Synthetic corner lookup tables and event streams.
//!
//! Tables are produced in the stored micro-radian form so they can be fed
//! straight into `PixelCornerLookupTable::from_scaled` or written to disk.

/// A corner lookup table in stored integer form, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledCornerTable {
    pub rows: usize,
    pub cols: usize,
    pub grid_lon: Vec<i32>,
    pub grid_lat: Vec<i32>,
    /// `rows * cols * 4 * 2` values, corner-major within a cell
    pub corners: Vec<i32>,
}

impl ScaledCornerTable {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell center of row `i`, column `j`, in radians.
    pub fn center(&self, i: usize, j: usize) -> (f64, f64) {
        let idx = i * self.cols + j;
        (
            self.grid_lon[idx] as f64 * 1.0e-6,
            self.grid_lat[idx] as f64 * 1.0e-6,
        )
    }
}

/// Creates a regular grid of cell centers with identical square footprints.
///
/// Row 0 is the northernmost row. Every cell gets the corners
/// NW, NE, SE, SW at +/- `spacing_urad / 2` from its center.
///
/// # Example
///
/// ```
/// use test_utils::create_corner_table;
///
/// let table = create_corner_table(3, 4, (-1000, 500), 56);
/// assert_eq!(table.len(), 12);
/// assert_eq!(table.grid_lon[1], -944);
/// assert_eq!(table.grid_lat[4], 444);
/// assert_eq!(&table.corners[..2], &[-28, 28]);
/// ```
pub fn create_corner_table(
    rows: usize,
    cols: usize,
    north_west_urad: (i32, i32),
    spacing_urad: i32,
) -> ScaledCornerTable {
    let half = spacing_urad / 2;
    build_table(rows, cols, north_west_urad, spacing_urad, |_, _| (half, half))
}

/// Like [`create_corner_table`], but the footprint half-width grows by one
/// micro-radian per column and the half-height by one per row.
///
/// Each offset is a linear function of the cell center, so piecewise-linear
/// interpolation inside the grid reproduces it exactly.
pub fn create_varying_corner_table(
    rows: usize,
    cols: usize,
    north_west_urad: (i32, i32),
    spacing_urad: i32,
) -> ScaledCornerTable {
    let half = spacing_urad / 2;
    build_table(rows, cols, north_west_urad, spacing_urad, |i, j| {
        (half + j as i32, half + i as i32)
    })
}

fn build_table<F>(
    rows: usize,
    cols: usize,
    (west, north): (i32, i32),
    spacing: i32,
    half_extent: F,
) -> ScaledCornerTable
where
    F: Fn(usize, usize) -> (i32, i32),
{
    let mut grid_lon = Vec::with_capacity(rows * cols);
    let mut grid_lat = Vec::with_capacity(rows * cols);
    let mut corners = Vec::with_capacity(rows * cols * 8);

    for i in 0..rows {
        for j in 0..cols {
            grid_lon.push(west + j as i32 * spacing);
            grid_lat.push(north - i as i32 * spacing);

            let (hx, hy) = half_extent(i, j);
            corners.extend_from_slice(&[-hx, hy, hx, hy, hx, -hy, -hx, -hy]);
        }
    }

    ScaledCornerTable {
        rows,
        cols,
        grid_lon,
        grid_lat,
        corners,
    }
}

/// Creates `count` events uniformly spread over a scan-angle box.
///
/// Deterministic for a given `seed`.
pub fn create_scan_events(
    count: usize,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    seed: u32,
) -> Vec<(f64, f64)> {
    (0..count)
        .map(|n| {
            let u = unit(simple_hash(n as u32, 0, seed));
            let v = unit(simple_hash(n as u32, 1, seed));
            (x_min + u * (x_max - x_min), y_min + v * (y_max - y_min))
        })
        .collect()
}

/// Repeats events the way flash clusters do: event `k` of `distinct` shows
/// up `k + 1` times.
pub fn create_clustered_events(distinct: &[(f64, f64)]) -> Vec<(f64, f64)> {
    distinct
        .iter()
        .enumerate()
        .flat_map(|(k, &event)| std::iter::repeat(event).take(k + 1))
        .collect()
}

fn unit(hash: u32) -> f64 {
    hash as f64 / u32::MAX as f64
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_corner_table() {
        let table = create_corner_table(2, 3, (0, 100), 10);
        assert_eq!(table.grid_lon, vec![0, 10, 20, 0, 10, 20]);
        assert_eq!(table.grid_lat, vec![100, 100, 100, 90, 90, 90]);
        assert_eq!(table.corners.len(), 6 * 8);
        assert_eq!(&table.corners[8..16], &[-5, 5, 5, 5, 5, -5, -5, -5]);
    }

    #[test]
    fn test_varying_corner_table() {
        let table = create_varying_corner_table(2, 3, (0, 100), 10);
        // row 1, col 2
        let cell = &table.corners[5 * 8..6 * 8];
        assert_eq!(cell, &[-7, 6, 7, 6, 7, -6, -7, -6]);
    }

    #[test]
    fn test_center() {
        let table = create_corner_table(2, 2, (-2000, 1000), 1000);
        let (lon, lat) = table.center(1, 1);
        assert!((lon - (-0.001)).abs() < 1e-15);
        assert!(lat.abs() < 1e-15);
    }

    #[test]
    fn test_scan_events_deterministic() {
        let a = create_scan_events(50, (-0.1, 0.1), (0.0, 0.2), 7);
        let b = create_scan_events(50, (-0.1, 0.1), (0.0, 0.2), 7);
        let c = create_scan_events(50, (-0.1, 0.1), (0.0, 0.2), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a
            .iter()
            .all(|&(x, y)| (-0.1..=0.1).contains(&x) && (0.0..=0.2).contains(&y)));
    }

    #[test]
    fn test_clustered_events() {
        let events = create_clustered_events(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(events.len(), 6);
        assert_eq!(events[5], (2.0, 2.0));
    }
}
