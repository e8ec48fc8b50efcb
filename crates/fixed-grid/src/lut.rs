//! Pixel corner lookup table.
//!
//! Maps fixed grid cell centers to the offsets of the four corners of that
//! cell's footprint. The table is generated offline and only ever read here.
//!
//! # File format
//!
//! Values are stored as little-endian `i32` micro-radians and scaled by
//! `1e-6` on load:
//!
//! ```text
//! "GCLT" | version: u32 | rows: u32 | cols: u32
//! grid_lon: i32 * rows*cols
//! grid_lat: i32 * rows*cols
//! corners:  i32 * rows*cols*4*2   (corner-major within a cell, then dlon, dlat)
//! ```
//!
//! Headers claiming more than [`MAX_CELLS`] cells are rejected before any
//! allocation.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{FixedGridError, FixedGridResult};

/// Corners per footprint.
pub const CORNERS: usize = 4;

/// Scale from stored integers to radians.
pub const LUT_SCALE: f64 = 1.0e-6;

/// Largest table accepted: one cell per pixel of the 0.5 km full disk.
pub const MAX_CELLS: usize = 21696 * 21696;

const MAGIC: &[u8; 4] = b"GCLT";
const VERSION: u32 = 1;

/// Four `[dlon, dlat]` offsets from a cell center, radians.
pub type CornerOffsets = [[f64; 2]; CORNERS];

/// Corner offset table over a `rows x cols` grid, flattened row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCornerLookupTable {
    rows: usize,
    cols: usize,
    grid_lon: Vec<f64>,
    grid_lat: Vec<f64>,
    corner_offsets: Vec<CornerOffsets>,
}

impl PixelCornerLookupTable {
    /// Build a table from radian values, checking that every array matches
    /// `rows * cols`.
    pub fn new(
        rows: usize,
        cols: usize,
        grid_lon: Vec<f64>,
        grid_lat: Vec<f64>,
        corner_offsets: Vec<CornerOffsets>,
    ) -> FixedGridResult<Self> {
        let expected = rows * cols;
        check_len("grid_lon", expected, grid_lon.len())?;
        check_len("grid_lat", expected, grid_lat.len())?;
        check_len("corner_offsets", expected, corner_offsets.len())?;

        Ok(Self {
            rows,
            cols,
            grid_lon,
            grid_lat,
            corner_offsets,
        })
    }

    /// Build a table from stored micro-radian integers.
    pub fn from_scaled(
        rows: usize,
        cols: usize,
        grid_lon: &[i32],
        grid_lat: &[i32],
        corners: &[i32],
    ) -> FixedGridResult<Self> {
        let expected = rows * cols;
        check_len("corners", expected * CORNERS * 2, corners.len())?;

        let corner_offsets = corners
            .chunks_exact(CORNERS * 2)
            .map(|cell| {
                let mut offsets = [[0.0; 2]; CORNERS];
                for (c, pair) in cell.chunks_exact(2).enumerate() {
                    offsets[c] = [unscale(pair[0]), unscale(pair[1])];
                }
                offsets
            })
            .collect();

        Self::new(
            rows,
            cols,
            grid_lon.iter().copied().map(unscale).collect(),
            grid_lat.iter().copied().map(unscale).collect(),
            corner_offsets,
        )
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of tabulated cells.
    pub fn len(&self) -> usize {
        self.grid_lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_lon.is_empty()
    }

    /// Cell center longitudes (scan-angle radians), row-major.
    pub fn grid_lon(&self) -> &[f64] {
        &self.grid_lon
    }

    /// Cell center latitudes (scan-angle radians), row-major.
    pub fn grid_lat(&self) -> &[f64] {
        &self.grid_lat
    }

    pub fn corner_offsets(&self) -> &[CornerOffsets] {
        &self.corner_offsets
    }

    /// Cell at row `i`, column `j`: `(lon, lat, offsets)`.
    pub fn cell(&self, i: usize, j: usize) -> Option<(f64, f64, &CornerOffsets)> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        let idx = i * self.cols + j;
        Some((self.grid_lon[idx], self.grid_lat[idx], &self.corner_offsets[idx]))
    }

    /// Serialize to the scaled-integer file format.
    ///
    /// Every value is encoded before anything is written, so a value that
    /// does not fit in an `i32` leaves the writer untouched.
    pub fn save<W: Write>(&self, mut writer: W) -> FixedGridResult<()> {
        let too_large = || FixedGridError::LookupTableTooLarge {
            rows: self.rows,
            cols: self.cols,
        };
        let rows = u32::try_from(self.rows).map_err(|_| too_large())?;
        let cols = u32::try_from(self.cols).map_err(|_| too_large())?;

        let mut values = Vec::with_capacity(self.len() * (2 + CORNERS * 2));
        for &v in &self.grid_lon {
            values.push(scale("grid_lon", v)?);
        }
        for &v in &self.grid_lat {
            values.push(scale("grid_lat", v)?);
        }
        for offsets in &self.corner_offsets {
            for [dlon, dlat] in offsets {
                values.push(scale("corner_offsets", *dlon)?);
                values.push(scale("corner_offsets", *dlat)?);
            }
        }

        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&rows.to_le_bytes())?;
        writer.write_all(&cols.to_le_bytes())?;
        for v in values {
            writer.write_all(&v.to_le_bytes())?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load a table from a reader.
    pub fn load<R: Read>(mut reader: R) -> FixedGridResult<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(FixedGridError::InvalidMagic);
        }

        let version = read_u32(&mut reader)?;
        if version != VERSION {
            return Err(FixedGridError::UnsupportedVersion(version));
        }

        let rows = read_u32(&mut reader)? as usize;
        let cols = read_u32(&mut reader)? as usize;
        let n = rows
            .checked_mul(cols)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(FixedGridError::LookupTableTooLarge { rows, cols })?;

        let grid_lon = read_i32s(&mut reader, n)?;
        let grid_lat = read_i32s(&mut reader, n)?;
        let corners = read_i32s(&mut reader, n * CORNERS * 2)?;

        debug!(rows, cols, "Loaded pixel corner lookup table");
        Self::from_scaled(rows, cols, &grid_lon, &grid_lat, &corners)
    }

    /// Load a table from disk.
    pub fn open(path: impl AsRef<Path>) -> FixedGridResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::load(BufReader::new(file))
    }

    /// Write a table to disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> FixedGridResult<()> {
        let file = File::create(path.as_ref())?;
        self.save(BufWriter::new(file))
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> FixedGridResult<()> {
    if expected != actual {
        return Err(FixedGridError::LookupTableShape {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

#[inline]
fn unscale(v: i32) -> f64 {
    v as f64 * LUT_SCALE
}

fn scale(field: &'static str, value: f64) -> FixedGridResult<i32> {
    let scaled = (value / LUT_SCALE).round();
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&scaled) {
        return Err(FixedGridError::UnencodableValue { field, value });
    }
    Ok(scaled as i32)
}

fn read_u32<R: Read>(reader: &mut R) -> FixedGridResult<u32> {
    let mut buf4 = [0u8; 4];
    reader.read_exact(&mut buf4)?;
    Ok(u32::from_le_bytes(buf4))
}

/// Reads `count` values, growing the buffer only as data arrives so a
/// header that overstates the table fails with `UnexpectedEof`.
fn read_i32s<R: Read>(reader: &mut R, count: usize) -> FixedGridResult<Vec<i32>> {
    let len = count as u64 * 4;
    let mut bytes = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("corner lookup table truncated: {} of {} bytes", bytes.len(), len),
        )
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> PixelCornerLookupTable {
        let lons = [-1000, 0, 1000, -1000, 0, 1000];
        let lats = [500, 500, 500, -500, -500, -500];
        let corners: Vec<i32> = (0..6)
            .flat_map(|_| [-14, 14, 14, 14, 14, -14, -14, -14])
            .collect();
        PixelCornerLookupTable::from_scaled(2, 3, &lons, &lats, &corners).unwrap()
    }

    #[test]
    fn test_scaled_values() {
        let table = small_table();
        assert_eq!(table.len(), 6);
        let (lon, lat, offsets) = table.cell(0, 2).unwrap();
        assert!((lon - 1000e-6).abs() < 1e-15);
        assert!((lat - 500e-6).abs() < 1e-15);
        assert!((offsets[0][0] - (-14e-6)).abs() < 1e-15);
        assert!(table.cell(2, 0).is_none());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = PixelCornerLookupTable::new(2, 2, vec![0.0; 4], vec![0.0; 3], vec![[[0.0; 2]; 4]; 4])
            .unwrap_err();
        assert!(matches!(
            err,
            FixedGridError::LookupTableShape {
                field: "grid_lat",
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_save_load() {
        let table = small_table();
        let mut buffer = Vec::new();
        table.save(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 16 + 6 * 4 * 2 + 6 * 8 * 4);

        let restored = PixelCornerLookupTable::load(&buffer[..]).unwrap();
        assert_eq!(restored.rows(), 2);
        assert_eq!(restored.cols(), 3);
        assert_eq!(restored, table);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corners.lut");
        small_table().write_to(&path).unwrap();
        assert_eq!(PixelCornerLookupTable::open(&path).unwrap(), small_table());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PixelCornerLookupTable::open(dir.path().join("absent.lut"));
        assert!(matches!(result, Err(FixedGridError::Io(_))));
    }

    fn header(rows: u32, cols: u32) -> Vec<u8> {
        let mut bytes = b"GCLT".to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&rows.to_le_bytes());
        bytes.extend_from_slice(&cols.to_le_bytes());
        bytes
    }

    #[test]
    fn test_oversized_header() {
        let result = PixelCornerLookupTable::load(&header(u32::MAX, u32::MAX)[..]);
        assert!(matches!(
            result,
            Err(FixedGridError::LookupTableTooLarge { .. })
        ));

        let result = PixelCornerLookupTable::load(&header(100_000, 100_000)[..]);
        assert!(matches!(
            result,
            Err(FixedGridError::LookupTableTooLarge {
                rows: 100_000,
                cols: 100_000
            })
        ));
    }

    #[test]
    fn test_header_overstates_data() {
        let mut bytes = header(10_000, 10_000);
        bytes.extend_from_slice(&[0u8; 64]);
        match PixelCornerLookupTable::load(&bytes[..]) {
            Err(FixedGridError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_rejects_unencodable_values() {
        for bad in [f64::NAN, 5000.0, f64::NEG_INFINITY] {
            let table = PixelCornerLookupTable::new(
                1,
                3,
                vec![0.0, bad, 0.0],
                vec![0.0; 3],
                vec![[[0.0; 2]; CORNERS]; 3],
            )
            .unwrap();
            let mut buffer = Vec::new();
            let err = table.save(&mut buffer).unwrap_err();
            assert!(matches!(
                err,
                FixedGridError::UnencodableValue {
                    field: "grid_lon",
                    ..
                }
            ));
            assert!(buffer.is_empty());
        }

        let mut offsets = vec![[[0.0; 2]; CORNERS]; 6];
        offsets[4][2][1] = -3000.0;
        let table = PixelCornerLookupTable::new(2, 3, vec![0.0; 6], vec![0.0; 6], offsets).unwrap();
        assert!(matches!(
            table.save(Vec::new()),
            Err(FixedGridError::UnencodableValue {
                field: "corner_offsets",
                ..
            })
        ));
    }

    #[test]
    fn test_save_rejects_oversized_dimensions() {
        let rows = u32::MAX as usize + 1;
        let table = PixelCornerLookupTable {
            rows,
            cols: 0,
            grid_lon: Vec::new(),
            grid_lat: Vec::new(),
            corner_offsets: Vec::new(),
        };
        assert!(matches!(
            table.save(Vec::new()),
            Err(FixedGridError::LookupTableTooLarge { cols: 0, .. })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let result = PixelCornerLookupTable::load(&b"NOPE\x01\0\0\0"[..]);
        assert!(matches!(result, Err(FixedGridError::InvalidMagic)));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = b"GCLT".to_vec();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        let result = PixelCornerLookupTable::load(&bytes[..]);
        assert!(matches!(result, Err(FixedGridError::UnsupportedVersion(7))));
    }

    #[test]
    fn test_truncated() {
        let mut buffer = Vec::new();
        small_table().save(&mut buffer).unwrap();
        buffer.truncate(buffer.len() - 1);
        assert!(matches!(
            PixelCornerLookupTable::load(&buffer[..]),
            Err(FixedGridError::Io(_))
        ));
    }
}
