//! Per-event pixel footprints from a corner lookup table.
//!
//! Each event's four corner offsets are interpolated from the lookup table's
//! cell centers: piecewise-linear inside the table's convex hull,
//! nearest-neighbour outside it. Offsets are scaled by `inflate` and added
//! to the event position.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FixedGridResult;
use crate::interpolate::{weighted, Sample, ScatteredInterpolator};
use crate::lut::{PixelCornerLookupTable, CORNERS};

/// Footprint scale factor that leaves offsets unchanged.
pub const DEFAULT_INFLATE: f64 = 1.0;

/// Quadrilateral on the fixed grid: four `[lon, lat]` corners in
/// scan-angle radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub corners: [[f64; 2]; CORNERS],
}

impl Footprint {
    pub fn new(corners: [[f64; 2]; CORNERS]) -> Self {
        Self { corners }
    }

    /// Raw bit patterns of the corner array, row-major.
    pub fn bit_key(&self) -> [u64; CORNERS * 2] {
        let mut key = [0u64; CORNERS * 2];
        for (c, [lon, lat]) in self.corners.iter().enumerate() {
            key[2 * c] = lon.to_bits();
            key[2 * c + 1] = lat.to_bits();
        }
        key
    }

    /// Canonical byte form: the row-major corner array as little-endian f64.
    pub fn to_bytes(&self) -> [u8; CORNERS * 2 * 8] {
        let mut bytes = [0u8; CORNERS * 2 * 8];
        for (chunk, bits) in bytes.chunks_exact_mut(8).zip(self.bit_key()) {
            chunk.copy_from_slice(&bits.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; CORNERS * 2 * 8]) -> Self {
        let mut corners = [[0.0; 2]; CORNERS];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            corners[i / 2][i % 2] = f64::from_le_bytes(word);
        }
        Self { corners }
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().flatten().all(|v| v.is_finite())
    }
}

/// How a batch of events was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Events inside the lookup table's convex hull
    pub interpolated: usize,
    /// Events that fell back to the nearest tabulated cell
    pub extrapolated: usize,
}

/// Corner interpolators over one lookup table, reusable across calls.
pub struct FootprintResolver {
    interpolator: ScatteredInterpolator,
    /// `fields[c][0]` holds corner `c`'s dlon per cell, `fields[c][1]` its dlat
    fields: [[Vec<f64>; 2]; CORNERS],
    origin_longitude_shift: f64,
}

impl FootprintResolver {
    /// Triangulate the lookup table's cell centers, shifted east by
    /// `origin_longitude_shift` radians.
    pub fn new(
        lookup: &PixelCornerLookupTable,
        origin_longitude_shift: f64,
    ) -> FixedGridResult<Self> {
        let points: Vec<[f64; 2]> = lookup
            .grid_lon()
            .iter()
            .zip(lookup.grid_lat())
            .map(|(&lon, &lat)| [lon + origin_longitude_shift, lat])
            .collect();
        let interpolator = ScatteredInterpolator::new(points)?;

        let fields = std::array::from_fn(|c| {
            std::array::from_fn(|axis| {
                lookup
                    .corner_offsets()
                    .iter()
                    .map(|offsets| offsets[c][axis])
                    .collect()
            })
        });

        debug!(
            cells = lookup.len(),
            triangles = interpolator.triangle_count(),
            origin_longitude_shift,
            "Built footprint resolver"
        );

        Ok(Self {
            interpolator,
            fields,
            origin_longitude_shift,
        })
    }

    pub fn origin_longitude_shift(&self) -> f64 {
        self.origin_longitude_shift
    }

    /// Footprint for every `(lon, lat)` event, in input order.
    pub fn resolve(&self, events: &[(f64, f64)], inflate: f64) -> Vec<Footprint> {
        self.resolve_with_stats(events, inflate).0
    }

    /// Same as [`FootprintResolver::resolve`], also counting how many events
    /// needed extrapolation.
    pub fn resolve_with_stats(
        &self,
        events: &[(f64, f64)],
        inflate: f64,
    ) -> (Vec<Footprint>, ResolveStats) {
        let resolved: Vec<(Footprint, bool)> = events
            .par_iter()
            .map(|&(lon, lat)| self.resolve_one(lon, lat, inflate))
            .collect();

        let mut stats = ResolveStats::default();
        let footprints = resolved
            .into_iter()
            .map(|(footprint, extrapolated)| {
                if extrapolated {
                    stats.extrapolated += 1;
                } else {
                    stats.interpolated += 1;
                }
                footprint
            })
            .collect();

        debug!(
            events = events.len(),
            interpolated = stats.interpolated,
            extrapolated = stats.extrapolated,
            inflate,
            "Resolved event footprints"
        );

        (footprints, stats)
    }

    /// Footprint of a single event and whether it was extrapolated.
    pub fn resolve_one(&self, lon: f64, lat: f64, inflate: f64) -> (Footprint, bool) {
        if !(lon.is_finite() && lat.is_finite()) {
            return (Footprint::new([[f64::NAN; 2]; CORNERS]), false);
        }

        let query = [lon, lat];
        let sample = self.interpolator.sample(query);
        let mut nearest = match sample {
            Sample::Nearest(idx) => Some(idx),
            Sample::Linear { .. } => None,
        };

        let mut corners = [[0.0; 2]; CORNERS];
        for (c, corner) in corners.iter_mut().enumerate() {
            for (axis, origin) in [lon, lat].into_iter().enumerate() {
                let values = &self.fields[c][axis];
                let mut offset = match sample {
                    Sample::Linear { vertices, weights } => weighted(values, vertices, weights),
                    Sample::Nearest(idx) => values[idx],
                };
                if offset.is_nan() {
                    let idx = *nearest.get_or_insert_with(|| self.interpolator.nearest(query));
                    offset = values[idx];
                }
                corner[axis] = origin + offset * inflate;
            }
        }

        (Footprint::new(corners), sample.is_extrapolated())
    }
}

/// Resolve footprints for `events` against `lookup` in one call.
///
/// Builds a fresh [`FootprintResolver`]; keep one around instead when the
/// same table serves many batches.
pub fn resolve_footprints(
    lookup: &PixelCornerLookupTable,
    events: &[(f64, f64)],
    origin_longitude_shift: f64,
    inflate: f64,
) -> FixedGridResult<Vec<Footprint>> {
    let resolver = FootprintResolver::new(lookup, origin_longitude_shift)?;
    Ok(resolver.resolve(events, inflate))
}
