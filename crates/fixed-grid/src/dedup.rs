//! Collapse repeated footprints.
//!
//! Many lightning events land in the same fixed grid cell and interpolate
//! to bit-identical corners. Footprints are grouped by the exact bit
//! pattern of their corner array, so two footprints that differ only by
//! floating-point rounding stay separate. Identifiers are assigned in
//! first-seen order, which makes the output deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::footprint::Footprint;
use crate::lut::CORNERS;

/// Width of the zero-padded identifier.
const ID_WIDTH: usize = 6;

/// A distinct footprint and how many input events shared it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueFootprint {
    /// Sequential, zero-padded, starting at `000001`
    pub id: String,
    pub corners: [[f64; 2]; CORNERS],
    pub count: usize,
}

impl UniqueFootprint {
    fn new(seq: usize, footprint: &Footprint) -> Self {
        Self {
            id: format!("{:0width$}", seq, width = ID_WIDTH),
            corners: footprint.corners,
            count: 1,
        }
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.corners)
    }
}

/// Group footprints by exact corner bits.
///
/// The counts always sum to `footprints.len()` and every count is at least 1.
pub fn deduplicate(footprints: &[Footprint]) -> Vec<UniqueFootprint> {
    let mut index: HashMap<[u64; CORNERS * 2], usize> = HashMap::new();
    let mut unique: Vec<UniqueFootprint> = Vec::new();

    for footprint in footprints {
        match index.get(&footprint.bit_key()) {
            Some(&i) => unique[i].increment(),
            None => {
                index.insert(footprint.bit_key(), unique.len());
                unique.push(UniqueFootprint::new(unique.len() + 1, footprint));
            }
        }
    }

    tracing::debug!(
        events = footprints.len(),
        unique = unique.len(),
        "Deduplicated footprints"
    );

    unique
}

/// Sum of all counts.
pub fn total_count(unique: &[UniqueFootprint]) -> usize {
    unique.iter().map(|u| u.count).sum()
}
