//! Scattered-data interpolation over 2-D points.
//!
//! Piecewise-linear interpolation on a Delaunay triangulation, with
//! nearest-neighbour lookup for queries outside the convex hull. The
//! triangulation depends only on the source points, so one
//! [`ScatteredInterpolator`] can sample any number of value fields defined
//! on those points.

use std::collections::HashSet;

use delaunator::{triangulate, Point};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use tracing::debug;

use crate::error::{FixedGridError, FixedGridResult};

/// Barycentric slack for points on a triangle edge.
const EDGE_EPSILON: f64 = 1e-10;

/// Where a query point falls relative to the source points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Inside the hull: vertices of the enclosing triangle and their weights.
    Linear {
        vertices: [usize; 3],
        weights: [f64; 3],
    },
    /// Outside the hull: index of the nearest source point.
    Nearest(usize),
}

impl Sample {
    pub fn is_extrapolated(&self) -> bool {
        matches!(self, Sample::Nearest(_))
    }
}

/// Delaunay triangulation plus k-d tree over a fixed set of points.
pub struct ScatteredInterpolator {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    locator: TriangleLocator,
    nearest: ImmutableKdTree<f64, 2>,
}

impl ScatteredInterpolator {
    /// Triangulate `points`.
    ///
    /// Fails with [`FixedGridError::DegenerateLookupTable`] when there are
    /// fewer than three distinct points, any point is not finite, or all
    /// points are collinear.
    pub fn new(points: Vec<[f64; 2]>) -> FixedGridResult<Self> {
        if let Some(bad) = points.iter().find(|p| !(p[0].is_finite() && p[1].is_finite())) {
            return Err(FixedGridError::DegenerateLookupTable(format!(
                "non-finite point {:?}",
                bad
            )));
        }

        let distinct: HashSet<[u64; 2]> = points
            .iter()
            .map(|p| [p[0].to_bits(), p[1].to_bits()])
            .collect();
        if distinct.len() < 3 {
            return Err(FixedGridError::DegenerateLookupTable(format!(
                "{} distinct points, need at least 3",
                distinct.len()
            )));
        }

        let delaunay_points: Vec<Point> = points
            .iter()
            .map(|p| Point { x: p[0], y: p[1] })
            .collect();
        let triangulation = triangulate(&delaunay_points);
        let triangles: Vec<[usize; 3]> = triangulation
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        if triangles.is_empty() {
            return Err(FixedGridError::DegenerateLookupTable(
                "points are collinear".to_string(),
            ));
        }

        let locator = TriangleLocator::build(&points, &triangles);
        let nearest = ImmutableKdTree::new_from_slice(&points);

        debug!(
            points = points.len(),
            triangles = triangles.len(),
            "Built scattered interpolator"
        );

        Ok(Self {
            points,
            triangles,
            locator,
            nearest,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Enclosing triangle and barycentric weights, or `None` outside the hull.
    pub fn locate(&self, query: [f64; 2]) -> Option<([usize; 3], [f64; 3])> {
        if !(query[0].is_finite() && query[1].is_finite()) {
            return None;
        }
        self.locator.candidates(query).iter().find_map(|&t| {
            let tri = self.triangles[t as usize];
            barycentric(
                query,
                self.points[tri[0]],
                self.points[tri[1]],
                self.points[tri[2]],
            )
            .map(|w| (tri, w))
        })
    }

    /// Index of the source point nearest to `query`.
    pub fn nearest(&self, query: [f64; 2]) -> usize {
        self.nearest.nearest_one::<SquaredEuclidean>(&query).item as usize
    }

    /// Linear sample inside the hull, nearest-neighbour outside it.
    pub fn sample(&self, query: [f64; 2]) -> Sample {
        match self.locate(query) {
            Some((vertices, weights)) => Sample::Linear { vertices, weights },
            None => Sample::Nearest(self.nearest(query)),
        }
    }

    /// Linear interpolation of `values`; NaN outside the hull.
    pub fn interpolate_linear(&self, values: &[f64], query: [f64; 2]) -> f64 {
        match self.locate(query) {
            Some((vertices, weights)) => weighted(values, vertices, weights),
            None => f64::NAN,
        }
    }

    /// Linear interpolation of `values`, falling back to the nearest source
    /// value wherever the linear result is NaN.
    pub fn interpolate(&self, values: &[f64], query: [f64; 2]) -> f64 {
        let linear = self.interpolate_linear(values, query);
        if linear.is_nan() && query[0].is_finite() && query[1].is_finite() {
            values[self.nearest(query)]
        } else {
            linear
        }
    }
}

#[inline]
pub(crate) fn weighted(values: &[f64], vertices: [usize; 3], weights: [f64; 3]) -> f64 {
    values[vertices[0]] * weights[0]
        + values[vertices[1]] * weights[1]
        + values[vertices[2]] * weights[2]
}

/// Barycentric weights of `p` in triangle `abc`, or `None` if outside.
fn barycentric(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<[f64; 3]> {
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if det == 0.0 {
        return None;
    }

    let l1 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
    let l2 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
    let l3 = 1.0 - l1 - l2;

    if l1 >= -EDGE_EPSILON && l2 >= -EDGE_EPSILON && l3 >= -EDGE_EPSILON {
        Some([l1, l2, l3])
    } else {
        None
    }
}

/// Uniform bucket grid over triangle bounding boxes.
///
/// Buckets are stored CSR-style: `offsets[b]..offsets[b + 1]` indexes
/// `entries` for bucket `b`.
struct TriangleLocator {
    min: [f64; 2],
    max: [f64; 2],
    cell: [f64; 2],
    nx: usize,
    ny: usize,
    offsets: Vec<usize>,
    entries: Vec<u32>,
}

impl TriangleLocator {
    fn build(points: &[[f64; 2]], triangles: &[[usize; 3]]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for tri in triangles {
            for &v in tri {
                for axis in 0..2 {
                    min[axis] = min[axis].min(points[v][axis]);
                    max[axis] = max[axis].max(points[v][axis]);
                }
            }
        }

        let side = ((triangles.len() as f64 / 2.0).sqrt().ceil() as usize).max(1);
        let (nx, ny) = (side, side);
        let cell = [
            ((max[0] - min[0]) / nx as f64).max(f64::MIN_POSITIVE),
            ((max[1] - min[1]) / ny as f64).max(f64::MIN_POSITIVE),
        ];

        let mut locator = Self {
            min,
            max,
            cell,
            nx,
            ny,
            offsets: vec![0; nx * ny + 1],
            entries: Vec::new(),
        };

        let ranges: Vec<(usize, usize, usize, usize)> = triangles
            .iter()
            .map(|tri| {
                let (x0, x1) = span(tri.map(|v| points[v][0]));
                let (y0, y1) = span(tri.map(|v| points[v][1]));
                (
                    locator.bucket_x(x0),
                    locator.bucket_x(x1),
                    locator.bucket_y(y0),
                    locator.bucket_y(y1),
                )
            })
            .collect();

        // Count, prefix-sum, then fill
        for &(ix0, ix1, iy0, iy1) in &ranges {
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    locator.offsets[iy * nx + ix + 1] += 1;
                }
            }
        }
        for b in 0..nx * ny {
            locator.offsets[b + 1] += locator.offsets[b];
        }
        let mut cursor = locator.offsets.clone();
        locator.entries = vec![0; locator.offsets[nx * ny]];
        for (t, &(ix0, ix1, iy0, iy1)) in ranges.iter().enumerate() {
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    let b = iy * nx + ix;
                    locator.entries[cursor[b]] = t as u32;
                    cursor[b] += 1;
                }
            }
        }

        locator
    }

    #[inline]
    fn bucket_x(&self, x: f64) -> usize {
        (((x - self.min[0]) / self.cell[0]) as usize).min(self.nx - 1)
    }

    #[inline]
    fn bucket_y(&self, y: f64) -> usize {
        (((y - self.min[1]) / self.cell[1]) as usize).min(self.ny - 1)
    }

    /// Triangles whose bounding box overlaps the bucket holding `p`.
    fn candidates(&self, p: [f64; 2]) -> &[u32] {
        if p[0] < self.min[0] || p[0] > self.max[0] || p[1] < self.min[1] || p[1] > self.max[1] {
            return &[];
        }
        let b = self.bucket_y(p[1]) * self.nx + self.bucket_x(p[0]);
        &self.entries[self.offsets[b]..self.offsets[b + 1]]
    }
}

#[inline]
fn span(values: [f64; 3]) -> (f64, f64) {
    (
        values[0].min(values[1]).min(values[2]),
        values[0].max(values[1]).max(values[2]),
    )
}
