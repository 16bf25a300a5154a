use lidarguard_core::{Point, PointCloud};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("plane segmentation needs at least 3 points, cloud has {0}")]
    InsufficientData(usize),
}

/// A 3D plane `n . x + d = 0` with `n` a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub normal: [f32; 3],
    pub d: f32,
}

impl PlaneModel {
    /// Absolute point-to-plane distance. Assumes `normal` is unit length.
    #[inline]
    pub fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (self.normal[0] * point[0] + self.normal[1] * point[1] + self.normal[2] * point[2] + self.d)
            .abs()
    }
}

impl Default for PlaneModel {
    fn default() -> Self {
        Self {
            normal: [0.0, 0.0, 1.0],
            d: 0.0,
        }
    }
}

/// The exact partition produced by [`segment_plane_seeded`]: every input
/// point lands in `inliers` (the fitted plane, i.e. the road) or `outliers`
/// (everything else), never both.
#[derive(Debug, Clone)]
pub struct PlaneSegmentation<P: Point> {
    pub model: PlaneModel,
    pub outliers: PointCloud<P>,
    pub inliers: PointCloud<P>,
}

/// RANSAC plane fit with a non-deterministic seed.
///
/// Convenience wrapper over [`segment_plane_seeded`]; use the seeded variant
/// for reproducible results.
pub fn segment_plane<P: Point>(
    cloud: &PointCloud<P>,
    max_iterations: usize,
    distance_threshold: f32,
) -> Result<PlaneSegmentation<P>, SegmentationError> {
    let seed = rand::thread_rng().next_u64();
    segment_plane_seeded(cloud, max_iterations, distance_threshold, seed)
}

/// RANSAC plane fit with a deterministic RNG seed.
///
/// Each iteration samples 3 distinct points, rejects collinear triples,
/// fits the plane through the rest, and scores it by the number of points
/// within `distance_threshold` perpendicular distance. The model with the
/// most inliers wins; ties keep the first one found. All `max_iterations`
/// iterations are scored (no early exit), so a seeded call is a pure
/// function of its inputs.
///
/// Degenerate geometry: if every sampled triple is collinear, no model is
/// ever fit and the result carries the default plane with an *empty* inlier
/// set; callers must be prepared for `inliers.is_empty()`.
///
/// Large clouds are scored in parallel; the reduction orders candidates by
/// `(inlier count desc, iteration asc)`, so the parallel and sequential
/// paths pick the same winner.
///
/// # Errors
///
/// [`SegmentationError::InsufficientData`] if the cloud has fewer than 3
/// points. No partial result is produced.
pub fn segment_plane_seeded<P: Point>(
    cloud: &PointCloud<P>,
    max_iterations: usize,
    distance_threshold: f32,
    seed: u64,
) -> Result<PlaneSegmentation<P>, SegmentationError> {
    let n = cloud.len();
    if n < 3 {
        return Err(SegmentationError::InsufficientData(n));
    }

    let points: Vec<[f32; 3]> = cloud.positions().collect();

    // Pre-generate the samples so the iteration order (and thus the
    // first-found tie-break) is fixed before any scoring happens.
    let mut rng = StdRng::seed_from_u64(seed);
    let samples: Vec<(usize, usize, usize)> = (0..max_iterations)
        .filter_map(|_| sample_three_distinct(n, &mut rng))
        .collect();

    let use_parallel = n >= 10_000 && samples.len() >= 16;

    // Candidate = (inlier count, iteration index, model). Larger count wins,
    // smaller iteration breaks ties.
    let best: Option<(usize, usize, PlaneModel)> = if use_parallel {
        samples
            .par_iter()
            .enumerate()
            .filter_map(|(iter, &(i0, i1, i2))| {
                let model = fit_plane(&points[i0], &points[i1], &points[i2])?;
                let count = count_inliers(&points, &model, distance_threshold);
                Some((count, iter, model))
            })
            .reduce_with(|a, b| {
                if b.0 > a.0 || (b.0 == a.0 && b.1 < a.1) {
                    b
                } else {
                    a
                }
            })
    } else {
        let mut best: Option<(usize, usize, PlaneModel)> = None;
        for (iter, &(i0, i1, i2)) in samples.iter().enumerate() {
            let model = match fit_plane(&points[i0], &points[i1], &points[i2]) {
                Some(m) => m,
                None => continue,
            };
            let count = count_inliers(&points, &model, distance_threshold);
            if best.map_or(true, |(bc, _, _)| count > bc) {
                best = Some((count, iter, model));
            }
        }
        best
    };

    let (model, inlier_indices) = match best {
        Some((_, _, model)) => {
            let inliers: Vec<usize> = (0..n)
                .filter(|&j| model.distance_to_point(&points[j]) <= distance_threshold)
                .collect();
            (model, inliers)
        }
        // Every triple was collinear: best-effort empty result.
        None => (PlaneModel::default(), Vec::new()),
    };

    Ok(PlaneSegmentation {
        model,
        outliers: cloud.select_inverse(&inlier_indices),
        inliers: cloud.select(&inlier_indices),
    })
}

#[inline]
fn count_inliers(points: &[[f32; 3]], model: &PlaneModel, threshold: f32) -> usize {
    points
        .iter()
        .filter(|p| model.distance_to_point(p) <= threshold)
        .count()
}

/// Samples 3 distinct indices in `[0, n)`, retrying collisions a bounded
/// number of times.
fn sample_three_distinct(n: usize, rng: &mut StdRng) -> Option<(usize, usize, usize)> {
    if n < 3 {
        return None;
    }
    let i0 = rng.gen_range(0..n);
    let mut i1 = rng.gen_range(0..n);
    let mut attempts = 0;
    while i1 == i0 {
        if attempts > 100 {
            return None;
        }
        i1 = rng.gen_range(0..n);
        attempts += 1;
    }
    let mut i2 = rng.gen_range(0..n);
    attempts = 0;
    while i2 == i0 || i2 == i1 {
        if attempts > 100 {
            return None;
        }
        i2 = rng.gen_range(0..n);
        attempts += 1;
    }
    Some((i0, i1, i2))
}

/// Plane through 3 points via the cross product of two edge vectors;
/// `None` if the points are collinear.
fn fit_plane(p0: &[f32; 3], p1: &[f32; 3], p2: &[f32; 3]) -> Option<PlaneModel> {
    let v1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let v2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];

    let nx = v1[1] * v2[2] - v1[2] * v2[1];
    let ny = v1[2] * v2[0] - v1[0] * v2[2];
    let nz = v1[0] * v2[1] - v1[1] * v2[0];

    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len < 1e-10 {
        return None;
    }

    let normal = [nx / len, ny / len, nz / len];
    let d = -(normal[0] * p0[0] + normal[1] * p0[1] + normal[2] * p0[2]);
    Some(PlaneModel { normal, d })
}
