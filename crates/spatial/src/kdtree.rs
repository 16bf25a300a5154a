use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use lidarguard_core::{Point, PointCloud};
use std::num::NonZero;

/// Balanced spatial partition tree over a cloud's positions.
///
/// Built once per clustering pass on top of kiddo's `ImmutableKdTree`
/// (cache-optimized, immutable after construction). Stored `u32` indices map
/// back to the source cloud, so query results can be fed straight into
/// [`PointCloud::select`].
#[derive(Debug, Clone)]
pub struct KdTree {
    tree: ImmutableKdTree<f32, u32, 3, 32>,
    len: usize,
}

impl KdTree {
    pub fn from_cloud<P: Point>(cloud: &PointCloud<P>) -> Self {
        if cloud.is_empty() {
            return Self {
                tree: ImmutableKdTree::new_from_slice(&[]),
                len: 0,
            };
        }

        let positions: Vec<[f32; 3]> = cloud.positions().collect();
        Self {
            tree: ImmutableKdTree::new_from_slice(&positions),
            len: positions.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All indices within Euclidean distance `radius` of `query`, boundary
    /// inclusive, sorted ascending for deterministic traversal.
    ///
    /// kiddo's `within_unsorted` uses strict `<`, so the query radius is
    /// padded by an epsilon and the results post-filtered with `<=` to keep
    /// points sitting exactly on the boundary.
    ///
    /// Empty tree, non-positive or non-finite radius, and non-finite query
    /// coordinates all yield an empty result.
    pub fn radius_search(&self, query: &[f32; 3], radius: f32) -> Vec<usize> {
        if self.is_empty()
            || radius <= 0.0
            || !radius.is_finite()
            || !query.iter().all(|v| v.is_finite())
        {
            return Vec::new();
        }

        let radius_sq = radius * radius;
        let padded = radius_sq + f32::EPSILON * radius_sq.max(1.0);

        let mut indices: Vec<usize> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(query, padded)
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| nn.item as usize)
            .collect();

        indices.sort_unstable();
        indices
    }

    /// The `k` nearest neighbours of `query` as `(indices, distances)`,
    /// distances Euclidean and ascending. Returns everything if `k` exceeds
    /// the tree size, nothing for `k == 0` or a non-finite query.
    pub fn nearest(&self, query: &[f32; 3], k: usize) -> (Vec<usize>, Vec<f32>) {
        if k == 0 || self.is_empty() || !query.iter().all(|v| v.is_finite()) {
            return (Vec::new(), Vec::new());
        }

        let k = NonZero::new(k).unwrap();
        let found = self.tree.nearest_n::<SquaredEuclidean>(query, k);

        let mut indices = Vec::with_capacity(found.len());
        let mut distances = Vec::with_capacity(found.len());
        for nn in found {
            indices.push(nn.item as usize);
            distances.push(nn.distance.sqrt());
        }
        (indices, distances)
    }
}
