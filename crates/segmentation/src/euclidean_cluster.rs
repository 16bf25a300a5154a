use lidarguard_core::{Point, PointCloud};
use lidarguard_spatial::KdTree;
use std::collections::VecDeque;

/// Euclidean region-growing clustering.
///
/// The cloud is traversed in stored order; each point not yet assigned seeds
/// a new cluster, grown breadth-first by pulling in every unvisited point
/// within `distance_tolerance` of a point already in the cluster. Growth
/// always runs to exhaustion; only then is the size window applied, so an
/// oversized connected component is discarded whole rather than split.
///
/// Clusters are emitted in the order their seed point was encountered, which
/// gives downstream consumers a stable zero-based id per cluster. Indices
/// within a cluster are sorted ascending.
///
/// Degenerate parameters (empty cloud, non-positive tolerance, `min_size` of
/// zero) yield no clusters.
pub fn euclidean_cluster<P: Point>(
    cloud: &PointCloud<P>,
    distance_tolerance: f32,
    min_size: usize,
    max_size: usize,
) -> Vec<Vec<usize>> {
    if cloud.is_empty() || distance_tolerance <= 0.0 || min_size == 0 {
        return Vec::new();
    }

    let tree = KdTree::from_cloud(cloud);
    let n = cloud.len();
    let mut visited = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }

        let mut cluster = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        visited[seed] = true;

        while let Some(current) = queue.pop_front() {
            cluster.push(current);

            let neighbors = tree.radius_search(&cloud.position(current), distance_tolerance);
            for neighbor in neighbors {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        if cluster.len() >= min_size && cluster.len() <= max_size {
            cluster.sort_unstable();
            clusters.push(cluster);
        }
    }

    clusters
}
