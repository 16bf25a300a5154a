use crate::config::PipelineConfig;
use lidarguard_core::{Aabb, Point, PointCloud};
use lidarguard_filters::filter_cloud;
use lidarguard_segmentation::{
    euclidean_cluster, segment_plane, segment_plane_seeded, PlaneModel, SegmentationError,
};

/// An RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Colors cycled over obstacles by `id % 3`.
pub const PALETTE: [Color; 3] = [
    Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    },
    Color {
        r: 1.0,
        g: 1.0,
        b: 0.0,
    },
    Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    },
];

/// One obstacle candidate: its cluster cloud and tight bounding box.
///
/// `id` is zero-based in cluster-emission order and stable for a given input
/// frame and configuration.
#[derive(Debug, Clone)]
pub struct DetectedObstacle<P: Point> {
    pub id: usize,
    pub cloud: PointCloud<P>,
    pub bbox: Aabb,
    pub color: Color,
}

/// Per-frame pipeline output handed to the render sink.
#[derive(Debug, Clone)]
pub struct Detection<P: Point> {
    /// Ground-plane inliers (the road surface).
    pub ground: PointCloud<P>,
    pub plane: PlaneModel,
    pub obstacles: Vec<DetectedObstacle<P>>,
}

/// The frame processor: crop/downsample, ground segmentation, clustering,
/// and box extraction, in that order.
///
/// Each call is a pure transformation of its input cloud; the detector keeps
/// no state between frames.
#[derive(Debug, Clone, Default)]
pub struct ObstacleDetector {
    config: PipelineConfig,
}

impl ObstacleDetector {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline on one raw frame.
    ///
    /// # Errors
    ///
    /// [`SegmentationError::InsufficientData`] if fewer than 3 points survive
    /// filtering; the replay loop treats that as "no result for this frame".
    pub fn detect<P: Point>(
        &self,
        cloud: &PointCloud<P>,
    ) -> Result<Detection<P>, SegmentationError> {
        let filter = &self.config.filter;
        let filtered = filter_cloud(cloud, filter.leaf_size, filter.crop_min, filter.crop_max);

        let plane = &self.config.plane;
        let segmented = match plane.seed {
            Some(seed) => segment_plane_seeded(
                &filtered,
                plane.max_iterations,
                plane.distance_threshold,
                seed,
            )?,
            None => segment_plane(&filtered, plane.max_iterations, plane.distance_threshold)?,
        };

        let cluster = &self.config.cluster;
        let clusters = euclidean_cluster(
            &segmented.outliers,
            cluster.tolerance,
            cluster.min_size,
            cluster.max_size,
        );

        let obstacles = clusters
            .iter()
            .enumerate()
            .map(|(id, indices)| {
                let cloud = segmented.outliers.select(indices);
                let bbox = cloud.aabb();
                DetectedObstacle {
                    id,
                    cloud,
                    bbox,
                    color: PALETTE[id % PALETTE.len()],
                }
            })
            .collect();

        Ok(Detection {
            ground: segmented.inliers,
            plane: segmented.model,
            obstacles,
        })
    }
}
