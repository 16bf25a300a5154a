#![forbid(unsafe_code)]

//! Facade crate re-exporting the lidarguard workspace.
//!
//! The pipeline turns raw lidar frames into a ground-plane partition plus
//! clustered, bounding-boxed obstacle candidates:
//!
//! ```
//! use lidarguard::prelude::*;
//!
//! let mut sensor = LidarSensor::new(LidarConfig::default(), demo_obstacles());
//! let raw = sensor.scan();
//! let detector = ObstacleDetector::new(PipelineConfig::default());
//! let detection = detector.detect(&raw).unwrap();
//! for obstacle in &detection.obstacles {
//!     println!("obstacle {}: {} points", obstacle.id, obstacle.cloud.len());
//! }
//! ```

pub use lidarguard_core as core;
pub use lidarguard_filters as filters;
pub use lidarguard_io as io;
pub use lidarguard_pipeline as pipeline;
pub use lidarguard_segmentation as segmentation;
pub use lidarguard_sensor as sensor;
pub use lidarguard_spatial as spatial;

pub mod prelude {
    pub use lidarguard_core::{Aabb, Point, PointCloud, PointXYZ, PointXYZI};
    pub use lidarguard_filters::{crop_box, filter_cloud, voxel_downsample};
    pub use lidarguard_io::{FrameStream, PcdError};
    pub use lidarguard_pipeline::{
        Detection, FramePolicy, ObstacleDetector, PipelineConfig, RenderSink, ReplayLoop,
    };
    pub use lidarguard_segmentation::{euclidean_cluster, segment_plane_seeded, PlaneModel};
    pub use lidarguard_sensor::{demo_obstacles, GroundPlane, LidarConfig, LidarSensor, Obstacle};
    pub use lidarguard_spatial::KdTree;
}
