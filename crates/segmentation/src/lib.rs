#![forbid(unsafe_code)]

pub mod euclidean_cluster;
pub mod ransac_plane;

pub use euclidean_cluster::euclidean_cluster;
pub use ransac_plane::{
    segment_plane, segment_plane_seeded, PlaneModel, PlaneSegmentation, SegmentationError,
};
