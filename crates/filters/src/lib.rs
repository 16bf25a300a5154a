#![forbid(unsafe_code)]

pub mod crop;
pub mod voxel_downsample;

pub use crop::{crop_box, crop_box_inverse};
pub use voxel_downsample::voxel_downsample;

use lidarguard_core::{Point, PointCloud};

/// Two-stage frame reduction: voxel-grid downsample, then crop to the
/// region of interest.
///
/// Every surviving point lies inside `[min, max]`; the voxel stage makes the
/// result independent of input order.
pub fn filter_cloud<P: Point>(
    cloud: &PointCloud<P>,
    leaf_size: f32,
    min: [f32; 3],
    max: [f32; 3],
) -> PointCloud<P> {
    let downsampled = voxel_downsample(cloud, leaf_size);
    crop_box(&downsampled, min, max)
}
