#![forbid(unsafe_code)]

pub mod bbox;
pub mod cloud;
pub mod point;
pub mod traits;

pub use bbox::Aabb;
pub use cloud::PointCloud;
pub use point::{PointXYZ, PointXYZI};
pub use traits::{HasIntensity, Point};
