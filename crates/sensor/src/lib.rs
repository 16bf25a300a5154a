#![forbid(unsafe_code)]

pub mod lidar;
pub mod scene;

pub use lidar::{demo_obstacles, LidarConfig, LidarSensor};
pub use scene::{GroundPlane, Obstacle};
