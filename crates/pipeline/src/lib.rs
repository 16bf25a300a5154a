#![forbid(unsafe_code)]

pub mod config;
pub mod detector;
pub mod render;
pub mod replay;

pub use config::{ClusterConfig, ConfigError, FilterConfig, PipelineConfig, PlaneConfig};
pub use detector::{Color, DetectedObstacle, Detection, ObstacleDetector, PALETTE};
pub use render::{CollectSink, LogSink, RenderSink};
pub use replay::{FramePolicy, PipelineError, ReplayLoop, ReplayStats};
