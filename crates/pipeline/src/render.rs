use crate::detector::Detection;
use lidarguard_core::Point;
use log::{debug, info};

/// Where detections go. Drawing itself (windowing, cameras, geometry
/// upload) lives outside this workspace; implementors receive one call per
/// processed frame.
pub trait RenderSink<P: Point> {
    fn draw(&mut self, frame_index: usize, detection: &Detection<P>);
}

/// Headless sink that reports detections through the logger.
#[derive(Debug, Default)]
pub struct LogSink;

impl<P: Point> RenderSink<P> for LogSink {
    fn draw(&mut self, frame_index: usize, detection: &Detection<P>) {
        info!(
            "frame {}: {} road points, {} obstacles",
            frame_index,
            detection.ground.len(),
            detection.obstacles.len()
        );
        for obstacle in &detection.obstacles {
            debug!(
                "  obstacle {}: {} points, box {:?} .. {:?}",
                obstacle.id,
                obstacle.cloud.len(),
                obstacle.bbox.min,
                obstacle.bbox.max
            );
        }
    }
}

/// Test/diagnostic sink that records per-frame summaries.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub frames: Vec<(usize, usize)>,
}

impl<P: Point> RenderSink<P> for CollectSink {
    fn draw(&mut self, frame_index: usize, detection: &Detection<P>) {
        self.frames.push((frame_index, detection.obstacles.len()));
    }
}
