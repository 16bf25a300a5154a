use crate::detector::ObstacleDetector;
use crate::render::RenderSink;
use lidarguard_core::PointXYZI;
use lidarguard_io::{FrameError, FrameStream};
use lidarguard_segmentation::SegmentationError;
use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
}

/// What to do when the frame source fails to produce a frame.
///
/// A continuous display loop wants [`SkipAndContinue`]: log, advance, keep
/// the stream alive. A one-shot batch job wants [`Fatal`].
///
/// [`SkipAndContinue`]: FramePolicy::SkipAndContinue
/// [`Fatal`]: FramePolicy::Fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePolicy {
    SkipAndContinue,
    Fatal,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Frames that produced a detection and reached the sink.
    pub processed: usize,
    /// Frames dropped by a load failure or a stage failure.
    pub skipped: usize,
}

/// Drives the cyclic frame stream through the detector into a render sink,
/// one frame at a time.
///
/// The cancel flag is checked between frames only; a single frame is cheap
/// enough that cancellation never needs to interrupt mid-computation. Stage
/// failures always degrade to "no result for this frame"; frame *load*
/// failures follow the configured [`FramePolicy`].
pub struct ReplayLoop {
    stream: FrameStream,
    detector: ObstacleDetector,
    policy: FramePolicy,
}

impl ReplayLoop {
    pub fn new(stream: FrameStream, detector: ObstacleDetector, policy: FramePolicy) -> Self {
        Self {
            stream,
            detector,
            policy,
        }
    }

    /// Process up to `max_frames` frames (the stream itself never ends).
    pub fn run(
        &mut self,
        sink: &mut dyn RenderSink<PointXYZI>,
        cancel: &AtomicBool,
        max_frames: usize,
    ) -> Result<ReplayStats, PipelineError> {
        let mut stats = ReplayStats::default();

        for _ in 0..max_frames {
            if cancel.load(Ordering::Relaxed) {
                break;
            }

            let frame = match self.stream.next_frame() {
                Ok(frame) => frame,
                Err(err) => match self.policy {
                    FramePolicy::SkipAndContinue => {
                        warn!("skipping frame: {}", err);
                        stats.skipped += 1;
                        continue;
                    }
                    FramePolicy::Fatal => return Err(err.into()),
                },
            };

            match self.detector.detect(&frame.cloud) {
                Ok(detection) => {
                    sink.draw(frame.index, &detection);
                    stats.processed += 1;
                }
                Err(err) => {
                    warn!("frame {}: no detection ({})", frame.index, err);
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::{FramePolicy, ReplayLoop};
    use crate::config::PipelineConfig;
    use crate::detector::ObstacleDetector;
    use crate::render::CollectSink;
    use lidarguard_core::{PointCloud, PointXYZI};
    use lidarguard_io::{write_pcd, FrameStream};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    fn ground_frame() -> PointCloud<PointXYZI> {
        let mut cloud = PointCloud::new();
        for i in 0..10 {
            for j in 0..10 {
                cloud.push(PointXYZI::new(i as f32, j as f32 - 5.0, 0.0, 0.1));
            }
        }
        cloud
    }

    fn seeded_detector() -> ObstacleDetector {
        let mut config = PipelineConfig::default();
        config.plane.seed = Some(42);
        ObstacleDetector::new(config)
    }

    #[test]
    fn replay_processes_and_wraps() {
        let dir = tempdir().unwrap();
        for i in 0..2 {
            write_pcd(dir.path().join(format!("{:02}.pcd", i)), &ground_frame()).unwrap();
        }

        let stream = FrameStream::from_dir(dir.path()).unwrap();
        let mut replay = ReplayLoop::new(stream, seeded_detector(), FramePolicy::SkipAndContinue);

        let mut sink = CollectSink::default();
        let stats = replay
            .run(&mut sink, &AtomicBool::new(false), 5)
            .unwrap();

        assert_eq!(stats.processed, 5);
        let indices: Vec<usize> = sink.frames.iter().map(|f| f.0).collect();
        assert_eq!(indices, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn corrupt_frame_is_skipped_under_skip_policy() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("00.pcd"), "garbage").unwrap();
        write_pcd(dir.path().join("01.pcd"), &ground_frame()).unwrap();

        let stream = FrameStream::from_dir(dir.path()).unwrap();
        let mut replay = ReplayLoop::new(stream, seeded_detector(), FramePolicy::SkipAndContinue);

        let mut sink = CollectSink::default();
        let stats = replay
            .run(&mut sink, &AtomicBool::new(false), 2)
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(sink.frames, vec![(1, 0)]);
    }

    #[test]
    fn corrupt_frame_is_fatal_under_fatal_policy() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("00.pcd"), "garbage").unwrap();

        let stream = FrameStream::from_dir(dir.path()).unwrap();
        let mut replay = ReplayLoop::new(stream, seeded_detector(), FramePolicy::Fatal);

        let mut sink = CollectSink::default();
        assert!(replay.run(&mut sink, &AtomicBool::new(false), 2).is_err());
    }

    #[test]
    fn cancel_flag_stops_between_frames() {
        let dir = tempdir().unwrap();
        write_pcd(dir.path().join("00.pcd"), &ground_frame()).unwrap();

        let stream = FrameStream::from_dir(dir.path()).unwrap();
        let mut replay = ReplayLoop::new(stream, seeded_detector(), FramePolicy::SkipAndContinue);

        let cancel = AtomicBool::new(false);
        cancel.store(true, Ordering::Relaxed);
        let mut sink = CollectSink::default();
        let stats = replay.run(&mut sink, &cancel, 100).unwrap();
        assert_eq!(stats.processed, 0);
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn undersized_frame_degrades_to_no_result() {
        let dir = tempdir().unwrap();
        let mut tiny = PointCloud::new();
        tiny.push(PointXYZI::new(0.0, 0.0, 0.0, 0.0));
        write_pcd(dir.path().join("00.pcd"), &tiny).unwrap();

        let stream = FrameStream::from_dir(dir.path()).unwrap();
        // Fatal policy only governs load errors; stage failures still skip.
        let mut replay = ReplayLoop::new(stream, seeded_detector(), FramePolicy::Fatal);

        let mut sink = CollectSink::default();
        let stats = replay.run(&mut sink, &AtomicBool::new(false), 1).unwrap();
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.skipped, 1);
    }
}
