//! Headless replay driver: recorded frames or a synthetic scan, through the
//! detection pipeline, into the log sink.

use clap::{Parser, ValueEnum};
use lidarguard_io::FrameStream;
use lidarguard_pipeline::{
    FramePolicy, LogSink, ObstacleDetector, PipelineConfig, RenderSink, ReplayLoop,
};
use lidarguard_sensor::{demo_obstacles, LidarConfig, LidarSensor};
use log::info;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Log a failed frame and move on (continuous display use).
    Skip,
    /// Abort the run on the first failed frame (batch use).
    Fatal,
}

impl From<PolicyArg> for FramePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => FramePolicy::SkipAndContinue,
            PolicyArg::Fatal => FramePolicy::Fatal,
        }
    }
}

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay lidar frames through the obstacle-detection pipeline", version)]
struct Cli {
    /// Directory of recorded .pcd frames. Omit to run the synthetic sensor.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// YAML pipeline configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do when a frame fails to load.
    #[arg(long, value_enum, default_value = "skip")]
    policy: PolicyArg,

    /// Number of frames to process before exiting.
    #[arg(long, default_value_t = 100)]
    max_frames: usize,

    /// Seed for the synthetic sensor (0 draws entropy).
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml(path)?,
        None => PipelineConfig::default(),
    };
    let detector = ObstacleDetector::new(config);
    let mut sink = LogSink;

    match &cli.frames {
        Some(dir) => {
            let stream = FrameStream::from_dir(dir)?;
            info!("replaying {} recorded frames from {}", stream.len(), dir.display());

            let mut replay = ReplayLoop::new(stream, detector, cli.policy.into());
            let cancel = AtomicBool::new(false);
            let stats = replay.run(&mut sink, &cancel, cli.max_frames)?;
            info!(
                "done: {} frames processed, {} skipped",
                stats.processed, stats.skipped
            );
        }
        None => {
            // The sensor lives on this stack frame and nowhere else.
            let sensor_config = LidarConfig {
                seed: cli.seed,
                ..LidarConfig::default()
            };
            let mut sensor = LidarSensor::new(sensor_config, demo_obstacles());
            info!("no frame directory given, scanning a synthetic scene");

            for frame_index in 0..cli.max_frames {
                let raw = sensor.scan();
                match detector.detect(&raw) {
                    Ok(detection) => sink.draw(frame_index, &detection),
                    Err(err) => log::warn!("frame {}: no detection ({})", frame_index, err),
                }
            }
        }
    }

    Ok(())
}
