use lidarguard_pipeline::{ObstacleDetector, PipelineConfig};
use lidarguard_sensor::{demo_obstacles, LidarConfig, LidarSensor};

fn main() {
    // Synthetic highway: three boxes around the sensor, flat ground.
    let sensor_config = LidarConfig {
        noise_stddev: 0.05,
        seed: 42,
        ..LidarConfig::default()
    };
    let mut sensor = LidarSensor::new(sensor_config, demo_obstacles());
    let raw = sensor.scan();
    println!("raw scan: {} points", raw.len());

    let mut config = PipelineConfig::default();
    config.plane.seed = Some(42);
    config.cluster.tolerance = 1.5;
    let detector = ObstacleDetector::new(config);

    let detection = detector.detect(&raw).expect("scan has enough points");
    println!("road: {} points", detection.ground.len());
    println!("obstacles: {}", detection.obstacles.len());

    for obstacle in &detection.obstacles {
        println!(
            "  obstacle {}: {} points, box min={:?} max={:?}",
            obstacle.id,
            obstacle.cloud.len(),
            obstacle.bbox.min,
            obstacle.bbox.max
        );
    }
}
