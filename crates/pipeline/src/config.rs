//! Pipeline configuration.
//!
//! Every stage parameter is caller-supplied; nothing is hard-coded in the
//! processing code. Defaults correspond to a city-block recording processed
//! at 0.2 m resolution.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Voxel + crop stage parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Voxel cell edge length in meters.
    #[serde(default = "default_leaf_size")]
    pub leaf_size: f32,

    /// Lower corner of the region of interest.
    #[serde(default = "default_crop_min")]
    pub crop_min: [f32; 3],

    /// Upper corner of the region of interest.
    #[serde(default = "default_crop_max")]
    pub crop_max: [f32; 3],
}

fn default_leaf_size() -> f32 {
    0.2
}

fn default_crop_min() -> [f32; 3] {
    [-10.0, -7.0, -2.0]
}

fn default_crop_max() -> [f32; 3] {
    [20.0, 7.0, 5.0]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            leaf_size: default_leaf_size(),
            crop_min: default_crop_min(),
            crop_max: default_crop_max(),
        }
    }
}

/// RANSAC ground-plane parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaneConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Inlier distance threshold in meters.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,

    /// Fixed RANSAC seed. `None` draws a fresh seed per frame; set it for
    /// reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_iterations() -> usize {
    50
}

fn default_distance_threshold() -> f32 {
    0.15
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            distance_threshold: default_distance_threshold(),
            seed: None,
        }
    }
}

/// Euclidean clustering parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Neighbor distance tolerance in meters.
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    #[serde(default = "default_min_size")]
    pub min_size: usize,

    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_tolerance() -> f32 {
    0.5
}

fn default_min_size() -> usize {
    5
}

fn default_max_size() -> usize {
    1000
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub plane: PlaneConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl PipelineConfig {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
