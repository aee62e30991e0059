//! YAML run configuration.

use serde::Deserialize;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::coverage::ViewshedMode;
use crate::physics::viewshed::ViewshedParams;
use crate::terrain::sampler::DEFAULT_MAX_CONCURRENT_READS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub map: MapConfig,
    #[serde(default)]
    pub viewshed: ViewshedConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub dem_path: String,
    pub devices_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_output_path() -> String {
    "coverage.geojson".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewshedConfig {
    #[serde(default)]
    pub mode: ViewshedMode,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_points_per_line")]
    pub points_per_line: usize,
    #[serde(default = "default_receiver_height")]
    pub receiver_height_m: f64,
}

impl Default for ViewshedConfig {
    fn default() -> Self {
        Self {
            mode: ViewshedMode::default(),
            steps: default_steps(),
            points_per_line: default_points_per_line(),
            receiver_height_m: default_receiver_height(),
        }
    }
}

impl ViewshedConfig {
    pub fn params(&self) -> ViewshedParams {
        ViewshedParams {
            steps: self.steps,
            points_per_line: self.points_per_line,
            receiver_height_m: self.receiver_height_m,
        }
    }
}

fn default_steps() -> usize {
    ViewshedParams::default().steps
}

fn default_points_per_line() -> usize {
    ViewshedParams::default().points_per_line
}

fn default_receiver_height() -> f64 {
    ViewshedParams::default().receiver_height_m
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_max_reads")]
    pub max_concurrent_reads: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

fn default_max_reads() -> usize {
    DEFAULT_MAX_CONCURRENT_READS
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
