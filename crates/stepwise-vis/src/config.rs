//! Playback settings for the server binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stepwise_runners::{RandomArrayConfig, RandomGraphConfig};
use thiserror::Error;

use crate::playback::{DelayCurve, Speed};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings read from an optional JSON file. Missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial speed, 1-100.
    pub speed: Speed,
    /// Replaces the visualizer's own delay curve.
    pub delay_curve: Option<DelayCurve>,
    pub port: u16,
    /// Seed for generated inputs when no sub-config sets one.
    pub seed: u64,
    /// Random graph for the MST visualizers.
    pub graph: Option<RandomGraphConfig>,
    /// Random array for the sorting visualizers.
    pub array: Option<RandomArrayConfig>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            delay_curve: None,
            port: DEFAULT_PORT,
            seed: 0,
            graph: None,
            array: None,
        }
    }
}

impl PlaybackConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The `graph` section, or the default graph seeded with `seed`.
    pub fn graph_config(&self) -> RandomGraphConfig {
        self.graph.clone().unwrap_or_else(|| RandomGraphConfig {
            seed: self.seed,
            ..Default::default()
        })
    }

    /// The `array` section, or the default array seeded with `seed`.
    pub fn array_config(&self) -> RandomArrayConfig {
        self.array.clone().unwrap_or_else(|| RandomArrayConfig {
            seed: self.seed,
            ..Default::default()
        })
    }

    /// The override if set, else `default`.
    pub fn curve_or(&self, default: DelayCurve) -> DelayCurve {
        self.delay_curve.unwrap_or(default)
    }
}
