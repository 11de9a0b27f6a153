// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration, loaded from RON.

use anyhow::Context;
use prism_telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// A configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON text does not describe an [`EngineConfig`].
    #[error("Invalid engine configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The surface has a zero dimension.
    #[error("Surface must not be empty (got {width}x{height})")]
    EmptySurface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The telemetry interval is not a positive number of seconds.
    #[error("Telemetry interval must be positive (got {0})")]
    InvalidTelemetryInterval(f32),
}

/// Size of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl SurfaceConfig {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Everything the frame loop and its host need to start.
///
/// Missing fields take their defaults:
///
/// ```
/// use prism_sdk::config::EngineConfig;
///
/// let config = EngineConfig::from_ron_str("(frame_rate_hz: 30, max_frames: Some(10))").unwrap();
/// assert_eq!(config.frame_rate_hz, 30);
/// assert_eq!(config.surface.width, 640);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames per second. `0` runs unthrottled.
    pub frame_rate_hz: u32,
    /// Stop after this many frames. `None` runs until the application exits.
    pub max_frames: Option<u64>,
    /// The rendering surface.
    pub surface: SurfaceConfig,
    /// Seconds between two telemetry summaries.
    pub telemetry_interval_secs: f32,
    /// Logger setup.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            max_frames: None,
            surface: SurfaceConfig::default(),
            telemetry_interval_secs: 1.0,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config '{}'", path.display()))?;
        Self::from_ron_str(&text).with_context(|| format!("Failed to load config '{}'", path.display()))
    }

    /// Serializes the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let SurfaceConfig { width, height } = self.surface;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptySurface { width, height });
        }
        if !(self.telemetry_interval_secs.is_finite() && self.telemetry_interval_secs > 0.0) {
            return Err(ConfigError::InvalidTelemetryInterval(self.telemetry_interval_secs));
        }
        Ok(())
    }

    /// Time budget of one frame, or `None` when unthrottled.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_rate_hz > 0).then(|| Duration::from_secs(1) / self.frame_rate_hz)
    }

    /// Time between two telemetry summaries.
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_secs_f32(self.telemetry_interval_secs)
    }
}
