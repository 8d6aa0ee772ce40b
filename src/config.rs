//! Player configuration
//!
//! Settings for the analysis window, the default echo effect and the display
//! loop. Stored as JSON; every field falls back to its default when missing.

use crate::analysis::WindowPolicy;
use crate::sound::effects::EchoEffect;
use crate::{Result, WaveError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default speed multiplier applied by one `+` / `-` command
pub const DEFAULT_SPEED_STEP: f32 = 1.1;

/// Default delay between display refreshes in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default width of terminal volume bars in characters
pub const DEFAULT_BAR_WIDTH: usize = 20;

/// Player configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Forward-average window is `sample_rate / window_divisor` samples (default: 4)
    pub window_divisor: u32,

    /// Echo lag in interleaved values used by the modify command (default: 300000)
    pub echo_lag: usize,

    /// Multiplier applied by one speed-up command; speed-down divides by it (default: 1.1)
    pub speed_step: f32,

    /// Delay between position polls in the display loop (default: 10 ms)
    pub poll_interval_ms: u64,

    /// Width of rendered volume bars (default: 20)
    pub bar_width: usize,
}

impl PlayerConfig {
    /// Configuration using the tenth-of-a-second window and a faster refresh
    pub fn responsive() -> Self {
        PlayerConfig {
            window_divisor: WindowPolicy::TENTH_SECOND.divisor(),
            poll_interval_ms: 5,
            ..Self::default()
        }
    }

    /// Window policy derived from `window_divisor`
    pub fn window_policy(&self) -> WindowPolicy {
        WindowPolicy::new(self.window_divisor)
    }

    /// Echo effect derived from `echo_lag`
    pub fn echo(&self) -> EchoEffect {
        EchoEffect::new(self.echo_lag)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.window_divisor == 0 {
            return Err(WaveError::ConfigError(
                "window_divisor must be at least 1".into(),
            ));
        }
        if !self.speed_step.is_finite() || self.speed_step <= 0.0 {
            return Err(WaveError::ConfigError(format!(
                "speed_step must be a positive number, got {}",
                self.speed_step
            )));
        }
        if self.bar_width == 0 {
            return Err(WaveError::ConfigError("bar_width must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(text)
            .map_err(|e| WaveError::ConfigError(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            WaveError::ConfigError(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WaveError::ConfigError(format!("failed to serialize: {}", e)))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            window_divisor: WindowPolicy::QUARTER_SECOND.divisor(),
            echo_lag: EchoEffect::DEFAULT_LAG,
            speed_step: DEFAULT_SPEED_STEP,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}
