//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::SessionConfig;
use crate::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Session state machine settings
    #[serde(default)]
    pub session: SessionSettings,
    /// Rotary engine settings
    #[serde(default)]
    pub rotary: RotarySettings,
    /// Grid target engine settings
    #[serde(default)]
    pub grid: GridSettings,
    /// Scoring sink settings
    #[serde(default)]
    pub sink: SinkSettings,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Samples per batch; a flush fires when the buffer reaches this size
    pub capacity: usize,
    /// Minimum milliseconds between recorded samples
    pub tolerance_ms: u64,
    /// Milliseconds without an accepted sample before auto-disarm
    pub idle_timeout_ms: u64,
    /// Milliseconds after a flush completes before re-arming is allowed
    pub cooldown_ms: u64,
}

/// Rotary engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotarySettings {
    /// Wrap window upper bound, degrees; the previous angle must exceed it
    pub wrap_high_deg: f64,
    /// Wrap window lower bound, degrees; the current angle must fall below it
    pub wrap_low_deg: f64,
}

/// Grid target engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Targets per side of the square grid
    pub grid_size: usize,
    /// Arrival radius around a target, in pixels
    pub arrival_radius: f64,
}

/// Scoring sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSettings {
    /// Base URL of the scoring service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            capacity: 350,
            tolerance_ms: 1,
            idle_timeout_ms: 2000,
            cooldown_ms: 800,
        }
    }
}

impl Default for RotarySettings {
    fn default() -> Self {
        Self {
            wrap_high_deg: 300.0,
            wrap_low_deg: 60.0,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            grid_size: 3,
            arrival_radius: 20.0,
        }
    }
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SessionSettings {
    /// Convert to the controller's typed configuration.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            capacity: self.capacity,
            tolerance: Duration::from_millis(self.tolerance_ms),
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.session.capacity == 0 {
            return Err(crate::Error::Config(
                "session.capacity must be > 0".to_string(),
            ));
        }
        if self.session.idle_timeout_ms == 0 {
            return Err(crate::Error::Config(
                "session.idle_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.session.idle_timeout_ms <= self.session.tolerance_ms {
            return Err(crate::Error::Config(format!(
                "session.idle_timeout_ms ({}) must exceed tolerance_ms ({})",
                self.session.idle_timeout_ms, self.session.tolerance_ms
            )));
        }
        if !(0.0..360.0).contains(&self.rotary.wrap_low_deg)
            || !(0.0..360.0).contains(&self.rotary.wrap_high_deg)
            || self.rotary.wrap_low_deg >= self.rotary.wrap_high_deg
        {
            return Err(crate::Error::Config(format!(
                "rotary wrap window must satisfy 0 <= low < high < 360, got low {} high {}",
                self.rotary.wrap_low_deg, self.rotary.wrap_high_deg
            )));
        }
        if self.grid.grid_size < 2 {
            return Err(crate::Error::Config(format!(
                "grid.grid_size must be >= 2, got {}",
                self.grid.grid_size
            )));
        }
        if self.grid.arrival_radius <= 0.0 {
            return Err(crate::Error::Config(format!(
                "grid.arrival_radius must be > 0, got {}",
                self.grid.arrival_radius
            )));
        }
        if self.sink.base_url.trim().is_empty() {
            return Err(crate::Error::Config(
                "sink.base_url must not be empty".to_string(),
            ));
        }
        if self.sink.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "sink.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".motion_sentry").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
