//! Configuration - cadences, risk thresholds and storage location

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::risk::RiskThresholds;

pub const DEFAULT_DB_PATH: &str = "formcount.db";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub db_path: String,
    /// Runtime clock resolution; the scheduler is polled this often
    pub tick_ms: u64,
    pub exercise_timer_ms: u64,
    pub risk_sample_ms: u64,
    pub breathing_sample_ms: u64,
    /// Pacing of recorded and synthetic pose sources
    pub frame_interval_ms: u64,
    /// Advance as soon as the active exercise reaches its target
    pub auto_advance: bool,
    pub risk: RiskThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            tick_ms: 100,
            exercise_timer_ms: 1000,
            risk_sample_ms: 100,
            breathing_sample_ms: 100,
            frame_interval_ms: 33,
            auto_advance: true,
            risk: RiskThresholds::default(),
        }
    }
}

impl Config {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn exercise_timer(&self) -> Duration {
        Duration::from_millis(self.exercise_timer_ms)
    }

    pub fn risk_sample(&self) -> Duration {
        Duration::from_millis(self.risk_sample_ms)
    }

    pub fn breathing_sample(&self) -> Duration {
        Duration::from_millis(self.breathing_sample_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
