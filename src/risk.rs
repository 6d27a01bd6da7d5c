//! Risk monitor - coarse fatigue and cardiac warnings from duration and pace
//!
//! Not a medical device: two heuristics over session duration and reps per
//! minute, escalating only.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Risk {
    pub level: RiskLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskStatus {
    pub cramps: Risk,
    pub heart_attack: Risk,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskThresholds {
    pub cramps_medium_secs: f64,
    pub cramps_high_secs: f64,
    pub cardiac_medium_rpm: f64,
    pub cardiac_high_rpm: f64,
    /// Minimum wall time between evaluations, independent of sampling rate
    pub min_interval_ms: u64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            cramps_medium_secs: 900.0,
            cramps_high_secs: 1800.0,
            cardiac_medium_rpm: 10.0,
            cardiac_high_rpm: 15.0,
            min_interval_ms: 1000,
        }
    }
}

/// Levels indicated by one reading; `None` means no change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub cramps: Option<RiskLevel>,
    pub heart_attack: Option<RiskLevel>,
}

fn cramps_message(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "",
        RiskLevel::Medium => "Remember to stay hydrated",
        RiskLevel::High => "Extended exercise duration. Consider taking a break and hydrating.",
    }
}

fn heart_message(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "",
        RiskLevel::Medium => "Moderate to high intensity. Monitor your breathing.",
        RiskLevel::High => "High intensity detected. Please slow down and check your heart rate.",
    }
}

/// Reps per minute; zero for a zero-length session
pub fn reps_per_minute(total_reps: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    total_reps as f64 / (duration_secs / 60.0)
}

pub fn assess(thresholds: &RiskThresholds, duration_secs: f64, total_reps: u32) -> Assessment {
    let cramps = if duration_secs > thresholds.cramps_high_secs {
        Some(RiskLevel::High)
    } else if duration_secs > thresholds.cramps_medium_secs {
        Some(RiskLevel::Medium)
    } else {
        None
    };

    let rpm = reps_per_minute(total_reps, duration_secs);
    let heart_attack = if rpm > thresholds.cardiac_high_rpm {
        Some(RiskLevel::High)
    } else if rpm > thresholds.cardiac_medium_rpm {
        Some(RiskLevel::Medium)
    } else {
        None
    };

    Assessment { cramps, heart_attack }
}

fn escalate(risk: &mut Risk, level: Option<RiskLevel>, message: fn(RiskLevel) -> &'static str) -> bool {
    match level {
        Some(level) if level > risk.level => {
            risk.level = level;
            risk.message = message(level).to_string();
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct RiskMonitor {
    thresholds: RiskThresholds,
    status: RiskStatus,
    session_start: Option<Instant>,
    last_evaluated: Option<Instant>,
}

impl RiskMonitor {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self {
            thresholds,
            status: RiskStatus::default(),
            session_start: None,
            last_evaluated: None,
        }
    }

    pub fn status(&self) -> &RiskStatus {
        &self.status
    }

    pub fn start(&mut self, now: Instant) {
        self.status = RiskStatus::default();
        self.session_start = Some(now);
        self.last_evaluated = Some(now);
    }

    pub fn stop(&mut self) {
        self.session_start = None;
        self.last_evaluated = None;
    }

    /// Called at the sampling cadence; evaluates only when the minimum interval
    /// has passed. Returns true if an evaluation ran.
    pub fn sample(&mut self, now: Instant, total_reps: u32) -> bool {
        let (Some(start), Some(last)) = (self.session_start, self.last_evaluated) else {
            return false;
        };
        if now.saturating_duration_since(last) < Duration::from_millis(self.thresholds.min_interval_ms) {
            return false;
        }

        let duration_secs = now.saturating_duration_since(start).as_secs_f64();
        self.evaluate(duration_secs, total_reps);
        self.last_evaluated = Some(now);
        true
    }

    /// Apply one reading; levels never go down within a session
    pub fn evaluate(&mut self, duration_secs: f64, total_reps: u32) -> &RiskStatus {
        let assessment = assess(&self.thresholds, duration_secs, total_reps);
        if escalate(&mut self.status.cramps, assessment.cramps, cramps_message) {
            warn!("Cramp risk {:?}: {}", self.status.cramps.level, self.status.cramps.message);
        }
        if escalate(&mut self.status.heart_attack, assessment.heart_attack, heart_message) {
            warn!("Cardiac risk {:?}: {}", self.status.heart_attack.level, self.status.heart_attack.message);
        }
        &self.status
    }
}

impl Default for RiskMonitor {
    fn default() -> Self {
        Self::new(RiskThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cramps_medium_after_fifteen_minutes() {
        let mut monitor = RiskMonitor::default();
        let status = monitor.evaluate(901.0, 0);
        assert_eq!(status.cramps.level, RiskLevel::Medium);
        assert_eq!(status.cramps.message, "Remember to stay hydrated");
        assert_eq!(status.heart_attack.level, RiskLevel::Low);
    }

    #[test]
    fn test_cramps_high_after_thirty_minutes() {
        let mut monitor = RiskMonitor::default();
        assert_eq!(monitor.evaluate(1801.0, 0).cramps.level, RiskLevel::High);
    }

    #[test]
    fn test_cramps_boundaries_are_exclusive() {
        let thresholds = RiskThresholds::default();
        assert_eq!(assess(&thresholds, 900.0, 0).cramps, None);
        assert_eq!(assess(&thresholds, 1800.0, 0).cramps, Some(RiskLevel::Medium));
    }

    #[test]
    fn test_cardiac_high_at_twenty_reps_per_minute() {
        let mut monitor = RiskMonitor::default();
        let status = monitor.evaluate(60.0, 20);
        assert_eq!(status.heart_attack.level, RiskLevel::High);
        assert_eq!(status.cramps.level, RiskLevel::Low);
    }

    #[test]
    fn test_cardiac_medium_between_thresholds() {
        let thresholds = RiskThresholds::default();
        assert_eq!(assess(&thresholds, 60.0, 12).heart_attack, Some(RiskLevel::Medium));
        assert_eq!(assess(&thresholds, 60.0, 10).heart_attack, None);
    }

    #[test]
    fn test_zero_duration_does_not_divide_by_zero() {
        assert_eq!(reps_per_minute(30, 0.0), 0.0);
        let assessment = assess(&RiskThresholds::default(), 0.0, 30);
        assert_eq!(assessment.heart_attack, None);
    }

    #[test]
    fn test_levels_never_downgrade() {
        let mut monitor = RiskMonitor::default();
        monitor.evaluate(60.0, 20);
        let status = monitor.evaluate(120.0, 24);
        assert_eq!(status.heart_attack.level, RiskLevel::High);
    }

    #[test]
    fn test_sample_is_rate_limited() {
        let mut monitor = RiskMonitor::default();
        let t0 = Instant::now();
        assert!(!monitor.sample(t0, 0), "not started");

        monitor.start(t0);
        assert!(!monitor.sample(t0 + Duration::from_millis(100), 5));
        assert!(!monitor.sample(t0 + Duration::from_millis(900), 5));
        assert!(monitor.sample(t0 + Duration::from_millis(1000), 5));
        assert!(!monitor.sample(t0 + Duration::from_millis(1500), 5));
        assert!(monitor.sample(t0 + Duration::from_millis(2100), 5));
    }

    #[test]
    fn test_sample_uses_session_duration() {
        let mut monitor = RiskMonitor::default();
        let t0 = Instant::now();
        monitor.start(t0);
        // 20 reps in the first minute
        assert!(monitor.sample(t0 + Duration::from_secs(60), 20));
        assert_eq!(monitor.status().heart_attack.level, RiskLevel::High);

        assert!(monitor.sample(t0 + Duration::from_secs(901), 20));
        assert_eq!(monitor.status().cramps.level, RiskLevel::Medium);
    }

    #[test]
    fn test_start_clears_previous_levels() {
        let mut monitor = RiskMonitor::default();
        monitor.evaluate(1801.0, 0);
        monitor.start(Instant::now());
        assert_eq!(monitor.status(), &RiskStatus::default());
    }
}
