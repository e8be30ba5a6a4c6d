//! Sustained-stress alerting
//!
//! An alert holds when each of the last `duration` stress values exceeds
//! the threshold. One value at or below the threshold clears the window.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::AlertConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressAlert {
    pub threshold: f32,
    pub duration: usize,
}

impl Default for StressAlert {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}

impl StressAlert {
    pub fn new(threshold: f32, duration: usize) -> Self {
        Self { threshold, duration }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.stress_threshold, config.duration_ticks)
    }

    /// True when the history holds at least `duration` values and the
    /// trailing `duration` of them all exceed the threshold.
    pub fn evaluate(&self, history: &[f32]) -> bool {
        if self.duration == 0 || history.len() < self.duration {
            return false;
        }
        history[history.len() - self.duration..]
            .iter()
            .all(|&s| s > self.threshold)
    }
}

/// Alert state after one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertStatus {
    pub active: bool,
    /// Became active on this update
    pub raised: bool,
    /// Stopped being active on this update
    pub cleared: bool,
}

/// Incremental form of [`StressAlert`] that keeps only the trailing
/// window instead of the whole history.
#[derive(Debug, Clone)]
pub struct StressAlertMonitor {
    alert: StressAlert,
    window: VecDeque<f32>,
    active: bool,
}

impl StressAlertMonitor {
    pub fn new(alert: StressAlert) -> Self {
        Self {
            window: VecDeque::with_capacity(alert.duration),
            alert,
            active: false,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(StressAlert::from_config(config))
    }

    pub fn update(&mut self, stress: f32) -> AlertStatus {
        if self.alert.duration > 0 {
            if self.window.len() == self.alert.duration {
                self.window.pop_front();
            }
            self.window.push_back(stress);
        }

        let now_active = self.alert.duration > 0
            && self.window.len() == self.alert.duration
            && self.window.iter().all(|&s| s > self.alert.threshold);

        let status = AlertStatus {
            active: now_active,
            raised: now_active && !self.active,
            cleared: !now_active && self.active,
        };
        if status.raised {
            log::debug!(
                "stress alert raised: {} ticks above {:.2}",
                self.alert.duration,
                self.alert.threshold
            );
        } else if status.cleared {
            log::debug!("stress alert cleared (stress={:.3})", stress);
        }
        self.active = now_active;
        status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn alert(&self) -> &StressAlert {
        &self.alert
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.active = false;
    }
}

impl Default for StressAlertMonitor {
    fn default() -> Self {
        Self::new(StressAlert::default())
    }
}
