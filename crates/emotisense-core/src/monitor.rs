//! Live affect monitor
//!
//! Per tick: fuse, append to the session, update the stress alert.

use serde::{Deserialize, Serialize};

use crate::alert::{StressAlert, StressAlertMonitor};
use crate::config::EmotiSenseConfig;
use crate::emotion::EmotionVector;
use crate::fusion::{FusedMetrics, FusionEngine};
use crate::session::{SessionId, SessionRecord, SessionSummary, SharedSession};
use crate::source::{AffectSource, Tick};
use crate::timestamp::{Clock, SystemClock};

/// Result of one monitor tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub metrics: FusedMetrics,
    /// Sustained-stress alert holds after this tick
    pub alert_active: bool,
    /// Alert became active on this tick
    pub alert_raised: bool,
}

/// Fusion engine, session log and stress alert wired together.
///
/// The session handle can be cloned out with [`session`](Self::session)
/// and read from another thread while ticks are being processed.
pub struct AffectMonitor<C: Clock = SystemClock> {
    engine: FusionEngine,
    session: SharedSession<C>,
    alert: StressAlertMonitor,
    timeline_us: i64,
}

impl AffectMonitor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(&EmotiSenseConfig::default(), SystemClock)
    }
}

impl Default for AffectMonitor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AffectMonitor<C> {
    pub fn with_clock(config: &EmotiSenseConfig, clock: C) -> Self {
        Self {
            engine: FusionEngine::with_config(&config.fusion),
            session: SharedSession::with_clock(clock),
            alert: StressAlertMonitor::from_config(&config.alert),
            timeline_us: config.session.timeline_us(),
        }
    }

    /// Start a new session and clear the alert window.
    pub fn start(&mut self) -> SessionId {
        self.alert.reset();
        self.session.start()
    }

    /// Fuse one tick. The tick is recorded and fed to the alert only while
    /// a session is active; the metrics are returned either way.
    pub fn tick(&mut self, face_emotions: &EmotionVector, audio_stress: f32) -> TickOutcome {
        let metrics = self.engine.fuse(face_emotions, audio_stress);

        if !self.session.append(face_emotions, audio_stress, &metrics) {
            return TickOutcome {
                metrics,
                alert_active: self.alert.is_active(),
                alert_raised: false,
            };
        }

        let status = self.alert.update(metrics.stress);
        if status.raised {
            log::warn!(
                "High stress detected in session {}: above {:.2} for {} ticks",
                self.session.session_id(),
                self.alert.alert().threshold,
                self.alert.alert().duration
            );
        }

        TickOutcome {
            metrics,
            alert_active: status.active,
            alert_raised: status.raised,
        }
    }

    pub fn process(&mut self, tick: &Tick) -> TickOutcome {
        self.tick(&tick.face_emotions, tick.audio_stress)
    }

    /// Pull one tick from `source` and process it.
    pub fn step<S: AffectSource + ?Sized>(&mut self, source: &mut S) -> Option<TickOutcome> {
        source.next_tick().map(|t| self.process(&t))
    }

    pub fn stop(&mut self) -> Vec<SessionRecord> {
        self.alert.reset();
        self.session.stop()
    }

    pub fn stats(&self) -> SessionSummary {
        self.session.stats()
    }

    /// Stress values inside the live timeline window.
    pub fn live_stress(&self) -> Vec<f32> {
        self.session.recent_stress(self.timeline_us)
    }

    pub fn session(&self) -> &SharedSession<C> {
        &self.session
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    pub fn stress_alert(&self) -> &StressAlert {
        self.alert.alert()
    }

    pub fn alert_active(&self) -> bool {
        self.alert.is_active()
    }
}
