//! Per-session record log

use crate::emotion::EmotionVector;
use crate::fusion::FusedMetrics;
use crate::timestamp::{Clock, SystemClock};

use super::summary::SessionSummary;
use super::{SessionId, SessionRecord};

/// Appends one [`SessionRecord`] per tick while a session is active.
///
/// There is no eviction: the log grows for the lifetime of the session
/// and is handed back whole by [`stop`](Self::stop).
pub struct SessionAccumulator<C: Clock = SystemClock> {
    clock: C,
    session_id: SessionId,
    start_us: i64,
    records: Vec<SessionRecord>,
    active: bool,
}

impl SessionAccumulator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionAccumulator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionAccumulator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            session_id: SessionId::nil(),
            start_us: 0,
            records: Vec::new(),
            active: false,
        }
    }

    /// Begin a new session: fresh id, empty log, start time from the
    /// clock. Starting while active discards the unreturned records of
    /// the running session.
    pub fn start(&mut self) -> SessionId {
        if self.active {
            log::warn!(
                "Session {} restarted while active, discarding {} records",
                self.session_id,
                self.records.len()
            );
        }
        self.session_id = SessionId::new();
        self.records = Vec::new();
        self.start_us = self.clock.now_us();
        self.active = true;
        log::info!("Session {} started at {}", self.session_id, self.start_us);
        self.session_id
    }

    /// Record one tick. Ignored when no session is active.
    pub fn append(&mut self, face_emotions: &EmotionVector, audio_stress: f32, metrics: &FusedMetrics) -> bool {
        if !self.active {
            log::debug!("append ignored: no active session");
            return false;
        }

        let mut ts = self.clock.now_us();
        if let Some(last) = self.records.last() {
            if ts < last.timestamp_us {
                log::warn!(
                    "clock went backwards ({} < {}), keeping record order",
                    ts,
                    last.timestamp_us
                );
                ts = last.timestamp_us;
            }
        }

        self.records.push(SessionRecord {
            timestamp_us: ts,
            session_id: self.session_id,
            audio_stress_score: audio_stress,
            emotions: *face_emotions,
            metrics: *metrics,
        });
        true
    }

    /// End the session and hand back its records. The returned vector is
    /// detached: the records stay readable here until the next `start`,
    /// which never touches what was returned.
    pub fn stop(&mut self) -> Vec<SessionRecord> {
        if !self.active {
            return Vec::new();
        }
        self.active = false;
        let duration_sec = self
            .records
            .last()
            .map(|r| crate::timestamp::dt_sec(r.timestamp_us, self.start_us))
            .unwrap_or(0.0);
        log::info!(
            "Session {} stopped. {} records over {:.1}s",
            self.session_id,
            self.records.len(),
            duration_sec
        );
        self.records.clone()
    }

    /// Copy of the records so far. Does not change the active state.
    pub fn snapshot(&self) -> Vec<SessionRecord> {
        self.records.clone()
    }

    /// Borrowed view of the records so far.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Summary of the records so far. While the session is active the
    /// duration runs up to the current clock reading.
    pub fn stats(&self) -> SessionSummary {
        let now = if self.active { Some(self.clock.now_us()) } else { None };
        SessionSummary::from_records(self.session_id, self.start_us, &self.records, now)
    }

    /// Stress values in append order, for the live chart and alerting.
    pub fn stress_history(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.metrics.stress).collect()
    }

    /// Records no older than `window_us` before the latest record.
    pub fn recent(&self, window_us: i64) -> &[SessionRecord] {
        let Some(last) = self.records.last() else {
            return &[];
        };
        let cutoff = last.timestamp_us.saturating_sub(window_us);
        let first = self.records.partition_point(|r| r.timestamp_us < cutoff);
        &self.records[first..]
    }

    /// Stress values of [`recent`](Self::recent), for the live chart.
    pub fn recent_stress(&self, window_us: i64) -> Vec<f32> {
        self.recent(window_us).iter().map(|r| r.metrics.stress).collect()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn start_us(&self) -> i64 {
        self.start_us
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
