//! Thread-Safe Session Wrapper
//!
//! Provides `Arc<RwLock<SessionAccumulator>>` with convenient methods so a
//! capture thread can append while a display thread reads.
//!
//! # Usage
//! ```
//! use emotisense_core::{EmotionVector, FusionEngine, SharedSession};
//!
//! let session = SharedSession::new();
//! session.start();
//!
//! let writer = session.clone();
//! std::thread::spawn(move || {
//!     let face = EmotionVector::from_array([0.0, 0.0, 0.0, 0.2, 0.0, 0.0, 0.8]);
//!     let metrics = FusionEngine::new().fuse(&face, 0.3);
//!     writer.append(&face, 0.3, &metrics);
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(session.snapshot().len(), 1);
//! ```

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::emotion::EmotionVector;
use crate::fusion::FusedMetrics;
use crate::timestamp::{Clock, SystemClock};

use super::accumulator::SessionAccumulator;
use super::summary::SessionSummary;
use super::{SessionId, SessionRecord};

/// Cloneable handle to one [`SessionAccumulator`].
///
/// - `start`, `append` and `stop` take the write lock, so concurrent
///   producers are serialized and append order is preserved
/// - `snapshot`, `stats` and `stress_history` take the read lock and
///   copy out, so readers never observe a half-applied append
pub struct SharedSession<C: Clock = SystemClock> {
    inner: Arc<RwLock<SessionAccumulator<C>>>,
}

impl<C: Clock> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> std::fmt::Debug for SharedSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_read() {
            Some(guard) => write!(
                f,
                "SharedSession(id={}, records={}, active={})",
                guard.session_id(),
                guard.len(),
                guard.is_active()
            ),
            None => write!(f, "SharedSession(<locked>)"),
        }
    }
}

impl SharedSession<SystemClock> {
    pub fn new() -> Self {
        Self::from_accumulator(SessionAccumulator::new())
    }
}

impl Default for SharedSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SharedSession<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::from_accumulator(SessionAccumulator::with_clock(clock))
    }

    /// Wrap an existing accumulator.
    pub fn from_accumulator(acc: SessionAccumulator<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(acc)),
        }
    }

    // =========================================================================
    // Write Operations (exclusive lock)
    // =========================================================================

    pub fn start(&self) -> SessionId {
        self.inner.write().start()
    }

    /// Record one tick if a session is active. The check and the push
    /// happen under one write lock; returns whether the tick was kept.
    pub fn append(&self, face_emotions: &EmotionVector, audio_stress: f32, metrics: &FusedMetrics) -> bool {
        self.inner.write().append(face_emotions, audio_stress, metrics)
    }

    pub fn stop(&self) -> Vec<SessionRecord> {
        self.inner.write().stop()
    }

    // =========================================================================
    // Read Operations (shared lock)
    // =========================================================================

    pub fn snapshot(&self) -> Vec<SessionRecord> {
        self.inner.read().snapshot()
    }

    pub fn stats(&self) -> SessionSummary {
        self.inner.read().stats()
    }

    pub fn stress_history(&self) -> Vec<f32> {
        self.inner.read().stress_history()
    }

    /// Copy of the records within `window_us` of the latest one.
    pub fn recent(&self, window_us: i64) -> Vec<SessionRecord> {
        self.inner.read().recent(window_us).to_vec()
    }

    pub fn recent_stress(&self, window_us: i64) -> Vec<f32> {
        self.inner.read().recent_stress(window_us)
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().is_active()
    }

    pub fn session_id(&self) -> SessionId {
        self.inner.read().session_id()
    }

    pub fn start_us(&self) -> i64 {
        self.inner.read().start_us()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Acquire the read lock for batch reads.
    ///
    /// # Warning
    /// Hold this lock for as short as possible to avoid blocking producers.
    pub fn read(&self) -> RwLockReadGuard<'_, SessionAccumulator<C>> {
        self.inner.read()
    }
}
