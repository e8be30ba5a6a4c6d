//! Tick sources
//!
//! The fusion core never acquires signals itself. Whatever produces the
//! per-tick face vector and stress score (a classifier behind a camera, a
//! replayed log, the synthetic generator) sits behind [`AffectSource`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionVector;
use crate::session::SessionRecord;

#[cfg(feature = "synthetic")]
mod synthetic;

#[cfg(feature = "synthetic")]
pub use synthetic::{Scenario, SyntheticSource};

/// One already-synchronized pair of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub face_emotions: EmotionVector,
    pub audio_stress: f32,
}

pub trait AffectSource {
    /// Next tick, or None once the source is exhausted.
    fn next_tick(&mut self) -> Option<Tick>;
}

/// Replays recorded inputs in order.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    ticks: VecDeque<Tick>,
}

impl ReplaySource {
    pub fn new(ticks: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
        }
    }

    /// Inputs of previously recorded session rows.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        Self::new(records.iter().map(|r| Tick {
            face_emotions: r.emotions,
            audio_stress: r.audio_stress_score,
        }))
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

impl AffectSource for ReplaySource {
    fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.pop_front()
    }
}
