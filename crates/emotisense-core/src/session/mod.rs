//! Session accumulation
//!
//! A session is an append-only, insertion-ordered log of per-tick
//! records between `start` and `stop`, identified by a random id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::emotion::EmotionVector;
use crate::fusion::FusedMetrics;

pub mod accumulator;
pub mod shared;
pub mod summary;

pub use accumulator::SessionAccumulator;
pub use shared::SharedSession;
pub use summary::{MetricField, SessionSummary, StateCount};

/// Random session identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero id, used before the first session starts.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, for file names and log lines.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One tick of a session: the inputs and what the engine made of them.
/// Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp_us: i64,
    pub session_id: SessionId,
    pub audio_stress_score: f32,
    #[serde(flatten)]
    pub emotions: EmotionVector,
    #[serde(flatten)]
    pub metrics: FusedMetrics,
}
