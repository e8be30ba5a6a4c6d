//! Real-time multimodal affect fusion
//!
//! # Modules
//! - `emotion`: Face-emotion labels and probability vectors
//! - `fusion`: Face/voice fusion into stress, engagement, confusion, confidence
//! - `session`: Per-session record log, shared handle and summaries
//! - `alert`: Sustained-stress alerting
//! - `monitor`: Tick pipeline tying fusion, session and alert together
//! - `source`: Tick sources (replay, seeded synthetic generator)
//! - `report`: Session report data
//! - `export`: CSV and JSON export/import
//! - `config`: TOML configuration with environment overrides

pub mod alert;
pub mod config;
pub mod emotion;
pub mod export;
pub mod fusion;
pub mod monitor;
pub mod report;
pub mod session;
pub mod source;
pub mod timestamp;

#[cfg(test)]
mod tests_config;
#[cfg(test)]
mod tests_proptest;

pub use alert::{AlertStatus, StressAlert, StressAlertMonitor};
pub use config::{ConfigError, EmotiSenseConfig};
pub use emotion::{Emotion, EmotionVector};
pub use export::ExportError;
pub use fusion::{DominantState, FusedMetrics, FusionEngine};
pub use monitor::{AffectMonitor, TickOutcome};
pub use report::{Recommendation, SessionReport};
pub use session::{SessionAccumulator, SessionId, SessionRecord, SessionSummary, SharedSession};
pub use source::{AffectSource, ReplaySource, Tick};
#[cfg(feature = "synthetic")]
pub use source::{Scenario, SyntheticSource};
pub use timestamp::{Clock, ManualClock, SystemClock};
