//! Session summary statistics
//!
//! Aggregates over an accumulated record log for reporting: means,
//! maxima, peak times and the dominant-state histogram.

use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;
use crate::fusion::DominantState;

use super::{SessionId, SessionRecord};

/// A numeric column of [`SessionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Stress,
    Engagement,
    Confusion,
    Confidence,
    AudioStress,
    Emotion(Emotion),
}

impl MetricField {
    pub fn value(self, record: &SessionRecord) -> f32 {
        match self {
            MetricField::Stress => record.metrics.stress,
            MetricField::Engagement => record.metrics.engagement,
            MetricField::Confusion => record.metrics.confusion,
            MetricField::Confidence => record.metrics.confidence,
            MetricField::AudioStress => record.audio_stress_score,
            MetricField::Emotion(e) => record.emotions.get(e),
        }
    }
}

/// Occurrences of one dominant state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCount {
    pub state: DominantState,
    pub count: usize,
}

/// Aggregate statistics for one session.
///
/// `dominant_states` is ordered by count, highest first; equal counts keep
/// the order in which the states first appeared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub start_us: i64,
    pub duration_us: i64,
    pub total_records: usize,
    pub avg_stress: f32,
    pub max_stress: f32,
    pub avg_engagement: f32,
    pub max_engagement: f32,
    pub avg_confidence: f32,
    pub max_confidence: f32,
    pub peak_stress_us: Option<i64>,
    pub peak_engagement_us: Option<i64>,
    pub peak_confidence_us: Option<i64>,
    pub dominant_states: Vec<StateCount>,
}

impl SessionSummary {
    /// Zero-valued summary for a session without records.
    pub fn empty(session_id: SessionId, start_us: i64) -> Self {
        Self {
            session_id,
            start_us,
            duration_us: 0,
            total_records: 0,
            avg_stress: 0.0,
            max_stress: 0.0,
            avg_engagement: 0.0,
            max_engagement: 0.0,
            avg_confidence: 0.0,
            max_confidence: 0.0,
            peak_stress_us: None,
            peak_engagement_us: None,
            peak_confidence_us: None,
            dominant_states: Vec::new(),
        }
    }

    /// Summarize `records`. With `open_now_us` set the session is still
    /// running and the duration extends to that instant; otherwise it ends
    /// at the last record.
    pub fn from_records(
        session_id: SessionId,
        start_us: i64,
        records: &[SessionRecord],
        open_now_us: Option<i64>,
    ) -> Self {
        let Some(last) = records.last() else {
            return Self::empty(session_id, start_us);
        };

        let end_us = open_now_us.unwrap_or(last.timestamp_us);

        Self {
            session_id,
            start_us,
            duration_us: (end_us - start_us).max(0),
            total_records: records.len(),
            avg_stress: mean(records, MetricField::Stress),
            max_stress: max(records, MetricField::Stress),
            avg_engagement: mean(records, MetricField::Engagement),
            max_engagement: max(records, MetricField::Engagement),
            avg_confidence: mean(records, MetricField::Confidence),
            max_confidence: max(records, MetricField::Confidence),
            peak_stress_us: peak_time(records, MetricField::Stress),
            peak_engagement_us: peak_time(records, MetricField::Engagement),
            peak_confidence_us: peak_time(records, MetricField::Confidence),
            dominant_states: state_histogram(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    pub fn state_count(&self, state: DominantState) -> usize {
        self.dominant_states
            .iter()
            .find(|c| c.state == state)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Most frequent dominant state.
    pub fn most_frequent_state(&self) -> Option<DominantState> {
        self.dominant_states.first().map(|c| c.state)
    }

    pub fn duration_sec(&self) -> f32 {
        self.duration_us as f32 / 1_000_000.0
    }
}

/// Arithmetic mean of `field`, 0 for no records.
pub fn mean(records: &[SessionRecord], field: MetricField) -> f32 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| field.value(r)).sum::<f32>() / records.len() as f32
}

/// Maximum of `field`. NaN values are skipped as in [`peak_time`];
/// 0 when nothing is left.
pub fn max(records: &[SessionRecord], field: MetricField) -> f32 {
    records
        .iter()
        .map(|r| field.value(r))
        .filter(|v| !v.is_nan())
        .reduce(f32::max)
        .unwrap_or(0.0)
}

/// Timestamp of the record where `field` peaks; the first one wins ties.
/// NaN values are skipped.
pub fn peak_time(records: &[SessionRecord], field: MetricField) -> Option<i64> {
    let mut best: Option<(f32, i64)> = None;
    for r in records {
        let v = field.value(r);
        if v.is_nan() {
            continue;
        }
        match best {
            Some((b, _)) if v <= b => {}
            _ => best = Some((v, r.timestamp_us)),
        }
    }
    best.map(|(_, ts)| ts)
}

/// Dominant-state counts, highest first, ties in first-seen order.
pub fn state_histogram(records: &[SessionRecord]) -> Vec<StateCount> {
    let mut counts: Vec<StateCount> = Vec::with_capacity(DominantState::ALL.len());
    for r in records {
        let state = r.metrics.dominant_state;
        match counts.iter_mut().find(|c| c.state == state) {
            Some(c) => c.count += 1,
            None => counts.push(StateCount { state, count: 1 }),
        }
    }
    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
