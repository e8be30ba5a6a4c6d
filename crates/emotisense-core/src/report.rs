//! Session report data
//!
//! Everything a session report shows, computed from the record log:
//! metric table, notable emotion periods, average distribution, state
//! histogram and recommendations. Rendering is left to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::emotion::{Emotion, EmotionVector};
use crate::session::summary::{self, MetricField};
use crate::session::{SessionId, SessionRecord, SessionSummary};

/// One row of the key-metrics table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: MetricField,
    pub average: f32,
    pub maximum: f32,
    pub peak_us: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    HighStress,
    Happy,
    Sad,
    Angry,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 4] = [
        PeriodKind::HighStress,
        PeriodKind::Happy,
        PeriodKind::Sad,
        PeriodKind::Angry,
    ];

    pub fn field(self) -> MetricField {
        match self {
            PeriodKind::HighStress => MetricField::Stress,
            PeriodKind::Happy => MetricField::Emotion(Emotion::Happy),
            PeriodKind::Sad => MetricField::Emotion(Emotion::Sad),
            PeriodKind::Angry => MetricField::Emotion(Emotion::Angry),
        }
    }

    /// Values strictly above this count toward the period.
    pub fn threshold(self) -> f32 {
        match self {
            PeriodKind::HighStress => 0.7,
            PeriodKind::Happy => 0.5,
            PeriodKind::Sad | PeriodKind::Angry => 0.4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodKind::HighStress => "High Stress",
            PeriodKind::Happy => "Happy",
            PeriodKind::Sad => "Sad",
            PeriodKind::Angry => "Angry",
        }
    }
}

/// Ticks above a period threshold. `ticks` counts every matching record,
/// not only a contiguous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionPeriod {
    pub kind: PeriodKind,
    pub start_us: i64,
    pub ticks: usize,
}

impl EmotionPeriod {
    pub fn detect(kind: PeriodKind, records: &[SessionRecord]) -> Option<Self> {
        let field = kind.field();
        let threshold = kind.threshold();
        let mut hits = records.iter().filter(|r| field.value(r) > threshold);
        let first = hits.next()?;
        Some(Self {
            kind,
            start_us: first.timestamp_us,
            ticks: 1 + hits.count(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    HighStress,
    GoodRegulation,
    LowEngagement,
    HighEngagement,
    LowConfidence,
    Balanced,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::HighStress => {
                "High stress levels detected. Consider stress management techniques."
            }
            Recommendation::GoodRegulation => {
                "Low stress levels indicate good emotional regulation."
            }
            Recommendation::LowEngagement => {
                "Low engagement detected. Consider more interactive activities."
            }
            Recommendation::HighEngagement => {
                "High engagement levels - excellent focus and attention."
            }
            Recommendation::LowConfidence => {
                "Confidence levels could be improved through positive reinforcement."
            }
            Recommendation::Balanced => "Overall emotional state appears balanced and healthy.",
        }
    }

    /// Advice for a summary's averages. Never empty.
    pub fn for_summary(s: &SessionSummary) -> Vec<Recommendation> {
        let mut out = Vec::new();

        if s.avg_stress > 0.7 {
            out.push(Recommendation::HighStress);
        } else if s.avg_stress < 0.3 {
            out.push(Recommendation::GoodRegulation);
        }

        if s.avg_engagement < 0.4 {
            out.push(Recommendation::LowEngagement);
        } else if s.avg_engagement > 0.7 {
            out.push(Recommendation::HighEngagement);
        }

        if s.avg_confidence < 0.5 {
            out.push(Recommendation::LowConfidence);
        }

        if out.is_empty() {
            out.push(Recommendation::Balanced);
        }
        out
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub metrics: Vec<MetricRow>,
    pub periods: Vec<EmotionPeriod>,
    /// Mean face distribution over the session
    pub average_emotions: EmotionVector,
    pub recommendations: Vec<Recommendation>,
}

impl SessionReport {
    pub fn build(summary: SessionSummary, records: &[SessionRecord]) -> Self {
        let metrics = [MetricField::Stress, MetricField::Engagement, MetricField::Confidence]
            .into_iter()
            .map(|metric| MetricRow {
                metric,
                average: summary::mean(records, metric),
                maximum: summary::max(records, metric),
                peak_us: summary::peak_time(records, metric),
            })
            .collect();

        let periods = PeriodKind::ALL
            .into_iter()
            .filter_map(|kind| EmotionPeriod::detect(kind, records))
            .collect();

        let mut average_emotions = EmotionVector::zeros();
        for e in Emotion::ALL {
            average_emotions.set(e, summary::mean(records, MetricField::Emotion(e)));
        }

        let recommendations = Recommendation::for_summary(&summary);

        Self {
            summary,
            metrics,
            periods,
            average_emotions,
            recommendations,
        }
    }

    /// Report for a loaded log. The session starts at the first record
    /// and ends at the last.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let (id, start_us) = records
            .first()
            .map(|r| (r.session_id, r.timestamp_us))
            .unwrap_or((SessionId::nil(), 0));
        let summary = SessionSummary::from_records(id, start_us, records, None);
        Self::build(summary, records)
    }

    pub fn period(&self, kind: PeriodKind) -> Option<&EmotionPeriod> {
        self.periods.iter().find(|p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::FusionEngine;
    use approx::assert_abs_diff_eq;

    fn records(ticks: &[(EmotionVector, f32)]) -> Vec<SessionRecord> {
        let engine = FusionEngine::new();
        let id = SessionId::new();
        ticks
            .iter()
            .enumerate()
            .map(|(i, (face, stress))| SessionRecord {
                timestamp_us: (i as i64 + 1) * 1_000_000,
                session_id: id,
                audio_stress_score: *stress,
                emotions: *face,
                metrics: engine.fuse(face, *stress),
            })
            .collect()
    }

    fn happy() -> EmotionVector {
        EmotionVector::zeros().with(Emotion::Happy, 0.9).with(Emotion::Neutral, 0.1)
    }

    fn angry() -> EmotionVector {
        EmotionVector::zeros().with(Emotion::Angry, 0.8).with(Emotion::Sad, 0.2)
    }

    #[test]
    fn test_empty_report() {
        let report = SessionReport::from_records(&[]);
        assert!(report.summary.is_empty());
        assert!(report.periods.is_empty());
        assert_eq!(report.metrics.len(), 3);
        assert!(report.metrics.iter().all(|m| m.peak_us.is_none()));
        assert_eq!(report.average_emotions, EmotionVector::zeros());
        // all-zero averages: low stress, low engagement, low confidence
        assert_eq!(
            report.recommendations,
            vec![
                Recommendation::GoodRegulation,
                Recommendation::LowEngagement,
                Recommendation::LowConfidence
            ]
        );
    }

    #[test]
    fn test_periods() {
        let log = records(&[(happy(), 0.1), (angry(), 1.0), (happy(), 0.1), (angry(), 1.0)]);
        let report = SessionReport::from_records(&log);

        let happy_period = report.period(PeriodKind::Happy).unwrap();
        assert_eq!(happy_period.start_us, 1_000_000);
        assert_eq!(happy_period.ticks, 2);

        let stress = report.period(PeriodKind::HighStress).unwrap();
        assert_eq!(stress.start_us, 2_000_000);
        assert_eq!(stress.ticks, 2);

        assert_eq!(report.period(PeriodKind::Angry).unwrap().ticks, 2);
        assert!(report.period(PeriodKind::Sad).is_none());
    }

    #[test]
    fn test_average_emotions_and_metrics() {
        let log = records(&[(happy(), 0.1), (angry(), 1.0)]);
        let report = SessionReport::from_records(&log);
        assert_abs_diff_eq!(report.average_emotions.get(Emotion::Happy), 0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(report.average_emotions.get(Emotion::Angry), 0.4, epsilon = 1e-6);

        let stress = report.metrics[0];
        assert_eq!(stress.metric, MetricField::Stress);
        assert_eq!(stress.maximum, log[1].metrics.stress);
        assert_eq!(stress.peak_us, Some(2_000_000));
        assert_abs_diff_eq!(stress.average, report.summary.avg_stress, epsilon = 1e-6);
    }

    #[test]
    fn test_recommendations() {
        let mut s = SessionSummary::empty(SessionId::nil(), 0);
        s.avg_stress = 0.5;
        s.avg_engagement = 0.5;
        s.avg_confidence = 0.8;
        assert_eq!(Recommendation::for_summary(&s), vec![Recommendation::Balanced]);

        s.avg_stress = 0.9;
        s.avg_engagement = 0.8;
        assert_eq!(
            Recommendation::for_summary(&s),
            vec![Recommendation::HighStress, Recommendation::HighEngagement]
        );
        assert!(Recommendation::HighStress.to_string().contains("stress management"));
    }
}
