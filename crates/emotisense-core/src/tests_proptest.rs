use proptest::prelude::*;

/// Property-based tests for the fusion, session and alert invariants

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{StressAlert, StressAlertMonitor};
    use crate::emotion::{Emotion, EmotionVector, EMOTION_COUNT};
    use crate::export;
    use crate::fusion::{clamp_unit, FusionEngine};
    use crate::session::SessionAccumulator;
    use crate::timestamp::ManualClock;
    use std::sync::Arc;

    /// Non-negative weights normalized to a probability vector
    fn emotion_vector() -> impl Strategy<Value = EmotionVector> {
        prop::array::uniform7(0.0f32..1.0f32).prop_map(|w| EmotionVector::from_array(w).normalized())
    }

    /// Arbitrary, possibly malformed vector
    fn raw_vector() -> impl Strategy<Value = EmotionVector> {
        prop::array::uniform7(prop::num::f32::ANY).prop_map(EmotionVector::from_array)
    }

    // =========================================================================
    // Test 1: Emotion Index Invariants
    // =========================================================================
    proptest! {
        #[test]
        fn test_emotion_index_invariant(idx in 0usize..16usize) {
            if idx < EMOTION_COUNT {
                let e = Emotion::from_index(idx).unwrap();
                prop_assert_eq!(e.index(), idx);
                prop_assert_eq!(e.as_str().parse::<Emotion>().unwrap(), e);
            } else {
                prop_assert!(Emotion::from_index(idx).is_none());
            }
        }
    }

    // =========================================================================
    // Test 2: Fused Metrics Stay In Range
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn test_metrics_in_unit_range(face in emotion_vector(), stress in -2.0f32..3.0f32) {
            let m = FusionEngine::new().fuse(&face, stress);
            for v in [m.stress, m.engagement, m.confusion, m.confidence] {
                prop_assert!((0.0..=1.0).contains(&v), "metric {} out of range", v);
            }
        }

        #[test]
        fn test_malformed_input_never_escapes_range(face in raw_vector(), stress in prop::num::f32::ANY) {
            let m = FusionEngine::new().fuse(&face, stress);
            for v in [m.stress, m.engagement, m.confusion, m.confidence] {
                prop_assert!(v.is_finite() && (0.0..=1.0).contains(&v));
            }
        }
    }

    // =========================================================================
    // Test 3: Clamping Equivalence And Determinism
    // =========================================================================
    proptest! {
        #[test]
        fn test_stress_clamping_equivalence(face in emotion_vector(), stress in -5.0f32..5.0f32) {
            let engine = FusionEngine::new();
            prop_assert_eq!(engine.fuse(&face, stress), engine.fuse(&face, clamp_unit(stress)));
        }

        #[test]
        fn test_fuse_is_deterministic(face in emotion_vector(), stress in 0.0f32..=1.0f32) {
            let a = FusionEngine::new().fuse(&face, stress);
            let b = FusionEngine::new().fuse(&face, stress);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn test_engagement_bounded_by_positive_score(face in emotion_vector(), stress in 0.0f32..=1.0f32) {
            let m = FusionEngine::new().fuse(&face, stress);
            let positive = face.get(Emotion::Happy) + 0.7 * face.get(Emotion::Surprise);
            prop_assert!(m.engagement <= positive * 1.2 + 1e-6);
        }
    }

    // =========================================================================
    // Test 4: Alert Semantics
    // =========================================================================
    proptest! {
        #[test]
        fn test_alert_matches_trailing_window(
            history in prop::collection::vec(0.0f32..=1.0f32, 0..40),
            duration in 1usize..8usize,
        ) {
            let alert = StressAlert::new(0.7, duration);
            let expected = history.len() >= duration
                && history[history.len() - duration..].iter().all(|&s| s > 0.7);
            prop_assert_eq!(alert.evaluate(&history), expected);
        }

        #[test]
        fn test_monitor_agrees_with_evaluate(
            history in prop::collection::vec(0.5f32..=1.0f32, 1..60),
            duration in 1usize..6usize,
        ) {
            let alert = StressAlert::new(0.7, duration);
            let mut monitor = StressAlertMonitor::new(alert);
            for i in 0..history.len() {
                let status = monitor.update(history[i]);
                prop_assert_eq!(status.active, alert.evaluate(&history[..=i]));
            }
        }
    }

    // =========================================================================
    // Test 5: Accumulator Ordering
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_accumulator_keeps_order(
            steps in prop::collection::vec((-2_000_000i64..2_000_000i64, 0.0f32..=1.0f32), 1..50),
        ) {
            let clock = Arc::new(ManualClock::new(10_000_000));
            let mut acc = SessionAccumulator::with_clock(clock.clone());
            let engine = FusionEngine::new();
            let face = EmotionVector::zeros().with(Emotion::Neutral, 1.0);

            acc.start();
            for (dt, stress) in &steps {
                clock.advance(*dt);
                acc.append(&face, *stress, &engine.fuse(&face, *stress));
            }
            let records = acc.stop();

            prop_assert_eq!(records.len(), steps.len());
            let inputs: Vec<f32> = records.iter().map(|r| r.audio_stress_score).collect();
            let expected: Vec<f32> = steps.iter().map(|(_, s)| *s).collect();
            prop_assert_eq!(inputs, expected);
            prop_assert!(records.windows(2).all(|w| w[0].timestamp_us <= w[1].timestamp_us));
        }

        #[test]
        fn test_csv_export_is_lossless(
            faces in prop::collection::vec(emotion_vector(), 0..20),
            stress in 0.0f32..=1.0f32,
        ) {
            let clock = Arc::new(ManualClock::new(0));
            let mut acc = SessionAccumulator::with_clock(clock.clone());
            let engine = FusionEngine::new();
            acc.start();
            for face in &faces {
                clock.advance(250_000);
                acc.append(face, stress, &engine.fuse(face, stress));
            }
            let records = acc.stop();
            let back = export::read_csv(export::to_csv_string(&records).unwrap().as_bytes()).unwrap();
            prop_assert_eq!(back, records);
        }
    }
}
