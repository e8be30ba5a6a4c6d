//! Multimodal Affect Fusion
//!
//! Combines a face-emotion probability vector with a scalar vocal-stress
//! score into bounded stress, engagement, confusion and confidence
//! metrics plus a categorical dominant state.
//!
//! The engine is a pure function of its inputs and fixed weights: no
//! hidden state, no I/O, identical input gives bit-identical output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::FusionConfig;
use crate::emotion::{Emotion, EmotionVector};

/// Amplification applied to the weighted stress sum.
pub const STRESS_GAIN: f32 = 1.2;
/// Ceiling the stress is subtracted from when scaling engagement.
pub const ENGAGEMENT_CEILING: f32 = 1.2;
/// Surprise contribution to the positive-emotion score.
pub const SURPRISE_POSITIVE_WEIGHT: f32 = 0.7;

/// Stress above which the tick is labelled `stressed`.
pub const STRESSED_THRESHOLD: f32 = 0.7;
/// Minimum engagement for `engaged`.
pub const ENGAGED_THRESHOLD: f32 = 0.6;
/// Stress must stay below this for `engaged`.
pub const ENGAGED_MAX_STRESS: f32 = 0.4;
/// Confusion above which the tick is labelled `confused`.
pub const CONFUSED_THRESHOLD: f32 = 0.6;
/// Probability the dominant face emotion needs to decide the state.
pub const DOMINANT_EMOTION_THRESHOLD: f32 = 0.4;
/// Stress must stay below this for a neutral face to read as `calm`.
pub const CALM_MAX_STRESS: f32 = 0.3;
/// Negative score above which the fallback picks `negative`.
pub const FALLBACK_NEGATIVE_THRESHOLD: f32 = 0.4;

/// Categorical summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantState {
    Stressed,
    Engaged,
    Confused,
    Positive,
    Negative,
    Calm,
    Neutral,
}

impl DominantState {
    pub const ALL: [DominantState; 7] = [
        DominantState::Stressed,
        DominantState::Engaged,
        DominantState::Confused,
        DominantState::Positive,
        DominantState::Negative,
        DominantState::Calm,
        DominantState::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DominantState::Stressed => "stressed",
            DominantState::Engaged => "engaged",
            DominantState::Confused => "confused",
            DominantState::Positive => "positive",
            DominantState::Negative => "negative",
            DominantState::Calm => "calm",
            DominantState::Neutral => "neutral",
        }
    }

    /// Ordered decision list; the first matching rule wins.
    ///
    /// 1. stress > 0.7 → stressed
    /// 2. engagement > 0.6 and stress < 0.4 → engaged
    /// 3. confusion > 0.6 → confused
    /// 4. dominant face emotion above 0.4: happy → positive,
    ///    sad/angry/fear → negative, neutral with stress < 0.3 → calm
    /// 5. happy + surprise against the negative score
    ///
    /// Surprise- or disgust-dominant faces and a neutral face under
    /// moderate stress skip rule 4 and land in rule 5.
    pub fn classify(face: &EmotionVector, stress: f32, engagement: f32, confusion: f32) -> Self {
        if stress > STRESSED_THRESHOLD {
            return DominantState::Stressed;
        }
        if engagement > ENGAGED_THRESHOLD && stress < ENGAGED_MAX_STRESS {
            return DominantState::Engaged;
        }
        if confusion > CONFUSED_THRESHOLD {
            return DominantState::Confused;
        }

        let (emotion, p) = face.dominant();
        if p > DOMINANT_EMOTION_THRESHOLD {
            match emotion {
                Emotion::Happy => return DominantState::Positive,
                Emotion::Sad | Emotion::Angry | Emotion::Fear => return DominantState::Negative,
                Emotion::Neutral if stress < CALM_MAX_STRESS => return DominantState::Calm,
                _ => {}
            }
        }

        let positive = face.get(Emotion::Happy) + face.get(Emotion::Surprise);
        let negative = face.negative_score();
        if positive > negative {
            DominantState::Positive
        } else if negative > FALLBACK_NEGATIVE_THRESHOLD {
            DominantState::Negative
        } else {
            DominantState::Neutral
        }
    }
}

impl fmt::Display for DominantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dominant state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for DominantState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        DominantState::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == label)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// Fused metrics for one tick. Every score lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedMetrics {
    pub stress: f32,
    pub engagement: f32,
    pub confusion: f32,
    pub confidence: f32,
    pub dominant_state: DominantState,
}

/// Clamp into [0, 1]; NaN reads as 0.
#[inline]
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Face/voice fusion engine
#[derive(Debug, Clone)]
pub struct FusionEngine {
    face_weight: f32,
    audio_weight: f32,
}

impl FusionEngine {
    pub fn new() -> Self {
        Self::with_config(&FusionConfig::default())
    }

    pub fn with_config(config: &FusionConfig) -> Self {
        Self {
            face_weight: config.face_weight,
            audio_weight: config.audio_weight,
        }
    }

    pub fn face_weight(&self) -> f32 {
        self.face_weight
    }

    pub fn audio_weight(&self) -> f32 {
        self.audio_weight
    }

    /// Fuse one tick of face and voice signals.
    ///
    /// Never fails: out-of-range or non-finite stress is clamped, and
    /// non-finite or negative probabilities read as zero. A vector that
    /// does not sum to one is used as-is and reported.
    pub fn fuse(&self, face_emotions: &EmotionVector, audio_stress: f32) -> FusedMetrics {
        if !face_emotions.is_normalized() {
            log::warn!(
                "face emotion vector not normalized (total={:.4}); fusing without re-normalization",
                face_emotions.total()
            );
        }
        let face = face_emotions.sanitized();

        let audio = clamp_unit(audio_stress);
        if audio != audio_stress {
            log::warn!("audio stress {} outside [0, 1], clamped to {}", audio_stress, audio);
        }

        let negative = face.negative_score();
        let stress = clamp_unit(
            (negative * self.face_weight + audio * self.audio_weight) * STRESS_GAIN,
        );

        let positive = positive_emotion_score(&face);
        let engagement = clamp_unit(positive * (ENGAGEMENT_CEILING - stress));

        let uncertainty = 1.0 - face.max_probability();
        let confusion = clamp_unit(face.variance() * 2.0 + uncertainty * 0.5 + audio * 0.3);

        let confidence = clamp_unit(1.0 - (stress * 0.6 + confusion * 0.4) + positive * 0.3);

        let dominant_state = DominantState::classify(&face, stress, engagement, confusion);

        log::trace!(
            "fused stress={:.3} engagement={:.3} confusion={:.3} confidence={:.3} state={}",
            stress,
            engagement,
            confusion,
            confidence,
            dominant_state
        );

        FusedMetrics {
            stress,
            engagement,
            confusion,
            confidence,
            dominant_state,
        }
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// happy + 0.7 * surprise
pub fn positive_emotion_score(face: &EmotionVector) -> f32 {
    face.get(Emotion::Happy) + face.get(Emotion::Surprise) * SURPRISE_POSITIVE_WEIGHT
}
