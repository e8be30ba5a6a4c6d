//! Face Emotion Vocabulary
//!
//! Fixed seven-label emotion set and the probability vector produced by a
//! face-expression classifier once per tick.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of labels in the canonical emotion set.
pub const EMOTION_COUNT: usize = 7;

/// Tolerance used when checking that a vector sums to one.
pub const NORMALIZATION_TOLERANCE: f32 = 1e-3;

/// Basic emotion label, declared in canonical order.
///
/// The declaration order doubles as the tie-break priority for
/// [`EmotionVector::dominant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; EMOTION_COUNT] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Emotions summed into the negative-affect score.
    pub const NEGATIVE: [Emotion; 4] = [Emotion::Angry, Emotion::Disgust, Emotion::Fear, Emotion::Sad];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label that is not part of the canonical emotion set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == label)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Probability per emotion label.
///
/// A total mapping over [`Emotion`]: labels the producer did not report
/// read as zero. Producers are expected to normalize; nothing here
/// re-normalizes implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "EmotionFields", into = "EmotionFields")]
pub struct EmotionVector {
    probs: [f32; EMOTION_COUNT],
}

/// Serialized shape of [`EmotionVector`]: one named field per label,
/// absent labels default to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct EmotionFields {
    angry: f32,
    disgust: f32,
    fear: f32,
    happy: f32,
    sad: f32,
    surprise: f32,
    neutral: f32,
}

impl From<EmotionFields> for EmotionVector {
    fn from(f: EmotionFields) -> Self {
        Self::from_array([f.angry, f.disgust, f.fear, f.happy, f.sad, f.surprise, f.neutral])
    }
}

impl From<EmotionVector> for EmotionFields {
    fn from(v: EmotionVector) -> Self {
        let [angry, disgust, fear, happy, sad, surprise, neutral] = v.probs;
        Self {
            angry,
            disgust,
            fear,
            happy,
            sad,
            surprise,
            neutral,
        }
    }
}

impl EmotionVector {
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn from_array(probs: [f32; EMOTION_COUNT]) -> Self {
        Self { probs }
    }

    /// Build from `(label, probability)` pairs; later pairs overwrite
    /// earlier ones and absent labels stay at zero.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Emotion, f32)>,
    {
        let mut v = Self::zeros();
        for (emotion, p) in pairs {
            v.probs[emotion.index()] = p;
        }
        v
    }

    /// Builder-style setter.
    pub fn with(mut self, emotion: Emotion, p: f32) -> Self {
        self.probs[emotion.index()] = p;
        self
    }

    pub fn set(&mut self, emotion: Emotion, p: f32) {
        self.probs[emotion.index()] = p;
    }

    #[inline]
    pub fn get(&self, emotion: Emotion) -> f32 {
        self.probs[emotion.index()]
    }

    pub fn as_array(&self) -> &[f32; EMOTION_COUNT] {
        &self.probs
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.probs[e.index()]))
    }

    pub fn total(&self) -> f32 {
        self.probs.iter().sum()
    }

    /// Every entry finite and non-negative, and the total within
    /// [`NORMALIZATION_TOLERANCE`] of one.
    pub fn is_normalized(&self) -> bool {
        self.is_well_formed() && (self.total() - 1.0).abs() <= NORMALIZATION_TOLERANCE
    }

    /// Every entry finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        self.probs.iter().all(|p| p.is_finite() && *p >= 0.0)
    }

    /// Copy with non-finite or negative entries replaced by zero.
    pub fn sanitized(&self) -> Self {
        let mut probs = self.probs;
        for p in probs.iter_mut() {
            if !p.is_finite() || *p < 0.0 {
                *p = 0.0;
            }
        }
        Self { probs }
    }

    /// Producer-side helper: scale so the entries sum to one. A vector
    /// with no mass becomes uniform.
    pub fn normalized(&self) -> Self {
        let clean = self.sanitized();
        let total = clean.total();
        if total <= 0.0 {
            return Self::from_array([1.0 / EMOTION_COUNT as f32; EMOTION_COUNT]);
        }
        let mut probs = clean.probs;
        for p in probs.iter_mut() {
            *p /= total;
        }
        Self { probs }
    }

    /// Sum over angry, disgust, fear and sad.
    pub fn negative_score(&self) -> f32 {
        Emotion::NEGATIVE.iter().map(|&e| self.get(e)).sum()
    }

    /// Highest-probability label. Ties resolve to the label that comes
    /// first in canonical order.
    pub fn dominant(&self) -> (Emotion, f32) {
        let mut best = (Emotion::Angry, self.probs[0]);
        for &e in &Emotion::ALL[1..] {
            let p = self.get(e);
            if p > best.1 {
                best = (e, p);
            }
        }
        best
    }

    pub fn max_probability(&self) -> f32 {
        self.dominant().1
    }

    /// Population variance (divides by the label count).
    pub fn variance(&self) -> f32 {
        let n = EMOTION_COUNT as f32;
        let mean = self.total() / n;
        self.probs.iter().map(|p| (p - mean).powi(2)).sum::<f32>() / n
    }
}

impl std::ops::Index<Emotion> for EmotionVector {
    type Output = f32;

    fn index(&self, emotion: Emotion) -> &f32 {
        &self.probs[emotion.index()]
    }
}
