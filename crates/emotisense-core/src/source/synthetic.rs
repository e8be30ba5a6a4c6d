//! Seeded synthetic tick generator

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::emotion::{Emotion, EmotionVector};

use super::{AffectSource, Tick};

/// Emotional scenario driving the synthetic generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Normal,
    Happy,
    Stressed,
    Confused,
}

impl Scenario {
    /// Scenarios picked by the random switcher.
    pub const SWITCHABLE: [Scenario; 3] = [Scenario::Normal, Scenario::Happy, Scenario::Stressed];
}

/// Phases of [`SyntheticSource::scripted_session`] and their share of it.
const SCRIPT: [(Scenario, f32); 4] = [
    (Scenario::Normal, 0.3),
    (Scenario::Stressed, 0.2),
    (Scenario::Happy, 0.3),
    (Scenario::Confused, 0.2),
];

/// Floor applied to every synthetic probability before normalizing.
const MIN_PROBABILITY: f32 = 0.01;
/// Half-width of the uniform noise added to synthetic stress.
const STRESS_NOISE: f32 = 0.1;

/// Smoothly varying, scenario-driven face and stress signals.
///
/// Each label follows its own phase-shifted sinusoid around a scenario
/// baseline; the scenario switches at random once `scenario_ticks` ticks
/// have passed, on tick `scenario_ticks + 1`.
/// With a seed the sequence is fully reproducible.
pub struct SyntheticSource {
    rng: StdRng,
    scenario: Scenario,
    scenario_ticks: u32,
    scenario_timer: u32,
    time_factor: u64,
}

impl SyntheticSource {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            scenario: Scenario::Normal,
            scenario_ticks: config.scenario_ticks.max(1),
            scenario_timer: 0,
            time_factor: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(&SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        })
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        self.scenario_timer = 0;
    }

    /// Next normalized face-emotion vector.
    pub fn generate_face_emotions(&mut self) -> EmotionVector {
        self.time_factor += 1;
        let t = self.time_factor as f32 * 0.1;
        let wave = |base: f32, amp: f32, freq: f32, phase: f32| base + amp * (t * freq + phase).sin();
        let cos = PI / 2.0;

        let raw = match self.scenario {
            Scenario::Happy => EmotionVector::zeros()
                .with(Emotion::Happy, wave(0.4, 0.3, 1.0, 0.0))
                .with(Emotion::Neutral, wave(0.3, 0.1, 0.7, cos))
                .with(Emotion::Surprise, wave(0.1, 0.1, 1.3, 0.0))
                .with(Emotion::Sad, wave(0.05, 0.05, 0.5, 0.0))
                .with(Emotion::Angry, wave(0.05, 0.05, 0.3, cos))
                .with(Emotion::Fear, wave(0.03, 0.02, 2.0, 0.0))
                .with(Emotion::Disgust, wave(0.02, 0.03, 1.7, cos)),
            Scenario::Stressed => EmotionVector::zeros()
                .with(Emotion::Angry, wave(0.3, 0.2, 1.2, 0.0))
                .with(Emotion::Fear, wave(0.2, 0.15, 0.8, cos))
                .with(Emotion::Sad, wave(0.15, 0.1, 0.6, 0.0))
                .with(Emotion::Neutral, wave(0.2, 0.1, 1.0, cos))
                .with(Emotion::Happy, wave(0.05, 0.05, 0.3, 0.0))
                .with(Emotion::Surprise, wave(0.05, 0.05, 1.5, cos))
                .with(Emotion::Disgust, wave(0.05, 0.05, 2.1, 0.0)),
            Scenario::Normal => EmotionVector::zeros()
                .with(Emotion::Neutral, wave(0.4, 0.2, 0.5, 0.0))
                .with(Emotion::Happy, wave(0.25, 0.15, 0.7, cos))
                .with(Emotion::Sad, wave(0.1, 0.08, 0.3, 0.0))
                .with(Emotion::Surprise, wave(0.08, 0.07, 1.1, cos))
                .with(Emotion::Angry, wave(0.07, 0.06, 0.9, 0.0))
                .with(Emotion::Fear, wave(0.05, 0.04, 1.3, cos))
                .with(Emotion::Disgust, wave(0.05, 0.04, 1.7, 0.0)),
            Scenario::Confused => EmotionVector::zeros()
                .with(Emotion::Neutral, wave(0.18, 0.03, 0.9, 0.0))
                .with(Emotion::Happy, wave(0.14, 0.03, 1.1, cos))
                .with(Emotion::Surprise, wave(0.16, 0.04, 1.4, 0.0))
                .with(Emotion::Sad, wave(0.14, 0.03, 0.7, cos))
                .with(Emotion::Fear, wave(0.14, 0.03, 1.6, 0.0))
                .with(Emotion::Angry, wave(0.12, 0.03, 0.8, cos))
                .with(Emotion::Disgust, wave(0.12, 0.03, 1.2, 0.0)),
        };

        let mut floored = raw;
        for e in Emotion::ALL {
            floored.set(e, raw.get(e).max(MIN_PROBABILITY));
        }

        self.scenario_timer += 1;
        if self.scenario_timer > self.scenario_ticks {
            let idx = self.rng.gen_range(0..Scenario::SWITCHABLE.len());
            self.scenario = Scenario::SWITCHABLE[idx];
            self.scenario_timer = 0;
        }

        floored.normalized()
    }

    /// Next vocal stress score in [0, 1].
    pub fn generate_audio_stress(&mut self) -> f32 {
        let t = self.time_factor as f32 * 0.08;
        let base = match self.scenario {
            Scenario::Stressed => 0.7 + 0.2 * (t * 1.5).sin(),
            Scenario::Happy => 0.2 + 0.15 * (t * 0.8).sin(),
            Scenario::Normal => 0.4 + 0.2 * t.sin(),
            Scenario::Confused => 0.5 + 0.1 * (t * 1.2).sin(),
        };
        let noise = self.rng.gen_range(-STRESS_NOISE..STRESS_NOISE);
        (base + noise).clamp(0.0, 1.0)
    }

    /// Phased demo session: normal, stressed, happy, then confused,
    /// taking 30/20/30/20 percent of the ticks.
    pub fn scripted_session(&mut self, ticks: usize) -> Vec<Tick> {
        let mut bounds = Vec::with_capacity(SCRIPT.len());
        let mut acc = 0usize;
        for (i, (scenario, share)) in SCRIPT.iter().enumerate() {
            acc = if i + 1 == SCRIPT.len() {
                ticks
            } else {
                acc + (ticks as f32 * share) as usize
            };
            bounds.push((acc, *scenario));
        }

        (0..ticks)
            .map(|i| {
                let phase = bounds
                    .iter()
                    .find(|(end, _)| i < *end)
                    .map(|(_, s)| *s)
                    .unwrap_or(Scenario::Normal);
                self.set_scenario(phase);
                let face_emotions = self.generate_face_emotions();
                let audio_stress = self.generate_audio_stress();
                Tick {
                    face_emotions,
                    audio_stress,
                }
            })
            .collect()
    }
}

impl AffectSource for SyntheticSource {
    fn next_tick(&mut self) -> Option<Tick> {
        let face_emotions = self.generate_face_emotions();
        let audio_stress = self.generate_audio_stress();
        Some(Tick {
            face_emotions,
            audio_stress,
        })
    }
}
