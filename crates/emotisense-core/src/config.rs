use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotiSenseConfig {
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the face negative score in the stress sum
    pub face_weight: f32,
    /// Weight of the vocal stress score in the stress sum
    pub audio_weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Stress level every trailing value must exceed
    pub stress_threshold: f32,
    /// Number of trailing ticks that must all exceed the threshold
    pub duration_ticks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Trailing window shown on the live stress chart (seconds)
    pub timeline_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the synthetic source. None draws one from the OS.
    pub seed: Option<u64>,
    /// Ticks a scenario holds before a random switch
    pub scenario_ticks: u32,
    /// Simulated time between ticks (milliseconds)
    pub tick_interval_ms: u64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            face_weight: 0.6,
            audio_weight: 0.4,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            stress_threshold: 0.7,
            duration_ticks: 5,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeline_seconds: 60,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            scenario_ticks: 20,
            tick_interval_ms: 1_000,
        }
    }
}

/// Largest `timeline_seconds` whose microsecond value fits in an i64.
pub const MAX_TIMELINE_SECONDS: u64 = (i64::MAX / 1_000_000) as u64;
/// Largest `tick_interval_ms` whose microsecond value fits in an i64.
pub const MAX_TICK_INTERVAL_MS: u64 = (i64::MAX / 1_000) as u64;

/// `value * scale` as i64, saturating at `i64::MAX`.
fn to_micros(value: u64, scale: i64) -> i64 {
    i64::try_from(value)
        .ok()
        .and_then(|v| v.checked_mul(scale))
        .unwrap_or(i64::MAX)
}

impl SessionConfig {
    /// Live timeline window in microseconds.
    pub fn timeline_us(&self) -> i64 {
        to_micros(self.timeline_seconds, 1_000_000)
    }
}

impl SimulationConfig {
    /// Simulated time between ticks in microseconds.
    pub fn tick_interval_us(&self) -> i64 {
        to_micros(self.tick_interval_ms, 1_000)
    }
}

impl EmotiSenseConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: EmotiSenseConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    /// Variables are prefixed with EMOTISENSE_,
    /// e.g. EMOTISENSE_ALERT_STRESS_THRESHOLD=0.8
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = EmotiSenseConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // Sections missing from the user file fall back to serde defaults,
        // so a user file replaces whole sections it names.
        if let Some(path) = user_path {
            if path.exists() {
                let content = fs::read_to_string(path)?;
                let user: toml::Table = toml::from_str(&content)?;
                config = config.merge(user)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Overlay the sections present in `user` onto self.
    fn merge(mut self, user: toml::Table) -> Result<Self, ConfigError> {
        if let Some(v) = user.get("fusion") {
            self.fusion = v.clone().try_into()?;
        }
        if let Some(v) = user.get("alert") {
            self.alert = v.clone().try_into()?;
        }
        if let Some(v) = user.get("session") {
            self.session = v.clone().try_into()?;
        }
        if let Some(v) = user.get("simulation") {
            self.simulation = v.clone().try_into()?;
        }
        Ok(self)
    }

    /// Apply environment variable overrides
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env;

        if let Ok(val) = env::var("EMOTISENSE_FUSION_FACE_WEIGHT") {
            self.fusion.face_weight = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid EMOTISENSE_FUSION_FACE_WEIGHT".to_string())
            })?;
        }
        if let Ok(val) = env::var("EMOTISENSE_FUSION_AUDIO_WEIGHT") {
            self.fusion.audio_weight = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid EMOTISENSE_FUSION_AUDIO_WEIGHT".to_string())
            })?;
        }

        if let Ok(val) = env::var("EMOTISENSE_ALERT_STRESS_THRESHOLD") {
            self.alert.stress_threshold = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid EMOTISENSE_ALERT_STRESS_THRESHOLD".to_string())
            })?;
        }
        if let Ok(val) = env::var("EMOTISENSE_ALERT_DURATION_TICKS") {
            self.alert.duration_ticks = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid EMOTISENSE_ALERT_DURATION_TICKS".to_string())
            })?;
        }

        if let Ok(val) = env::var("EMOTISENSE_SIMULATION_SEED") {
            self.simulation.seed = Some(val.parse().map_err(|_| {
                ConfigError::Validation("Invalid EMOTISENSE_SIMULATION_SEED".to_string())
            })?);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fw = self.fusion.face_weight;
        let aw = self.fusion.audio_weight;
        if !fw.is_finite() || !(0.0..=1.0).contains(&fw) {
            return Err(ConfigError::Validation(
                "fusion.face_weight must be in [0, 1]".to_string(),
            ));
        }
        if !aw.is_finite() || !(0.0..=1.0).contains(&aw) {
            return Err(ConfigError::Validation(
                "fusion.audio_weight must be in [0, 1]".to_string(),
            ));
        }
        if ((fw + aw) - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Validation(
                "fusion.face_weight + fusion.audio_weight must equal 1".to_string(),
            ));
        }

        let th = self.alert.stress_threshold;
        if !th.is_finite() || !(0.0..=1.0).contains(&th) {
            return Err(ConfigError::Validation(
                "alert.stress_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.alert.duration_ticks == 0 {
            return Err(ConfigError::Validation(
                "alert.duration_ticks must be >= 1".to_string(),
            ));
        }

        if !(1..=MAX_TIMELINE_SECONDS).contains(&self.session.timeline_seconds) {
            return Err(ConfigError::Validation(format!(
                "session.timeline_seconds must be in [1, {MAX_TIMELINE_SECONDS}]"
            )));
        }

        if self.simulation.scenario_ticks == 0 {
            return Err(ConfigError::Validation(
                "simulation.scenario_ticks must be >= 1".to_string(),
            ));
        }
        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.simulation.tick_interval_ms) {
            return Err(ConfigError::Validation(format!(
                "simulation.tick_interval_ms must be in [1, {MAX_TICK_INTERVAL_MS}]"
            )));
        }

        Ok(())
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        fs::write(path, content)?;
        Ok(())
    }
}
