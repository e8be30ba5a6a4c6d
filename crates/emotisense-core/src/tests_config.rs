#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::{AffectMonitor, Emotion, EmotionVector, FusionEngine, ManualClock, StressAlert};
    use parking_lot::Mutex;
    use std::env;
    use std::fs;
    use tempfile::NamedTempFile;

    // load_layered and apply_env_overrides read the process environment
    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    const ENV_VARS: [&str; 5] = [
        "EMOTISENSE_FUSION_FACE_WEIGHT",
        "EMOTISENSE_FUSION_AUDIO_WEIGHT",
        "EMOTISENSE_ALERT_STRESS_THRESHOLD",
        "EMOTISENSE_ALERT_DURATION_TICKS",
        "EMOTISENSE_SIMULATION_SEED",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_valid() {
        let config = EmotiSenseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fusion.face_weight, 0.6);
        assert_eq!(config.fusion.audio_weight, 0.4);
        assert_eq!(config.alert.stress_threshold, 0.7);
        assert_eq!(config.alert.duration_ticks, 5);
        assert_eq!(config.session.timeline_seconds, 60);
        assert_eq!(config.simulation.seed, None);
    }

    #[test]
    fn test_config_validation_fusion() {
        let mut config = EmotiSenseConfig::default();

        // weights must sum to one
        config.fusion.face_weight = 0.7;
        assert!(config.validate().is_err());

        config.fusion.face_weight = 1.2;
        config.fusion.audio_weight = -0.2;
        assert!(config.validate().is_err());

        config.fusion.face_weight = f32::NAN;
        config.fusion.audio_weight = 0.4;
        assert!(config.validate().is_err());

        config.fusion.face_weight = 1.0;
        config.fusion.audio_weight = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_alert() {
        let mut config = EmotiSenseConfig::default();

        config.alert.duration_ticks = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.alert.duration_ticks = 5;
        config.alert.stress_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_session_and_simulation() {
        let mut config = EmotiSenseConfig::default();
        config.session.timeline_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = EmotiSenseConfig::default();
        config.simulation.scenario_ticks = 0;
        assert!(config.validate().is_err());

        let mut config = EmotiSenseConfig::default();
        config.simulation.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_time_bounds() {
        let mut config = EmotiSenseConfig::default();
        config.session.timeline_seconds = 10_000_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.session.timeline_seconds = MAX_TIMELINE_SECONDS;
        assert!(config.validate().is_ok());
        let mut monitor = AffectMonitor::with_clock(&config, ManualClock::new(1_700_000_000_000_000));
        monitor.start();
        monitor.tick(&EmotionVector::zeros().with(Emotion::Neutral, 1.0), 0.2);
        assert_eq!(monitor.live_stress().len(), 1);

        config.simulation.tick_interval_ms = MAX_TICK_INTERVAL_MS + 1;
        assert!(config.validate().is_err());
        config.simulation.tick_interval_ms = MAX_TICK_INTERVAL_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_micros_saturate_without_validation() {
        let session = SessionConfig {
            timeline_seconds: u64::MAX,
        };
        assert_eq!(session.timeline_us(), i64::MAX);
        assert_eq!(SessionConfig::default().timeline_us(), 60_000_000);

        let simulation = SimulationConfig {
            tick_interval_ms: 10_000_000_000_000_000,
            ..SimulationConfig::default()
        };
        assert_eq!(simulation.tick_interval_us(), i64::MAX);
        assert_eq!(SimulationConfig::default().tick_interval_us(), 1_000_000);

        // unvalidated config still builds a monitor
        let config = EmotiSenseConfig {
            session,
            ..EmotiSenseConfig::default()
        };
        let mut monitor = AffectMonitor::with_clock(&config, ManualClock::new(-5));
        monitor.start();
        monitor.tick(&EmotionVector::zeros().with(Emotion::Sad, 1.0), 0.9);
        assert_eq!(monitor.live_stress().len(), 1);
    }

    #[test]
    fn test_config_to_toml_string() {
        let config = EmotiSenseConfig::default();
        let toml_str = config.to_toml_string().unwrap();

        assert!(toml_str.contains("[fusion]"));
        assert!(toml_str.contains("[alert]"));
        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[simulation]"));
        assert!(toml_str.contains("stress_threshold"));
    }

    #[test]
    fn test_config_from_toml_string() {
        let toml_str = r#"
            [fusion]
            face_weight = 0.5
            audio_weight = 0.5

            [alert]
            stress_threshold = 0.8
            duration_ticks = 3

            [session]
            timeline_seconds = 30

            [simulation]
            seed = 42
            scenario_ticks = 10
            tick_interval_ms = 500
        "#;

        let config: EmotiSenseConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.fusion.face_weight, 0.5);
        assert_eq!(config.alert.duration_ticks, 3);
        assert_eq!(config.session.timeline_seconds, 30);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.tick_interval_ms, 500);
    }

    #[test]
    fn test_partial_config_with_defaults() {
        let toml_str = r#"
            [alert]
            stress_threshold = 0.65
        "#;

        let config: EmotiSenseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.alert.stress_threshold, 0.65);
        assert_eq!(config.alert.duration_ticks, 5);
        assert_eq!(config.fusion, FusionConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let mut config = EmotiSenseConfig::default();
        config.simulation.seed = Some(7);

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();
        config.save_to_file(path).unwrap();

        let loaded = EmotiSenseConfig::from_file(path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_env_overrides() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        env::set_var("EMOTISENSE_FUSION_FACE_WEIGHT", "0.5");
        env::set_var("EMOTISENSE_FUSION_AUDIO_WEIGHT", "0.5");
        env::set_var("EMOTISENSE_ALERT_STRESS_THRESHOLD", "0.8");
        env::set_var("EMOTISENSE_ALERT_DURATION_TICKS", "3");
        env::set_var("EMOTISENSE_SIMULATION_SEED", "99");

        let mut config = EmotiSenseConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.fusion.face_weight, 0.5);
        assert_eq!(config.fusion.audio_weight, 0.5);
        assert_eq!(config.alert.stress_threshold, 0.8);
        assert_eq!(config.alert.duration_ticks, 3);
        assert_eq!(config.simulation.seed, Some(99));

        clear_env();
    }

    #[test]
    fn test_invalid_env_var_handling() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        env::set_var("EMOTISENSE_ALERT_DURATION_TICKS", "five");
        let mut config = EmotiSenseConfig::default();
        assert!(config.apply_env_overrides().is_err());

        clear_env();
    }

    #[test]
    fn test_config_layered_loading() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        let default_file = NamedTempFile::new().unwrap();
        let user_file = NamedTempFile::new().unwrap();

        let mut default_config = EmotiSenseConfig::default();
        default_config.session.timeline_seconds = 120;
        default_config.alert.duration_ticks = 8;
        default_config.save_to_file(default_file.path()).unwrap();

        // user file names only the alert section
        fs::write(
            user_file.path(),
            "[alert]\nstress_threshold = 0.6\nduration_ticks = 4\n",
        )
        .unwrap();

        let loaded =
            EmotiSenseConfig::load_layered(Some(default_file.path()), Some(user_file.path()))
                .unwrap();

        assert_eq!(loaded.alert.stress_threshold, 0.6);
        assert_eq!(loaded.alert.duration_ticks, 4);
        // untouched sections keep the default file's values
        assert_eq!(loaded.session.timeline_seconds, 120);
    }

    #[test]
    fn test_layered_loading_missing_files() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        let loaded = EmotiSenseConfig::load_layered(
            Some(std::path::Path::new("/nonexistent/default.toml")),
            None,
        )
        .unwrap();
        assert_eq!(loaded, EmotiSenseConfig::default());
    }

    #[test]
    fn test_layered_loading_rejects_invalid_result() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        let user_file = NamedTempFile::new().unwrap();
        fs::write(user_file.path(), "[fusion]\nface_weight = 0.9\naudio_weight = 0.9\n").unwrap();
        let result = EmotiSenseConfig::load_layered(None, Some(user_file.path()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_file_not_found() {
        let result = EmotiSenseConfig::from_file("nonexistent.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "invalid toml: syntax").unwrap();

        let result = EmotiSenseConfig::from_file(temp_file.path());
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_components_from_config() {
        let mut config = EmotiSenseConfig::default();
        config.fusion.face_weight = 0.3;
        config.fusion.audio_weight = 0.7;
        config.alert.stress_threshold = 0.5;
        config.alert.duration_ticks = 2;

        let engine = FusionEngine::with_config(&config.fusion);
        assert_eq!(engine.face_weight(), 0.3);
        assert_eq!(engine.audio_weight(), 0.7);

        let alert = StressAlert::from_config(&config.alert);
        assert_eq!(alert, StressAlert::new(0.5, 2));

        let monitor = AffectMonitor::with_clock(&config, ManualClock::new(0));
        assert_eq!(monitor.stress_alert().duration, 2);
        assert_eq!(monitor.engine().face_weight(), 0.3);
    }
}
