use super::*;
use tempfile::TempDir;

#[test]
fn default_config_has_required_fields() {
    let config = AppConfig::default();

    assert_eq!(config.default_backend, "huggingface");
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.cache.capacity, 10_000);
    assert!(config.cache.ttl_secs.is_none());
    assert!(config.models.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn load_creates_default_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cascade").join("config.toml");

    let config = AppConfig::load_from(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config, AppConfig::default());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.default_backend = "mock".to_string();
    config.cache.ttl_secs = Some(300);
    config
        .update_setting("models.tiny.model", "org/tiny-model".to_string())
        .unwrap();
    config.save_to(&path).unwrap();

    let reloaded = AppConfig::load_from(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn partial_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
default_backend = "mock"

[cache]
ttl_secs = 60
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();

    assert_eq!(config.default_backend, "mock");
    assert_eq!(config.cache.capacity, DEFAULT_CACHE_CAPACITY);
    assert_eq!(config.cache.ttl_secs, Some(60));
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn invalid_toml_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "default_backend = [unclosed").unwrap();

    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidToml(_))
    ));
}

#[test]
fn unreadable_config_reports_io_context() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::create_dir(&path).unwrap();

    let err = AppConfig::load_from(&path).unwrap_err();
    assert_eq!(err.to_string(), "Failed to read config file");
    assert!(err.downcast_ref::<ConfigError>().is_none());
    assert!(err.downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn validate_rejects_zero_capacity() {
    let mut config = AppConfig::default();
    config.cache.capacity = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "cache.capacity"
    ));
}

#[test]
fn validate_rejects_unknown_backend() {
    let mut config = AppConfig::default();
    config.default_backend = "openai".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_empty_base_url() {
    let mut config = AppConfig::default();
    config.base_url = "  ".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_unknown_tier_override() {
    let mut config = AppConfig::default();
    config
        .models
        .insert("huge".to_string(), ModelOverride::default());

    assert!(config.validate().is_err());
}

#[test]
fn tier_table_applies_model_overrides() {
    let mut config = AppConfig::default();
    config.models.insert(
        "medium".to_string(),
        ModelOverride {
            model: Some("org/other-7b".to_string()),
        },
    );

    let table = config.tier_table().unwrap();

    assert_eq!(table.get(ModelTier::Medium).model_id, "org/other-7b");
    assert_eq!(table.get(ModelTier::Medium).name, "Mistral-7B");
    assert_eq!(table.get(ModelTier::Tiny).model_id, "microsoft/phi-2");
}

#[test]
fn decision_cache_follows_cache_section() {
    let mut config = AppConfig::default();
    config.cache.capacity = 3;

    assert_eq!(config.decision_cache().capacity(), 3);
}

#[test]
fn update_setting_known_keys() {
    let mut config = AppConfig::default();

    config
        .update_setting("default_backend", "mock".to_string())
        .unwrap();
    config.update_setting("api_key", "hf_secret".to_string()).unwrap();
    config
        .update_setting("cache.capacity", "42".to_string())
        .unwrap();
    config.update_setting("verbosity", "debug".to_string()).unwrap();
    config
        .update_setting("ledger_dir", "/tmp/ledger".to_string())
        .unwrap();

    assert_eq!(config.default_backend, "mock");
    assert_eq!(config.api_key.as_deref(), Some("hf_secret"));
    assert_eq!(config.cache.capacity, 42);
    assert_eq!(config.get_verbosity(), VerbosityLevel::Debug);
    assert_eq!(config.ledger_dir().unwrap(), PathBuf::from("/tmp/ledger"));
}

#[test]
fn update_setting_rejects_bad_values() {
    let mut config = AppConfig::default();

    assert!(
        config
            .update_setting("cache.capacity", "lots".to_string())
            .is_err()
    );
    assert!(
        config
            .update_setting("verbosity", "shouty".to_string())
            .is_err()
    );
    assert!(matches!(
        config.update_setting("temperature", "0.2".to_string()),
        Err(ConfigError::UnknownConfigKey { .. })
    ));
    assert!(matches!(
        config.update_setting("models.huge.model", "x".to_string()),
        Err(ConfigError::UnknownConfigKey { .. })
    ));
}

#[test]
fn unknown_verbosity_falls_back_to_normal() {
    let config = AppConfig {
        verbosity: Some("loud".to_string()),
        ..AppConfig::default()
    };

    assert_eq!(config.get_verbosity(), VerbosityLevel::Normal);
}

#[test]
fn api_key_is_masked() {
    assert_eq!(mask_api_key("hf_abcdefghijkl"), "hf_a...ijkl");
    assert_eq!(mask_api_key("short"), "***");
}
