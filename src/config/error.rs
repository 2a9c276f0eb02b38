use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML syntax: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to get home directory")]
    NoHomeDirectory,

    #[error("Unknown config key: {key}")]
    UnknownConfigKey { key: String },

    #[error("Failed to serialize config: {0}")]
    SerializationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
