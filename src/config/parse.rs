use super::types::Config;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&raw)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server_url.trim().is_empty() {
        return Err(ConfigError::Invalid("server_url must not be empty".into()));
    }
    if config.buffer_base.file_name().is_none() {
        return Err(ConfigError::Invalid(
            "buffer_base must end in a file name prefix, not a directory".into(),
        ));
    }
    if config.batch_posting_limit == 0 {
        return Err(ConfigError::Invalid(
            "batch_posting_limit must be positive".into(),
        ));
    }
    if config.period.is_zero() {
        return Err(ConfigError::Invalid("period must be positive".into()));
    }
    if config.request_timeout.is_zero() {
        return Err(ConfigError::Invalid(
            "request_timeout must be positive".into(),
        ));
    }
    Ok(())
}
