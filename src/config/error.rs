use thiserror::Error;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    TomlDeError(#[from] toml::de::Error),
    #[error("config file not found")]
    ConfigNotFound,
}
