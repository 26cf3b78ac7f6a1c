use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Failed to spawn timer thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ticktock_config::ConfigError> for ClockError {
    fn from(err: ticktock_config::ConfigError) -> Self {
        ClockError::Config(err.to_string())
    }
}
