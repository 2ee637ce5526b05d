use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
