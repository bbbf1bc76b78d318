use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Other error: {0}")]
    Other(String),
}
