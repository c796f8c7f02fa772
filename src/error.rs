use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
