use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Pinning(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse audio metadata error: {0}")]
    ParseAudioMetadata(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
