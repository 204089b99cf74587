use crate::error::AppError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Probes the duration of an audio stream on the local filesystem.
#[async_trait]
pub trait AudioDurationReader: Send + Sync {
    async fn duration_secs(&self, path: PathBuf) -> Result<f64, AppError>;
}
