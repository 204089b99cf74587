use crate::error::AppError;
use async_trait::async_trait;
use std::path::Path;

/// Client of the hosted pinning provider. Implementations own the
/// authenticated session; callers only see content addresses.
#[async_trait]
pub trait PinningClient: Send + Sync {
    /// Upload one file under the given display name, returning its CID.
    async fn upload_file(&self, path: &Path, name: &str) -> Result<String, AppError>;

    /// Upload every regular file in the directory as one folder,
    /// returning the folder CID.
    async fn upload_directory(&self, dir: &Path) -> Result<String, AppError>;
}
