//! Local staging of upload content. Every guard here follows the same
//! discipline: the artifact is removed when the guard drops, so both
//! the success path and every error path leave the temp filesystem
//! clean.

use crate::error::AppError;
use log::warn;
use model::metadata::NftMetadata;
use model::uri::METADATA_FILE;
use std::path::{Path, PathBuf};

/// Temp-artifact name that cannot collide across in-flight requests.
pub fn unique_name(original: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), original)
}

/// Names get joined into guard-owned directories; anything that could
/// resolve outside of them is rejected.
fn check_file_name(name: &str) -> Result<(), AppError> {
    let plain = !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != "..";
    if plain {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid file name: {name}")))
    }
}

/// Staging directory owned by exactly one in-flight request.
pub struct StagedFolder {
    path: PathBuf,
}

impl StagedFolder {
    /// Create the directory under `root`. `dir_name` must be unique per
    /// request (see [`unique_name`]); an existing directory is reused.
    pub async fn create(root: &Path, dir_name: &str) -> Result<Self, AppError> {
        let path = root.join(dir_name);
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy track and cover into the staging directory under the given
    /// names. The two copies run concurrently.
    pub async fn stage_pair(
        &self,
        track: &Path,
        track_name: &str,
        cover: &Path,
        cover_name: &str,
    ) -> Result<(), AppError> {
        check_file_name(track_name)?;
        check_file_name(cover_name)?;
        let (track_copy, cover_copy) = tokio::join!(
            tokio::fs::copy(track, self.path.join(track_name)),
            tokio::fs::copy(cover, self.path.join(cover_name)),
        );
        track_copy?;
        cover_copy?;
        Ok(())
    }

    /// Write `metadata.json` into the staging directory, silently
    /// overwriting a leftover one from a prior failed run.
    pub async fn write_metadata(&self, metadata: &NftMetadata) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(self.path.join(METADATA_FILE), body).await?;
        Ok(())
    }
}

impl Drop for StagedFolder {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "failed to remove staging directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// `metadata.json` written into a caller-owned folder. Only the file is
/// removed on drop, never the caller's directory.
pub struct StagedMetadataFile {
    path: PathBuf,
}

impl StagedMetadataFile {
    pub async fn write(folder: &Path, metadata: &NftMetadata) -> Result<Self, AppError> {
        let path = folder.join(METADATA_FILE);
        let body = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&path, body).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedMetadataFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// One uploaded file spilled to the local temp filesystem by the HTTP
/// surface.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub async fn write(dir: &Path, file_name: &str, data: &[u8]) -> Result<Self, AppError> {
        check_file_name(file_name)?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::metadata::NftMetadata;
    use tempfile::TempDir;

    fn metadata() -> NftMetadata {
        NftMetadata {
            name: "n".to_string(),
            description: "d".to_string(),
            image: "cover.png".to_string(),
            music: "track.mp3".to_string(),
            external_url: None,
            attributes: vec![],
        }
    }

    #[tokio::test]
    async fn staged_folder_is_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let track = root.path().join("song.mp3");
        let cover = root.path().join("art.png");
        tokio::fs::write(&track, b"audio").await.unwrap();
        tokio::fs::write(&cover, b"image").await.unwrap();

        let staged_path;
        {
            let staged = StagedFolder::create(root.path(), "nft-1").await.unwrap();
            staged
                .stage_pair(&track, "track.mp3", &cover, "cover.png")
                .await
                .unwrap();
            staged.write_metadata(&metadata()).await.unwrap();
            staged_path = staged.path().to_path_buf();
            assert!(staged_path.join("track.mp3").exists());
            assert!(staged_path.join("cover.png").exists());
            assert!(staged_path.join(METADATA_FILE).exists());
        }
        assert!(!staged_path.exists());
        // originals are untouched
        assert!(track.exists());
        assert!(cover.exists());
    }

    #[tokio::test]
    async fn write_metadata_overwrites_a_leftover_document() {
        let root = TempDir::new().unwrap();
        let staged = StagedFolder::create(root.path(), "nft-2").await.unwrap();
        tokio::fs::write(staged.path().join(METADATA_FILE), b"stale")
            .await
            .unwrap();

        staged.write_metadata(&metadata()).await.unwrap();
        let body = tokio::fs::read_to_string(staged.path().join(METADATA_FILE))
            .await
            .unwrap();
        assert!(body.contains("track.mp3"));
    }

    #[tokio::test]
    async fn staged_metadata_file_leaves_the_folder_behind() {
        let folder = TempDir::new().unwrap();
        tokio::fs::write(folder.path().join("track.mp3"), b"audio")
            .await
            .unwrap();

        {
            let staged = StagedMetadataFile::write(folder.path(), &metadata())
                .await
                .unwrap();
            assert!(staged.path().exists());
        }
        assert!(!folder.path().join(METADATA_FILE).exists());
        assert!(folder.path().join("track.mp3").exists());
    }

    #[tokio::test]
    async fn temp_upload_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path;
        {
            let temp = TempUpload::write(dir.path(), "song.mp3", b"audio")
                .await
                .unwrap();
            path = temp.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn names_with_path_separators_are_rejected() {
        let root = TempDir::new().unwrap();
        let track = root.path().join("song.mp3");
        let cover = root.path().join("art.png");
        tokio::fs::write(&track, b"audio").await.unwrap();
        tokio::fs::write(&cover, b"image").await.unwrap();

        let staged = StagedFolder::create(root.path(), "nft-4").await.unwrap();
        let err = staged
            .stage_pair(&track, "../escape.mp3", &cover, "cover.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!root.path().join("escape.mp3").exists());

        let err = TempUpload::write(root.path(), "a/b.mp3", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = TempUpload::write(root.path(), "..", b"x").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn unique_names_do_not_collide() {
        let a = unique_name("song.mp3");
        let b = unique_name("song.mp3");
        assert_ne!(a, b);
        assert!(a.ends_with("song.mp3"));
    }
}
