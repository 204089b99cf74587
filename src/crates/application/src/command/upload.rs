//! Upload orchestration: staging, metadata construction, the calls
//! into the pinning provider and the URI shaping of the results.
//! Failures are terminal for the request; nothing here retries.

use crate::command::media::AudioDurationReader;
use crate::command::metadata::MetadataBuilder;
use crate::command::pinning::PinningClient;
use crate::command::staging::{StagedFolder, StagedMetadataFile};
use crate::error::AppError;
use crate::shared::{current_timestamp, TokenIdGenerator};
use log::{info, warn};
use model::metadata::{MetadataInput, NftAttribute};
use model::upload::{
    FileUploadResult, FolderFileEntry, FolderUploadResult, FolderWithMetadataResult, NftFileNames,
    NftUploadResult, PairFileNames, TrackCoverFolderResult, TrackCoverWithMetadataResult,
};
use model::uri;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// HTTPS gateway base for upload results, e.g. `https://w3s.link/ipfs/`.
    pub gateway_base: String,
    /// Base URL for generated `external_url` values.
    pub public_base_url: String,
    /// Root directory for per-request staging.
    pub staging_root: PathBuf,
}

/// Fields of the compound auto-metadata upload.
#[derive(Debug, Clone)]
pub struct NftUploadRequest {
    pub prompt: String,
    pub username: String,
    pub token_id: Option<String>,
    pub external_url: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct UploadService {
    pinning: Arc<dyn PinningClient>,
    durations: Arc<dyn AudioDurationReader>,
    token_ids: Arc<dyn TokenIdGenerator>,
    opts: UploadOptions,
}

impl UploadService {
    pub fn new(
        pinning: Arc<dyn PinningClient>,
        durations: Arc<dyn AudioDurationReader>,
        token_ids: Arc<dyn TokenIdGenerator>,
        opts: UploadOptions,
    ) -> Self {
        Self {
            pinning,
            durations,
            token_ids,
            opts,
        }
    }

    fn gateway(&self, cid: &str) -> String {
        format!("{}{}", self.opts.gateway_base, cid)
    }

    pub async fn upload_file(&self, path: &Path, name: &str) -> Result<FileUploadResult, AppError> {
        let cid = self.pinning.upload_file(path, name).await?;
        Ok(FileUploadResult {
            ipfs_url: uri::ipfs_url(&cid),
            gateway_url: self.gateway(&cid),
            cid,
        })
    }

    pub async fn upload_track(&self, path: &Path) -> Result<FileUploadResult, AppError> {
        self.upload_file(path, &file_name(path)?).await
    }

    pub async fn upload_cover(&self, path: &Path) -> Result<FileUploadResult, AppError> {
        self.upload_file(path, &file_name(path)?).await
    }

    /// Upload an existing server-local directory as one folder address.
    pub async fn upload_folder(
        &self,
        folder: &Path,
        custom_name: Option<&str>,
    ) -> Result<FolderUploadResult, AppError> {
        let meta = tokio::fs::metadata(folder).await.map_err(|_| {
            AppError::InvalidInput(format!("Folder does not exist: {}", folder.display()))
        })?;
        if !meta.is_dir() {
            return Err(AppError::InvalidInput(format!(
                "Path is not a folder: {}",
                folder.display()
            )));
        }

        let folder_name = match custom_name {
            Some(name) => name.to_string(),
            None => file_name(folder)?,
        };

        info!("uploading folder {}", folder.display());
        let file_names = list_files(folder).await?;
        let cid = self.pinning.upload_directory(folder).await?;

        let files = file_names
            .into_iter()
            .map(|name| FolderFileEntry {
                url: uri::file_url(&cid, &name),
                name,
            })
            .collect();

        Ok(FolderUploadResult {
            folder_url: uri::ipfs_url(&cid),
            gateway_url: self.gateway(&cid),
            files,
            folder_name,
            folder_cid: cid,
        })
    }

    /// Stage track and cover into one directory and upload it as a
    /// folder, so both files share one content address.
    pub async fn upload_track_cover_as_folder(
        &self,
        track: &Path,
        track_name: &str,
        cover: &Path,
        cover_name: &str,
        display_name: &str,
    ) -> Result<TrackCoverFolderResult, AppError> {
        let staged = StagedFolder::create(&self.opts.staging_root, &staging_dir_name()).await?;
        staged
            .stage_pair(track, track_name, cover, cover_name)
            .await?;

        let folder = self
            .upload_folder(staged.path(), Some(display_name))
            .await?;

        Ok(TrackCoverFolderResult {
            track_url: uri::file_url(&folder.folder_cid, track_name),
            cover_url: uri::file_url(&folder.folder_cid, cover_name),
            folder_cid: folder.folder_cid,
            folder_url: folder.folder_url,
            gateway_url: folder.gateway_url,
            files: PairFileNames {
                track: track_name.to_string(),
                cover: cover_name.to_string(),
            },
        })
    }

    /// Upload an existing folder, then build `metadata.json` against
    /// the folder address and upload it as a separate file. The
    /// document is removed from the caller's folder afterwards,
    /// including on failure.
    pub async fn upload_folder_with_metadata(
        &self,
        folder: &Path,
        track_file: &str,
        cover_file: &str,
        input: &MetadataInput,
        custom_name: Option<&str>,
    ) -> Result<FolderWithMetadataResult, AppError> {
        let folder_result = self.upload_folder(folder, custom_name).await?;
        let metadata =
            MetadataBuilder::build(&folder_result.folder_cid, track_file, cover_file, input);

        let staged = StagedMetadataFile::write(folder, &metadata).await?;
        let metadata_file = self.upload_file(staged.path(), uri::METADATA_FILE).await?;

        Ok(FolderWithMetadataResult {
            folder: folder_result,
            metadata,
            metadata_cid: metadata_file.cid,
            metadata_url: metadata_file.ipfs_url,
            metadata_gateway_url: metadata_file.gateway_url,
        })
    }

    /// Staged-pair variant of [`upload_folder_with_metadata`].
    ///
    /// [`upload_folder_with_metadata`]: Self::upload_folder_with_metadata
    pub async fn upload_track_cover_with_metadata(
        &self,
        track: &Path,
        track_name: &str,
        cover: &Path,
        cover_name: &str,
        input: &MetadataInput,
        display_name: &str,
    ) -> Result<TrackCoverWithMetadataResult, AppError> {
        let staged = StagedFolder::create(&self.opts.staging_root, &staging_dir_name()).await?;
        staged
            .stage_pair(track, track_name, cover, cover_name)
            .await?;

        let folder = self
            .upload_folder(staged.path(), Some(display_name))
            .await?;
        let metadata = MetadataBuilder::build(&folder.folder_cid, track_name, cover_name, input);

        let meta_file = StagedMetadataFile::write(staged.path(), &metadata).await?;
        let metadata_file = self.upload_file(meta_file.path(), uri::METADATA_FILE).await?;

        Ok(TrackCoverWithMetadataResult {
            folder: TrackCoverFolderResult {
                track_url: uri::file_url(&folder.folder_cid, track_name),
                cover_url: uri::file_url(&folder.folder_cid, cover_name),
                folder_cid: folder.folder_cid,
                folder_url: folder.folder_url,
                gateway_url: folder.gateway_url,
                files: PairFileNames {
                    track: track_name.to_string(),
                    cover: cover_name.to_string(),
                },
            },
            metadata,
            metadata_cid: metadata_file.cid,
            metadata_url: metadata_file.ipfs_url,
            metadata_gateway_url: metadata_file.gateway_url,
        })
    }

    /// Compound auto-metadata flow: stage track and cover under fixed
    /// names, write `metadata.json` into the same staging directory,
    /// upload the complete folder once and derive every URI from the
    /// single resulting address.
    pub async fn upload_music_nft(
        &self,
        track: &Path,
        cover: &Path,
        request: &NftUploadRequest,
    ) -> Result<NftUploadResult, AppError> {
        let token_id = request
            .token_id
            .clone()
            .unwrap_or_else(|| self.token_ids.generate());

        let duration = match self.durations.duration_secs(track.to_path_buf()).await {
            Ok(secs) => MetadataBuilder::format_duration(secs),
            Err(e) => {
                warn!("failed to probe track duration: {}", e);
                "0:00".to_string()
            }
        };
        let created_at = current_timestamp();

        let display_name = request
            .name
            .clone()
            .unwrap_or_else(|| format!("AI Music #{token_id}"));

        let track_name = fixed_name("track", track);
        let cover_name = fixed_name("cover", cover);

        let external_url = request.external_url.clone().unwrap_or_else(|| {
            format!("{}/my-nft/{}", self.opts.public_base_url, token_id)
        });

        let input = MetadataInput {
            name: display_name.clone(),
            description: request.prompt.clone(),
            artist: request.username.clone(),
            duration,
            format: extension(track).to_uppercase(),
            external_url: Some(external_url),
            custom_attributes: vec![NftAttribute::new("Created At", created_at)],
        };

        let staged = StagedFolder::create(&self.opts.staging_root, &staging_dir_name()).await?;
        staged
            .stage_pair(track, &track_name, cover, &cover_name)
            .await?;

        // metadata.json travels inside the folder, so its file
        // references stay relative to the folder address.
        let metadata = MetadataBuilder::build_relative(&track_name, &cover_name, &input);
        staged.write_metadata(&metadata).await?;

        let cid = self.pinning.upload_directory(staged.path()).await?;
        info!("uploaded music NFT '{}' as {}", display_name, cid);

        Ok(NftUploadResult {
            token_id,
            folder_name: display_name,
            folder_url: uri::ipfs_url(&cid),
            gateway_url: self.gateway(&cid),
            metadata,
            metadata_url: uri::token_uri(&cid, true),
            track_url: uri::file_url(&cid, &track_name),
            cover_url: uri::file_url(&cid, &cover_name),
            files: NftFileNames {
                track: track_name,
                cover: cover_name,
                metadata: uri::METADATA_FILE.to_string(),
            },
            folder_cid: cid,
        })
    }
}

fn file_name(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid file path: {}", path.display())))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// `track.<ext>` / `cover.<ext>`, so metadata references are stable
/// regardless of the original upload filename.
fn fixed_name(stem: &str, path: &Path) -> String {
    let ext = extension(path);
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    }
}

/// Staging directory names derive from a fresh UUID, never from
/// user-supplied display names, so concurrent requests cannot collide.
fn staging_dir_name() -> String {
    format!("nft-{}", uuid::Uuid::new_v4())
}

async fn list_files(folder: &Path) -> Result<Vec<String>, AppError> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records what the provider saw; optionally fails every call.
    struct FakePinning {
        fail: bool,
        directory_listings: Mutex<Vec<Vec<String>>>,
    }

    impl FakePinning {
        fn new() -> Self {
            Self {
                fail: false,
                directory_listings: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                directory_listings: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl PinningClient for FakePinning {
        async fn upload_file(&self, _path: &Path, _name: &str) -> Result<String, AppError> {
            if self.fail {
                return Err(AppError::Pinning("Failed to upload file to IPFS: down".into()));
            }
            Ok("bafyfile".to_string())
        }

        async fn upload_directory(&self, dir: &Path) -> Result<String, AppError> {
            if self.fail {
                return Err(AppError::Pinning("Failed to upload folder to IPFS: down".into()));
            }
            let listing = list_files(dir).await.unwrap();
            self.directory_listings.lock().unwrap().push(listing);
            Ok("bafyfolder".to_string())
        }
    }

    struct FixedDuration(f64);

    #[async_trait::async_trait]
    impl AudioDurationReader for FixedDuration {
        async fn duration_secs(&self, _path: PathBuf) -> Result<f64, AppError> {
            Ok(self.0)
        }
    }

    struct FailingDuration;

    #[async_trait::async_trait]
    impl AudioDurationReader for FailingDuration {
        async fn duration_secs(&self, _path: PathBuf) -> Result<f64, AppError> {
            Err(AppError::ParseAudioMetadata("not audio".into()))
        }
    }

    struct FixedIds;

    impl TokenIdGenerator for FixedIds {
        fn generate(&self) -> String {
            "tok-1".to_string()
        }
    }

    struct Harness {
        pinning: Arc<FakePinning>,
        service: UploadService,
        staging: TempDir,
        content: TempDir,
    }

    fn harness_with(pinning: FakePinning, durations: Arc<dyn AudioDurationReader>) -> Harness {
        let pinning = Arc::new(pinning);
        let staging = TempDir::new().unwrap();
        let service = UploadService::new(
            pinning.clone(),
            durations,
            Arc::new(FixedIds),
            UploadOptions {
                gateway_base: "https://w3s.link/ipfs/".to_string(),
                public_base_url: "http://localhost:3000".to_string(),
                staging_root: staging.path().to_path_buf(),
            },
        );
        Harness {
            pinning,
            service,
            staging,
            content: TempDir::new().unwrap(),
        }
    }

    fn harness() -> Harness {
        harness_with(FakePinning::new(), Arc::new(FixedDuration(183.0)))
    }

    impl Harness {
        async fn pair(&self) -> (PathBuf, PathBuf) {
            let track = self.content.path().join("song.mp3");
            let cover = self.content.path().join("art.png");
            tokio::fs::write(&track, b"audio").await.unwrap();
            tokio::fs::write(&cover, b"image").await.unwrap();
            (track, cover)
        }

        fn staging_is_empty(&self) -> bool {
            std::fs::read_dir(self.staging.path()).unwrap().next().is_none()
        }
    }

    #[tokio::test]
    async fn upload_file_shapes_both_uri_forms() {
        let h = harness();
        let (track, _) = h.pair().await;

        let result = h.service.upload_file(&track, "song.mp3").await.unwrap();
        assert_eq!(result.cid, "bafyfile");
        assert_eq!(result.ipfs_url, "ipfs://bafyfile");
        assert_eq!(result.gateway_url, "https://w3s.link/ipfs/bafyfile");
    }

    #[tokio::test]
    async fn track_and_cover_wrappers_use_the_path_file_name() {
        let h = harness();
        let (track, cover) = h.pair().await;

        let result = h.service.upload_track(&track).await.unwrap();
        assert_eq!(result.ipfs_url, "ipfs://bafyfile");
        let result = h.service.upload_cover(&cover).await.unwrap();
        assert_eq!(result.gateway_url, "https://w3s.link/ipfs/bafyfile");

        let err = h
            .service
            .upload_track(Path::new("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn upload_folder_rejects_a_missing_directory() {
        let h = harness();
        let err = h
            .service
            .upload_folder(Path::new("/no/such/folder"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn upload_folder_rejects_a_plain_file() {
        let h = harness();
        let (track, _) = h.pair().await;
        let err = h.service.upload_folder(&track, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn track_cover_folder_keeps_original_names_and_cleans_up() {
        let h = harness();
        let (track, cover) = h.pair().await;

        let result = h
            .service
            .upload_track_cover_as_folder(&track, "song.mp3", &cover, "art.png", "music-nft")
            .await
            .unwrap();

        assert_eq!(result.folder_cid, "bafyfolder");
        assert_eq!(result.track_url, "ipfs://bafyfolder/song.mp3");
        assert_eq!(result.cover_url, "ipfs://bafyfolder/art.png");
        assert_eq!(result.files.track, "song.mp3");
        assert!(h.staging_is_empty());
    }

    #[tokio::test]
    async fn staging_is_cleaned_up_when_the_provider_fails() {
        let h = harness_with(FakePinning::failing(), Arc::new(FixedDuration(183.0)));
        let (track, cover) = h.pair().await;

        let err = h
            .service
            .upload_track_cover_as_folder(&track, "song.mp3", &cover, "art.png", "music-nft")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pinning(_)));
        assert!(h.staging_is_empty());

        let err = h
            .service
            .upload_music_nft(
                &track,
                &cover,
                &NftUploadRequest {
                    prompt: "p".into(),
                    username: "u".into(),
                    token_id: None,
                    external_url: None,
                    name: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pinning(_)));
        assert!(h.staging_is_empty());
    }

    #[tokio::test]
    async fn folder_with_metadata_uploads_the_document_separately() {
        let h = harness();
        let folder = h.content.path().join("album");
        tokio::fs::create_dir(&folder).await.unwrap();
        tokio::fs::write(folder.join("song.mp3"), b"audio").await.unwrap();
        tokio::fs::write(folder.join("art.png"), b"image").await.unwrap();

        let input = MetadataInput {
            name: "Music NFT #1".into(),
            description: "Description".into(),
            artist: "Artist".into(),
            duration: "3:25".into(),
            format: "MP3".into(),
            external_url: None,
            custom_attributes: vec![],
        };

        let result = h
            .service
            .upload_folder_with_metadata(&folder, "song.mp3", "art.png", &input, Some("album"))
            .await
            .unwrap();

        assert_eq!(result.folder.folder_cid, "bafyfolder");
        assert_eq!(result.metadata_cid, "bafyfile");
        assert_eq!(result.metadata.image, "ipfs://bafyfolder/art.png");
        assert_eq!(result.metadata.music, "ipfs://bafyfolder/song.mp3");
        // the caller's folder survives, the staged document does not
        assert!(folder.join("song.mp3").exists());
        assert!(!folder.join("metadata.json").exists());
    }

    #[tokio::test]
    async fn music_nft_uploads_one_folder_containing_the_metadata() {
        let h = harness();
        let (track, cover) = h.pair().await;

        let result = h
            .service
            .upload_music_nft(
                &track,
                &cover,
                &NftUploadRequest {
                    prompt: "lofi beats".into(),
                    username: "alice".into(),
                    token_id: None,
                    external_url: None,
                    name: None,
                },
            )
            .await
            .unwrap();

        // a single directory upload carried all three files
        let listings = h.pinning.directory_listings.lock().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0], ["cover.png", "metadata.json", "track.mp3"]);
        drop(listings);

        assert_eq!(result.token_id, "tok-1");
        assert_eq!(result.folder_name, "AI Music #tok-1");
        assert_eq!(result.metadata_url, "ipfs://bafyfolder/metadata.json");
        assert_eq!(result.track_url, "ipfs://bafyfolder/track.mp3");
        assert_eq!(result.cover_url, "ipfs://bafyfolder/cover.png");

        // metadata references stay relative to the folder address
        assert_eq!(result.metadata.image, "cover.png");
        assert_eq!(result.metadata.music, "track.mp3");
        assert_eq!(
            result.metadata.external_url.as_deref(),
            Some("http://localhost:3000/my-nft/tok-1")
        );

        let traits: Vec<&str> = result
            .metadata
            .attributes
            .iter()
            .map(|a| a.trait_type.as_str())
            .collect();
        assert_eq!(traits, ["Artist", "Duration", "Format", "Created At"]);
        assert_eq!(result.metadata.attributes[0].value, "alice");
        assert_eq!(result.metadata.attributes[1].value, "3:03");
        assert_eq!(result.metadata.attributes[2].value, "MP3");

        assert!(h.staging_is_empty());
    }

    #[tokio::test]
    async fn music_nft_honors_caller_supplied_fields() {
        let h = harness();
        let (track, cover) = h.pair().await;

        let result = h
            .service
            .upload_music_nft(
                &track,
                &cover,
                &NftUploadRequest {
                    prompt: "p".into(),
                    username: "u".into(),
                    token_id: Some("42".into()),
                    external_url: Some("https://example.com/42".into()),
                    name: Some("My Song".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.token_id, "42");
        assert_eq!(result.folder_name, "My Song");
        assert_eq!(result.metadata.name, "My Song");
        assert_eq!(
            result.metadata.external_url.as_deref(),
            Some("https://example.com/42")
        );
    }

    #[tokio::test]
    async fn duration_probe_failure_degrades_to_zero() {
        let h = harness_with(FakePinning::new(), Arc::new(FailingDuration));
        let (track, cover) = h.pair().await;

        let result = h
            .service
            .upload_music_nft(
                &track,
                &cover,
                &NftUploadRequest {
                    prompt: "p".into(),
                    username: "u".into(),
                    token_id: None,
                    external_url: None,
                    name: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.metadata.attributes[1].value, "0:00");
    }
}
