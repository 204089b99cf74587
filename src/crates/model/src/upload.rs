//! Upload result payloads. These are shaped for the wire and
//! serialized as-is by the HTTP layer; nothing is persisted
//! server-side, the pinning provider is the system of record.

use crate::metadata::NftMetadata;
use serde::Serialize;

/// Result of a single-file upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResult {
    pub cid: String,
    pub ipfs_url: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderFileEntry {
    pub name: String,
    pub url: String,
}

/// Result of uploading a directory as one folder address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUploadResult {
    pub folder_cid: String,
    pub folder_url: String,
    pub gateway_url: String,
    pub files: Vec<FolderFileEntry>,
    pub folder_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairFileNames {
    pub track: String,
    pub cover: String,
}

/// Track and cover staged into one folder, with per-file URLs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCoverFolderResult {
    pub folder_cid: String,
    pub folder_url: String,
    pub gateway_url: String,
    pub track_url: String,
    pub cover_url: String,
    pub files: PairFileNames,
}

/// Folder upload plus a separately uploaded `metadata.json` that
/// references the folder address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderWithMetadataResult {
    #[serde(flatten)]
    pub folder: FolderUploadResult,
    pub metadata: NftMetadata,
    pub metadata_cid: String,
    pub metadata_url: String,
    pub metadata_gateway_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCoverWithMetadataResult {
    #[serde(flatten)]
    pub folder: TrackCoverFolderResult,
    pub metadata: NftMetadata,
    pub metadata_cid: String,
    pub metadata_url: String,
    pub metadata_gateway_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NftFileNames {
    pub track: String,
    pub cover: String,
    pub metadata: String,
}

/// Full bundle of the compound auto-metadata flow: one folder address
/// covering track, cover and `metadata.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftUploadResult {
    pub token_id: String,
    pub folder_name: String,
    pub folder_cid: String,
    pub folder_url: String,
    pub gateway_url: String,
    pub metadata: NftMetadata,
    pub metadata_url: String,
    pub track_url: String,
    pub cover_url: String,
    pub files: NftFileNames,
}
