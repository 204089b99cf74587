use serde::{Deserialize, Serialize};

/// One `trait_type`/`value` pair of the ERC-721 metadata convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

impl NftAttribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// Metadata document serialized verbatim to `metadata.json`.
///
/// Every URI inside the document resolves under the same folder address
/// as the document itself, so publishing the folder CID makes the whole
/// bundle (track, cover, metadata) retrievable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub music: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub attributes: Vec<NftAttribute>,
}

/// Caller-supplied descriptive fields. Optional fields pass through
/// unvalidated; presence of `name`/`description` is checked by the
/// HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default, rename = "customAttributes")]
    pub custom_attributes: Vec<NftAttribute>,
}
