use model::metadata::{MetadataInput, NftAttribute, NftMetadata};
use model::uri;

/// Builds the canonical metadata document. Pure; malformed optional
/// fields pass through unchanged.
pub struct MetadataBuilder;

impl MetadataBuilder {
    /// Metadata referencing files by absolute `ipfs://<folder>/<file>`
    /// URIs. Used when the folder CID is already known, i.e. when the
    /// document is uploaded separately after the folder.
    pub fn build(
        folder_cid: &str,
        track_file: &str,
        cover_file: &str,
        input: &MetadataInput,
    ) -> NftMetadata {
        Self::assemble(
            uri::file_url(folder_cid, cover_file),
            uri::file_url(folder_cid, track_file),
            input,
        )
    }

    /// Metadata referencing files by bare relative names. Used when the
    /// document is written into the folder before the single folder
    /// upload: the folder CID cannot appear inside a file that
    /// contributes to that CID, and relative names resolve under the
    /// same folder address.
    pub fn build_relative(track_file: &str, cover_file: &str, input: &MetadataInput) -> NftMetadata {
        Self::assemble(cover_file.to_string(), track_file.to_string(), input)
    }

    fn assemble(image: String, music: String, input: &MetadataInput) -> NftMetadata {
        let mut attributes = vec![
            NftAttribute::new("Artist", input.artist.clone()),
            NftAttribute::new("Duration", input.duration.clone()),
            NftAttribute::new("Format", input.format.clone()),
        ];
        attributes.extend(input.custom_attributes.iter().cloned());

        NftMetadata {
            name: input.name.clone(),
            description: input.description.clone(),
            image,
            music,
            external_url: input.external_url.clone(),
            attributes,
        }
    }

    /// "M:SS" display form of a duration in seconds.
    pub fn format_duration(secs: f64) -> String {
        let total = if secs.is_finite() && secs > 0.0 {
            secs as u64
        } else {
            0
        };
        format!("{}:{:02}", total / 60, total % 60)
    }
}
