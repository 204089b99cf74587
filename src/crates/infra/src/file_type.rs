use std::path::Path;

/// MIME type by extension for the handful of formats the service
/// accepts. Unknown extensions fall back to a generic byte stream.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_resolve_case_insensitively() {
        assert_eq!(mime_for_path(Path::new("track.MP3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("cover.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("a/b/photo.JPEG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("metadata.json")), "application/json");
    }

    #[test]
    fn unknown_or_missing_extension_is_octet_stream() {
        assert_eq!(mime_for_path(Path::new("archive.tar")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }
}
