//! Token-URI derivation. Pure string shaping, no I/O.

pub const IPFS_SCHEME: &str = "ipfs://";
pub const METADATA_FILE: &str = "metadata.json";

/// Native URI of a content address.
pub fn ipfs_url(cid: &str) -> String {
    format!("{IPFS_SCHEME}{cid}")
}

/// Native URI of a named file inside a folder address.
pub fn file_url(cid: &str, name: &str) -> String {
    format!("{IPFS_SCHEME}{cid}/{name}")
}

/// The address a minted token's metadata is read from. A folder
/// address points at the `metadata.json` inside it, a direct metadata
/// address is used as-is.
pub fn token_uri(cid: &str, is_folder: bool) -> String {
    if is_folder {
        file_url(cid, METADATA_FILE)
    } else {
        ipfs_url(cid)
    }
}

/// Gateway form of a native URI: exactly the leading `ipfs://` is
/// replaced with the gateway base. Anything else passes through
/// unchanged.
pub fn to_gateway(uri: &str, gateway_base: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(rest) => format!("{gateway_base}{rest}"),
        None => uri.to_string(),
    }
}
