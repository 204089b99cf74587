pub mod media;
pub mod metadata;
pub mod pinning;
pub mod staging;
pub mod upload;
