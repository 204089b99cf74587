pub mod metadata;
pub mod upload;
pub mod uri;
