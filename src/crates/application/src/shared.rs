/// Source of token identifiers for the compound upload flow.
pub trait TokenIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Creation timestamp recorded in auto-generated metadata.
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
