use application::shared::TokenIdGenerator;
use uuid::Uuid;

/// Random token identifiers for uploads that do not carry one.
#[derive(Debug, Default, Clone)]
pub struct UuidTokenIdGenerator;

impl UuidTokenIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenIdGenerator for UuidTokenIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
