pub mod config;
pub mod file_type;
pub mod id_generator;
pub mod metadata;
pub mod pinning;

pub use config::AppConfigImpl;
pub use id_generator::UuidTokenIdGenerator;
pub use metadata::duration::SymphoniaDurationReader;
pub use pinning::storacha::StorachaClient;
