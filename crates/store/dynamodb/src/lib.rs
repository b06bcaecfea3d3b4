pub mod config;
pub mod store;
pub mod table;

pub use config::DynamoConfig;
pub use store::{DynamoMetadataStore, build_client};
pub use table::create_table;
