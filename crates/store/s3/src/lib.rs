pub mod config;
pub mod store;

pub use config::S3Config;
pub use store::{S3BlobStore, build_client};
