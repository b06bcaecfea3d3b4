pub mod blob;
pub mod error;
pub mod key;
pub mod metadata;
pub mod testing;

pub use blob::BlobStore;
pub use error::StoreError;
pub use key::FragmentKey;
pub use metadata::MetadataStore;
