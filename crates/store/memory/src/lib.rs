pub mod blob;
pub mod metadata;

pub use blob::MemoryBlobStore;
pub use metadata::MemoryMetadataStore;
