pub mod error;
pub mod fragment;
pub mod media;
pub mod types;

pub use error::ValidationError;
pub use fragment::{Fragment, FragmentRecord};
pub use media::MediaType;
pub use types::{FragmentId, OwnerId};
