pub mod codec;
pub mod engine;
pub mod error;

pub use codec::{ImageCodec, RasterCodec};
pub use engine::{Converted, Converter};
pub use error::ConvertError;
