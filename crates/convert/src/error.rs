use thiserror::Error;

use tessera_core::MediaType;

/// Errors from fragment content conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested target is not in the source type's legal format
    /// set. The route layer should have rejected this during format
    /// negotiation; the engine re-checks defensively.
    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: MediaType, to: MediaType },

    /// The source bytes are malformed for their declared type (e.g.
    /// invalid JSON). The payload is presumed permanently invalid for
    /// this conversion; not retried.
    #[error("malformed source content: {0}")]
    Malformed(String),

    /// An image codec failure while decoding or re-encoding raster data.
    #[error("codec error: {0}")]
    Codec(String),
}
