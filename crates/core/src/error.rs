use thiserror::Error;

/// Errors raised while validating fragment construction input.
///
/// These are always recoverable by the caller correcting its input and
/// are never retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ownerId is required")]
    MissingOwner,

    #[error("type is required")]
    MissingType,

    #[error("type {0} is not supported")]
    UnsupportedType(String),
}
