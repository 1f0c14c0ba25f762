//! Vocabulary error types.

use thiserror::Error;

/// Errors raised while building a [`Payload`](crate::Payload) from a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    /// The request type does not name a known command.
    #[error("unsupported request type: {0:?}")]
    UnsupportedRequestType(String),

    /// A field required by the request type is absent or empty.
    #[error("{request_type} requires field {field:?}")]
    MissingField {
        /// The request type being built.
        request_type: String,
        /// The missing field.
        field: &'static str,
    },

    /// A field is present but cannot be interpreted.
    #[error("{request_type} field {field:?} is invalid: {reason}")]
    InvalidField {
        /// The request type being built.
        request_type: String,
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
