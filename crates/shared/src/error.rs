use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadErrorKind {
    /// Rejected locally before any network call.
    Validation,
    /// The server answered non-2xx with a readable message.
    ServerRejection,
    /// A response arrived but its body could not be decoded.
    ResponseParse,
    /// No response was obtained at all.
    Transport,
}

#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct UploadError {
    pub kind: UploadErrorKind,
    pub message: String,
}

impl UploadError {
    pub fn new(kind: UploadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
