use tabby::collection::Document;
use tabby::errors::{ErrorKind, TabbyError};
use std::error::Error;
use thiserror::Error;

/// Failure turning a document into partition bytes or back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FjallValueError {
    #[error("Serialization failed: {0}")]
    SerializationError(String),
    /// Stored bytes no longer decode to a document
    #[error("Deserialization failed: {0}")]
    DeserializationError(String),
}

impl From<FjallValueError> for TabbyError {
    fn from(err: FjallValueError) -> Self {
        let kind = match err {
            FjallValueError::SerializationError(_) => ErrorKind::EncodingError,
            FjallValueError::DeserializationError(_) => ErrorKind::FileCorrupted,
        };
        TabbyError::new(&err.to_string(), kind)
    }
}

pub(crate) type FjallValueResult<T> = Result<T, FjallValueError>;

#[inline]
pub(crate) fn encode_document(document: &Document) -> FjallValueResult<Vec<u8>> {
    bincode::serde::encode_to_vec(document, bincode::config::legacy())
        .map_err(|e| FjallValueError::SerializationError(e.to_string()))
}

#[inline]
pub(crate) fn decode_document(bytes: &[u8]) -> FjallValueResult<Document> {
    bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
        .map(|(document, _)| document)
        .map_err(|e| FjallValueError::DeserializationError(e.to_string()))
}

pub(crate) fn to_tabby_error(error: impl Error) -> TabbyError {
    let error_msg = error.to_string();
    let lowered = error_msg.to_lowercase();
    let error_kind = if lowered.contains("closed") || lowered.contains("poisoned") {
        ErrorKind::StoreAlreadyClosed
    } else if lowered.contains("not found") || lowered.contains("deleted") {
        ErrorKind::StoreNotInitialized
    } else if lowered.contains("corrupt") || lowered.contains("checksum") {
        ErrorKind::FileCorrupted
    } else if lowered.contains("permission") {
        ErrorKind::PermissionDenied
    } else if lowered.contains("no space") || lowered.contains("full") {
        ErrorKind::DiskFull
    } else {
        ErrorKind::BackendError
    };
    log::error!("Fjall error: {}", error_msg);
    TabbyError::new(&format!("Fjall Error: {}", error_msg), error_kind)
}
