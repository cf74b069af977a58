//! Client error types.

use std::path::PathBuf;

use cosapi_auth::AuthError;
use cosapi_protocol::UploadOutcome;
use cosapi_protocol::constants::{
    CODE_FILE_NOT_EXISTS, CODE_ILLEGAL_SLICE_SIZE, CODE_MALFORMED_RESPONSE, CODE_NETWORK_ERROR,
    CODE_PARAMS_ERROR,
};
use cosapi_transfer::TransferError;

/// Errors produced by client operations.
///
/// Public operations fold these into an [`UploadOutcome`] with
/// [`ClientError::into_outcome`]; each variant has a stable status code.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("file not exist or can not be read: {}", path.display())]
    FileNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("service error {code}: {message}")]
    Service { code: i32, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("illegal slice size {0}")]
    IllegalSliceSize(u64),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl ClientError {
    /// Status code reported to callers.
    pub fn code(&self) -> i32 {
        match self {
            ClientError::FileNotAccessible { .. } => CODE_FILE_NOT_EXISTS,
            ClientError::Network(_) => CODE_NETWORK_ERROR,
            ClientError::Service { code, .. } => *code,
            ClientError::MalformedResponse(_) => CODE_MALFORMED_RESPONSE,
            ClientError::InvalidArgument(_) | ClientError::Auth(_) => CODE_PARAMS_ERROR,
            ClientError::IllegalSliceSize(_) => CODE_ILLEGAL_SLICE_SIZE,
            ClientError::Transfer(e) => match e {
                // Local file problems, whatever stage they surface in.
                TransferError::FileUnreadable { .. }
                | TransferError::Io(_)
                | TransferError::UnexpectedEof { .. } => CODE_FILE_NOT_EXISTS,
                // Only reachable through server-provided session values.
                TransferError::ZeroSliceSize | TransferError::OffsetPastEnd { .. } => {
                    CODE_MALFORMED_RESPONSE
                }
            },
        }
    }

    /// Converts the error into the outcome returned to callers.
    pub fn into_outcome(self) -> UploadOutcome {
        match self {
            ClientError::Service { code, message } => UploadOutcome::failure(code, message),
            other => UploadOutcome::failure(other.code(), other.to_string()),
        }
    }
}
