use serde::{Deserialize, Serialize};

use crate::constants::CODE_SUCCESS;
use crate::envelope::ApiResponse;
use crate::messages::UploadData;

/// Content fingerprint of a local file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDigest {
    /// Lowercase hex SHA-1 (40 characters).
    pub sha: String,
    /// Total number of bytes hashed.
    pub byte_length: u64,
}

/// Reasons a negotiated session cannot drive the slice loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSession {
    #[error("negotiated slice size is zero")]
    ZeroSliceSize,

    #[error("resume offset {offset} is past end of file ({file_size} bytes)")]
    OffsetPastEnd { offset: u64, file_size: u64 },

    #[error("empty session id")]
    EmptySessionId,
}

/// Server-held resumable upload context.
///
/// Construction checks `slice_size > 0` and `resume_offset <= file_size`,
/// so the transfer loop can rely on both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSession {
    session_id: String,
    slice_size: u64,
    resume_offset: u64,
    file_size: u64,
    digest: FileDigest,
}

impl UploadSession {
    /// Creates a session for the file described by `digest`.
    pub fn new(
        session_id: impl Into<String>,
        slice_size: u64,
        resume_offset: u64,
        digest: FileDigest,
    ) -> Result<Self, InvalidSession> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(InvalidSession::EmptySessionId);
        }
        if slice_size == 0 {
            return Err(InvalidSession::ZeroSliceSize);
        }
        let file_size = digest.byte_length;
        if resume_offset > file_size {
            return Err(InvalidSession::OffsetPastEnd {
                offset: resume_offset,
                file_size,
            });
        }
        Ok(Self {
            session_id,
            slice_size,
            resume_offset,
            file_size,
            digest,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn slice_size(&self) -> u64 {
        self.slice_size
    }

    pub fn resume_offset(&self) -> u64 {
        self.resume_offset
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn digest(&self) -> &FileDigest {
        &self.digest
    }

    /// Number of slice requests needed from the resume offset to the end.
    pub fn remaining_slices(&self) -> u64 {
        (self.file_size - self.resume_offset).div_ceil(self.slice_size)
    }
}

/// Terminal result of every client operation.
///
/// `code == 0` means success; any other value is either a service code
/// (passed through verbatim) or one of the local negative codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl UploadOutcome {
    /// Creates a failed outcome.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource_url: None,
            data: None,
        }
    }

    /// Folds a parsed service response into an outcome.
    ///
    /// The resource URL is taken from `data.url` (or `data.access_url`)
    /// when present; the whole `data` payload is kept for callers that
    /// need listing or stat details.
    pub fn from_response(resp: &ApiResponse) -> Self {
        let resource_url = resp
            .parse_data::<UploadData>()
            .ok()
            .flatten()
            .and_then(|d| d.resource_url().map(str::to_string));
        Self {
            code: resp.code,
            message: resp.message.clone(),
            resource_url,
            data: resp.data_value(),
        }
    }

    /// Returns `true` when `code` is zero.
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}
