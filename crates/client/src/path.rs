//! Validation and encoding of remote object paths.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::ClientError;

/// Characters kept verbatim inside a path segment (RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// What a remote path is expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// An object: must not end with `/`.
    File,
    /// A directory: must end with `/`.
    Folder,
    /// Either (stat, list of the root, update, delete).
    Any,
}

/// Validates a bucket name.
pub fn validate_bucket(bucket: &str) -> Result<(), ClientError> {
    if bucket.is_empty() {
        return Err(ClientError::InvalidArgument("empty bucket name".into()));
    }
    if bucket.contains('/') {
        return Err(ClientError::InvalidArgument(format!(
            "bucket name must not contain '/': {bucket}"
        )));
    }
    Ok(())
}

/// Validates a remote path.
///
/// Rejects:
/// - Paths not starting with `/`
/// - Parent directory traversal (`..`) and `.` segments
/// - Empty segments (`//`)
/// - Trailing-slash mismatches for [`PathKind::File`] / [`PathKind::Folder`]
pub fn validate_remote_path(path: &str, kind: PathKind) -> Result<(), ClientError> {
    if !path.starts_with('/') {
        return Err(ClientError::InvalidArgument(format!(
            "remote path must start with '/': {path}"
        )));
    }

    if path != "/" {
        let inner = &path[1..];
        let inner = inner.strip_suffix('/').unwrap_or(inner);
        for segment in inner.split('/') {
            match segment {
                "" => {
                    return Err(ClientError::InvalidArgument(format!(
                        "empty path segment not allowed: {path}"
                    )));
                }
                "." | ".." => {
                    return Err(ClientError::InvalidArgument(format!(
                        "relative path segment not allowed: {path}"
                    )));
                }
                _ => {}
            }
        }
    }

    match kind {
        PathKind::File if path.ends_with('/') => Err(ClientError::InvalidArgument(format!(
            "file path must not end with '/': {path}"
        ))),
        PathKind::Folder if !path.ends_with('/') => Err(ClientError::InvalidArgument(format!(
            "folder path must end with '/': {path}"
        ))),
        _ => Ok(()),
    }
}

/// Percent-encodes each segment of `path`, keeping the `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
