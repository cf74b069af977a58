//! Content hashing and sequential slice reading for resumable uploads.

mod hasher;
mod progress;
mod slices;

use std::path::PathBuf;

pub use hasher::{ContentHasher, sha1_hex};
pub use progress::TransferRate;
pub use slices::{Slice, SliceReader};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file ended at byte {at}, expected {expected} bytes")]
    UnexpectedEof { at: u64, expected: u64 },

    #[error("slice size must be greater than zero")]
    ZeroSliceSize,

    #[error("resume offset {offset} is past end of file ({file_size} bytes)")]
    OffsetPastEnd { offset: u64, file_size: u64 },
}
