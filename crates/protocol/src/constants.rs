use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default REST endpoint of the file service (v1 API).
pub const DEFAULT_END_POINT: &str = "http://web.file.myqcloud.com/files/v1/";

/// Lifetime of a multi-use signature (30 days).
pub const EXPIRED_SECONDS: u64 = 2_592_000;

/// Slice size requested when the caller does not pick one (3 MiB).
pub const DEFAULT_SLICE_SIZE: u64 = 3 * 1024 * 1024;

/// Largest slice size a caller may request (3 MiB).
pub const MAX_SLICE_SIZE: u64 = 3 * 1024 * 1024;

/// Smallest slice size a caller may request (512 KiB).
pub const MIN_SLICE_SIZE: u64 = 512 * 1024;

/// Files at or above this size go through the negotiated slice path (10 MiB).
pub const MIN_SLICE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Overall ceiling for a single HTTP request, enforced by the executor.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Block size used when hashing a file (2 MiB).
pub const HASH_BLOCK_SIZE: usize = 2 * 1024 * 1024;

// Status codes produced locally. The service uses 0 for success and its own
// nonzero codes for failures; local codes are negative so they never collide.

/// Operation succeeded.
pub const CODE_SUCCESS: i32 = 0;
/// Source path missing or unreadable.
pub const CODE_FILE_NOT_EXISTS: i32 = -1;
/// Transport failure or response body that is not JSON.
pub const CODE_NETWORK_ERROR: i32 = -2;
/// Invalid caller arguments.
pub const CODE_PARAMS_ERROR: i32 = -3;
/// Requested slice size outside the accepted range.
pub const CODE_ILLEGAL_SLICE_SIZE: i32 = -4;
/// JSON response lacking the fields an operation requires.
pub const CODE_MALFORMED_RESPONSE: i32 = -5;

/// Operation marker carried in every request (`op` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Upload,
    UploadSlice,
    Create,
    List,
    Stat,
    Update,
    Delete,
}

impl Op {
    /// Wire value of the marker.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Upload => "upload",
            Op::UploadSlice => "upload_slice",
            Op::Create => "create",
            Op::List => "list",
            Op::Stat => "stat",
            Op::Update => "update",
            Op::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entries a directory listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListPattern {
    #[default]
    #[serde(rename = "eListBoth")]
    Both,
    #[serde(rename = "eListDirOnly")]
    DirOnly,
    #[serde(rename = "eListFileOnly")]
    FileOnly,
}

impl ListPattern {
    /// Wire value used in the `pattern` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ListPattern::Both => "eListBoth",
            ListPattern::DirOnly => "eListDirOnly",
            ListPattern::FileOnly => "eListFileOnly",
        }
    }
}

impl std::str::FromStr for ListPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" | "eListBoth" => Ok(ListPattern::Both),
            "dir" | "eListDirOnly" => Ok(ListPattern::DirOnly),
            "file" | "eListFileOnly" => Ok(ListPattern::FileOnly),
            other => Err(format!("unknown list pattern: {other}")),
        }
    }
}
