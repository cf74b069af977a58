use std::fs::File;
use std::io::Read;
use std::path::Path;

use cosapi_protocol::FileDigest;
use cosapi_protocol::constants::HASH_BLOCK_SIZE;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::TransferError;

/// Computes SHA-1 of `data` and returns the lowercase hex digest.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Streams a file through an incremental SHA-1 in fixed-size blocks.
///
/// The digest depends only on the bytes, never on the block size.
#[derive(Debug, Clone, Copy)]
pub struct ContentHasher {
    block_size: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self {
            block_size: HASH_BLOCK_SIZE,
        }
    }
}

impl ContentHasher {
    /// Creates a hasher with a custom block size.
    ///
    /// If `block_size` is 0, [`HASH_BLOCK_SIZE`] (2 MiB) is used.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: if block_size == 0 {
                HASH_BLOCK_SIZE
            } else {
                block_size
            },
        }
    }

    /// Hashes the file at `path`.
    pub fn hash(&self, path: &Path) -> Result<FileDigest, TransferError> {
        let file = File::open(path).map_err(|source| TransferError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = self.hash_reader(file)?;
        debug!(
            path = %path.display(),
            sha = %digest.sha,
            bytes = digest.byte_length,
            "hashed file"
        );
        Ok(digest)
    }

    /// Hashes everything `reader` yields until end of stream.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> Result<FileDigest, TransferError> {
        let mut hasher = Sha1::new();
        let mut buf = vec![0u8; self.block_size];
        let mut total: u64 = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            hasher.update(&buf[..n]);
            total += n as u64;
        }
        Ok(FileDigest {
            sha: hex::encode(hasher.finalize()),
            byte_length: total,
        })
    }
}
