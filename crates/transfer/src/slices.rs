use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::TransferError;

/// One contiguous byte range of the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Declared offset sent to the service.
    pub offset: u64,
    /// Raw slice data; shorter than the slice size only for the final slice.
    pub data: Vec<u8>,
}

impl Slice {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Reads a file in negotiated fixed-size slices, starting at a resume offset.
///
/// The cursor advances by the full slice size after every slice, not by the
/// number of bytes read. The service accounts offsets in whole slices, so
/// only the last slice may be short, and iteration ends once the cursor
/// reaches `file_size`.
pub struct SliceReader<R = File> {
    source: R,
    slice_size: u64,
    file_size: u64,
    pos: u64,
}

impl SliceReader<File> {
    /// Opens `path` and positions the read cursor at `resume_offset`.
    ///
    /// `file_size` is the size the session was negotiated for.
    pub fn open(
        path: &Path,
        slice_size: u64,
        file_size: u64,
        resume_offset: u64,
    ) -> Result<Self, TransferError> {
        let file = File::open(path).map_err(|source| TransferError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file, slice_size, file_size, resume_offset)
    }
}

impl<R: Read + Seek> SliceReader<R> {
    /// Wraps a seekable source.
    pub fn new(
        mut source: R,
        slice_size: u64,
        file_size: u64,
        resume_offset: u64,
    ) -> Result<Self, TransferError> {
        if slice_size == 0 {
            return Err(TransferError::ZeroSliceSize);
        }
        if resume_offset > file_size {
            return Err(TransferError::OffsetPastEnd {
                offset: resume_offset,
                file_size,
            });
        }
        source.seek(SeekFrom::Start(resume_offset))?;
        Ok(Self {
            source,
            slice_size,
            file_size,
            pos: resume_offset,
        })
    }

    /// Reads the next slice. Returns `None` once the cursor reaches the end.
    pub fn next_slice(&mut self) -> Result<Option<Slice>, TransferError> {
        if self.pos >= self.file_size {
            return Ok(None);
        }

        // Never read past the negotiated size, even if the file grew since.
        let want = self.slice_size.min(self.remaining());
        let mut data = Vec::with_capacity(want as usize);
        (&mut self.source).take(want).read_to_end(&mut data)?;

        // The file shrank after it was hashed: a short slice at a fixed-stride
        // offset would corrupt the remote session.
        if (data.len() as u64) < want {
            return Err(TransferError::UnexpectedEof {
                at: self.pos + data.len() as u64,
                expected: self.file_size,
            });
        }

        let slice = Slice {
            offset: self.pos,
            data,
        };
        // Fixed stride: matches the service's offset accounting. Saturates so
        // an oversized negotiated slice still ends iteration.
        self.pos = self.pos.saturating_add(self.slice_size);
        Ok(Some(slice))
    }

    /// Declared offset of the next slice.
    pub fn offset(&self) -> u64 {
        self.pos
    }

    pub fn slice_size(&self) -> u64 {
        self.slice_size
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes left between the cursor and the end of the file.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.pos)
    }
}
