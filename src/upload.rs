//! Chunked upload support: byte-range sources and chunk bookkeeping.
//!
//! Large uploads are split into fixed-size chunks sent strictly in order.
//! The server correlates chunks through a file identifier it issues in the
//! first chunk's response; every later chunk echoes that identifier back as
//! a header, together with its zero-based index and the total chunk count.
//! The driver lives in [`Client::upload_media`](crate::Client::upload_media);
//! this module provides the pieces it sequences.

use crate::errors::RedactError;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Fixed size of one upload chunk in bytes.
pub const CHUNK_SIZE: u64 = 10_000_000;

/// Header carrying the total number of chunks for this upload.
pub(crate) const TOTAL_CHUNKS_HEADER: &str = "total-chunks";
/// Header carrying the zero-based index of this chunk.
pub(crate) const CHUNK_INDEX_HEADER: &str = "chunk-index";
/// Header carrying the server-issued file identifier; absent on chunk 0.
pub(crate) const FILE_ID_HEADER: &str = "file-id";

/// A readable source of upload bytes addressed by byte range.
///
/// A source is resolved once at upload start and used for every chunk of
/// that upload. Filesystem-backed sources hold their descriptor open until
/// the source is dropped, whether the upload finishes or aborts.
#[async_trait]
pub trait ChunkSource: Send {
    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range cannot be read; the upload driver
    /// treats any read failure as terminal for the whole upload.
    async fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, RedactError>;
}

/// In-memory source backed by a byte buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    /// Wraps an in-memory buffer as a chunk source.
    #[must_use]
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, RedactError> {
        let size = self.data.len() as u64;
        if offset > size {
            return Err(RedactError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("read offset {offset} past end of {size}-byte buffer"),
            )));
        }
        let end = offset.saturating_add(len).min(size) as usize;
        Ok(self.data[offset as usize..end].to_vec())
    }
}

/// Filesystem source opened once and read with positioned reads.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    size: u64,
}

impl FileSource {
    /// Opens a file and records its size for the duration of the upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its metadata read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RedactError> {
        let path = path.as_ref();
        let file = File::open(path).await.inspect_err(|err| {
            log::warn!("failed to open upload source '{}': {err}", path.display());
        })?;
        let size = file.metadata().await?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ChunkSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    async fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, RedactError> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        let len = len.min(self.size.saturating_sub(offset));
        let mut buf = vec![0u8; len as usize];
        self.file.read_exact(&mut buf).await?;
        Ok(buf)
    }
}

/// Number of chunks needed to cover `size` bytes.
#[must_use]
pub(crate) fn total_chunks(size: u64) -> u64 {
    size.div_ceil(CHUNK_SIZE)
}

/// Byte length of chunk `index` within a source of `size` bytes.
///
/// Every chunk is `CHUNK_SIZE` long except the last, which covers the
/// remainder.
#[must_use]
pub(crate) fn chunk_len(size: u64, index: u64) -> u64 {
    CHUNK_SIZE.min(size - index * CHUNK_SIZE)
}

/// Builds the chunk metadata headers for one chunk request.
#[must_use]
pub(crate) fn chunk_headers(
    total: u64,
    index: u64,
    file_id: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        (TOTAL_CHUNKS_HEADER, total.to_string()),
        (CHUNK_INDEX_HEADER, index.to_string()),
    ];
    if let Some(id) = file_id {
        headers.push((FILE_ID_HEADER, id.to_string()));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_total_chunks() {
        assert_eq!(total_chunks(0), 0);
        assert_eq!(total_chunks(1), 1);
        assert_eq!(total_chunks(CHUNK_SIZE), 1);
        assert_eq!(total_chunks(CHUNK_SIZE + 1), 2);
        assert_eq!(total_chunks(3 * CHUNK_SIZE - 1), 3);
        assert_eq!(total_chunks(3 * CHUNK_SIZE), 3);
    }

    #[test]
    fn test_chunk_len() {
        let size = 2 * CHUNK_SIZE + 5;
        assert_eq!(chunk_len(size, 0), CHUNK_SIZE);
        assert_eq!(chunk_len(size, 1), CHUNK_SIZE);
        assert_eq!(chunk_len(size, 2), 5);

        // an exact multiple has a full-size final chunk
        assert_eq!(chunk_len(2 * CHUNK_SIZE, 1), CHUNK_SIZE);
    }

    #[test]
    fn test_chunk_headers() {
        let headers = chunk_headers(3, 0, None);
        assert_eq!(
            headers,
            vec![
                ("total-chunks", "3".to_string()),
                ("chunk-index", "0".to_string()),
            ]
        );

        let headers = chunk_headers(3, 2, Some("file-123"));
        assert_eq!(
            headers,
            vec![
                ("total-chunks", "3".to_string()),
                ("chunk-index", "2".to_string()),
                ("file-id", "file-123".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_memory_source_ranges() {
        let mut source = MemorySource::new(Bytes::from_static(b"0123456789"));
        assert_eq!(source.size(), 10);
        assert_eq!(source.read_range(0, 4).await.unwrap(), b"0123");
        assert_eq!(source.read_range(4, 4).await.unwrap(), b"4567");
        // a read past the end is clamped to the remaining bytes
        assert_eq!(source.read_range(8, 4).await.unwrap(), b"89");
        assert!(source.read_range(11, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_file_source_positioned_reads() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"abcdefghij").unwrap();
        temp.flush().unwrap();

        let mut source = FileSource::open(temp.path()).await.unwrap();
        assert_eq!(source.size(), 10);
        assert_eq!(source.read_range(3, 4).await.unwrap(), b"defg");
        // reads are positioned, not cursor-dependent
        assert_eq!(source.read_range(0, 2).await.unwrap(), b"ab");
        assert_eq!(source.read_range(8, 5).await.unwrap(), b"ij");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let err = FileSource::open("/definitely/not/here.mp4").await.unwrap_err();
        assert!(matches!(err, RedactError::Io(_)));
    }
}
