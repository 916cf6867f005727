// Byte-level access for parsers
//
// A tokenizer wraps a file, an async stream, or a borrowed buffer behind one
// read interface. The parse entry points own the tokenizer and lend it to the
// parser; only the entry points close it.

use async_trait::async_trait;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

/// What is known about the byte source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileInfo {
    pub path: Option<PathBuf>,
    pub mime_type: Option<String>,
    /// Total size in bytes, if known
    pub size: Option<u64>,
}

#[async_trait]
pub trait Tokenizer: Send {
    fn file_info(&self) -> &FileInfo;

    /// Declare the total size of a source that cannot report it
    fn set_total_size(&mut self, size: u64);

    fn total_size(&self) -> Option<u64> {
        self.file_info().size
    }

    /// Bytes consumed so far
    fn position(&self) -> u64;

    /// Fill `buf` completely or fail with `UnexpectedEof`
    async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Copy upcoming bytes into `buf` without consuming them; returns the
    /// number of bytes available, which is short only at end of input
    async fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Advance `len` bytes
    async fn skip(&mut self, len: u64) -> io::Result<()>;

    async fn close(&mut self) -> io::Result<()>;
}

fn closed_error() -> io::Error {
    io::Error::other("tokenizer is closed")
}

/// Tokenizer over an in-memory buffer
pub struct BufferTokenizer<'a> {
    data: &'a [u8],
    position: usize,
    info: FileInfo,
}

impl<'a> BufferTokenizer<'a> {
    pub fn new(data: &'a [u8], mime_type: Option<&str>) -> Self {
        BufferTokenizer {
            data,
            position: 0,
            info: FileInfo {
                path: None,
                mime_type: mime_type.map(str::to_string),
                size: Some(data.len() as u64),
            },
        }
    }

    fn remaining(&self) -> &'a [u8] {
        let data = self.data;
        &data[self.position.min(data.len())..]
    }
}

#[async_trait]
impl<'a> Tokenizer for BufferTokenizer<'a> {
    fn file_info(&self) -> &FileInfo {
        &self.info
    }

    fn set_total_size(&mut self, size: u64) {
        self.info.size = Some(size);
    }

    fn position(&self) -> u64 {
        self.position as u64
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let remaining = self.remaining();
        if remaining.len() < buf.len() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.copy_from_slice(&remaining[..buf.len()]);
        self.position += buf.len();
        Ok(())
    }

    async fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        let len = remaining.len().min(buf.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        Ok(len)
    }

    async fn skip(&mut self, len: u64) -> io::Result<()> {
        if (self.remaining().len() as u64) < len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.position += len as usize;
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forward-only tokenizer over an async byte stream
pub struct StreamTokenizer<R> {
    reader: R,
    /// Bytes read ahead by `peek` and not yet consumed
    pending: Vec<u8>,
    position: u64,
    info: FileInfo,
}

impl<R: AsyncRead + Unpin + Send> StreamTokenizer<R> {
    pub fn new(reader: R, mime_type: Option<&str>) -> Self {
        StreamTokenizer {
            reader,
            pending: Vec::new(),
            position: 0,
            info: FileInfo {
                path: None,
                mime_type: mime_type.map(str::to_string),
                size: None,
            },
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Tokenizer for StreamTokenizer<R> {
    fn file_info(&self) -> &FileInfo {
        &self.info
    }

    fn set_total_size(&mut self, size: u64) {
        self.info.size = Some(size);
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let from_pending = self.pending.len().min(buf.len());
        buf[..from_pending].copy_from_slice(&self.pending[..from_pending]);
        self.pending.drain(..from_pending);
        self.reader.read_exact(&mut buf[from_pending..]).await?;
        self.position += buf.len() as u64;
        Ok(())
    }

    async fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pending.len() < buf.len() {
            let mut chunk = vec![0u8; buf.len() - self.pending.len()];
            let read = self.reader.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            self.pending.extend_from_slice(&chunk[..read]);
        }
        let len = self.pending.len().min(buf.len());
        buf[..len].copy_from_slice(&self.pending[..len]);
        Ok(len)
    }

    async fn skip(&mut self, len: u64) -> io::Result<()> {
        let from_pending = (self.pending.len() as u64).min(len);
        self.pending.drain(..from_pending as usize);
        let rest = len - from_pending;
        let mut limited = (&mut self.reader).take(rest);
        let copied = tokio::io::copy(&mut limited, &mut tokio::io::sink()).await?;
        if copied < rest {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.position += len;
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.pending.clear();
        Ok(())
    }
}

/// Seekable tokenizer over a file on disk
pub struct FileTokenizer {
    file: Option<File>,
    position: u64,
    info: FileInfo,
}

impl FileTokenizer {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        Ok(FileTokenizer {
            file: Some(file),
            position: 0,
            info: FileInfo {
                path: Some(path.to_path_buf()),
                mime_type: None,
                size: Some(size),
            },
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_error)
    }
}

#[async_trait]
impl Tokenizer for FileTokenizer {
    fn file_info(&self) -> &FileInfo {
        &self.info
    }

    fn set_total_size(&mut self, size: u64) {
        self.info.size = Some(size);
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.file()?.read_exact(buf).await?;
        self.position += buf.len() as u64;
        Ok(())
    }

    async fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.position;
        let file = self.file()?;
        let mut filled = 0;
        while filled < buf.len() {
            let read = file.read(&mut buf[filled..]).await?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        file.seek(SeekFrom::Start(position)).await?;
        Ok(filled)
    }

    async fn skip(&mut self, len: u64) -> io::Result<()> {
        let target = self.position + len;
        if self.info.size.is_some_and(|size| target > size) {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.file()?.seek(SeekFrom::Start(target)).await?;
        self.position = target;
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(_) => Ok(()),
            None => Err(closed_error()),
        }
    }
}
