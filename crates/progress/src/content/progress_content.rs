use crate::body::ProgressBody;
use crate::content::{Content, PayloadSize};
use crate::ensure;
use crate::error::{ConfigError, SendError};
use crate::progress::ProgressSink;
use http::HeaderMap;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace};

/// Default number of bytes copied per chunk (20 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 4096;

/// Largest accepted chunk size (16 MiB). Every chunk is buffered in memory.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// A request content that reports upload progress while it is written.
///
/// `ProgressContent` decorates another [`Content`]. It copies the wrapped content's headers once at
/// construction and forwards the declared length unchanged. When written with
/// [`write_to`](Self::write_to), the wrapped content is opened and copied to the destination in
/// chunks of at most `chunk_size` bytes; after every chunk the [`ProgressSink`] receives the
/// number of bytes written so far in this call.
///
/// # Example
///
/// ```
/// use micro_progress::content::{BytesContent, ProgressContent};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let content = BytesContent::from(vec![0u8; 50_000]);
/// let mut upload = ProgressContent::with_chunk_size(content, 20_480, |sent: u64| {
///     println!("sent {sent} bytes");
/// })?;
///
/// let mut destination = Vec::new();
/// let written = upload.write_to(&mut destination).await?;
/// assert_eq!(written, 50_000);
/// # Ok(())
/// # }
/// ```
pub struct ProgressContent<C, P>
where
    C: Content,
    P: ProgressSink,
{
    content: C,
    headers: HeaderMap,
    chunk_size: usize,
    progress: P,
    disposed: bool,
}

impl<C, P> ProgressContent<C, P>
where
    C: Content,
    P: ProgressSink,
{
    /// Wraps `content` using [`DEFAULT_CHUNK_SIZE`].
    pub fn new(content: C, progress: P) -> Self {
        Self::from_parts(content, DEFAULT_CHUNK_SIZE, progress)
    }

    /// Wraps `content` copying at most `chunk_size` bytes per chunk.
    ///
    /// Fails with [`ConfigError::InvalidChunkSize`] when `chunk_size` is zero and with
    /// [`ConfigError::TooLargeChunkSize`] when it exceeds [`MAX_CHUNK_SIZE`].
    pub fn with_chunk_size(content: C, chunk_size: usize, progress: P) -> Result<Self, ConfigError> {
        ensure!(chunk_size > 0, ConfigError::invalid_chunk_size(chunk_size));
        ensure!(chunk_size <= MAX_CHUNK_SIZE, ConfigError::too_large_chunk_size(chunk_size, MAX_CHUNK_SIZE));
        Ok(Self::from_parts(content, chunk_size, progress))
    }

    pub fn builder() -> ProgressContentBuilder<C, P> {
        ProgressContentBuilder::new()
    }

    fn from_parts(content: C, chunk_size: usize, progress: P) -> Self {
        let source = content.headers();
        let mut headers = HeaderMap::with_capacity(source.len());
        for (name, value) in source {
            headers.append(name.clone(), value.clone());
        }

        Self { content, headers, chunk_size, progress, disposed: false }
    }

    /// Headers copied from the wrapped content at construction time.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Allows adding headers on top of the copied ones.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The wrapped content's declared length, `None` when unknown.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.content.content_length()
    }

    #[inline]
    pub fn payload_size(&self) -> PayloadSize {
        self.content_length().into()
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Bytes buffered per chunk: the chunk size, capped by a known declared length.
    pub(crate) fn buffer_size(&self) -> usize {
        match self.content_length().map(usize::try_from) {
            Some(Ok(length)) => self.chunk_size.min(length.max(1)),
            _ => self.chunk_size,
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Writes the whole wrapped content to `writer`, reporting progress after every chunk.
    ///
    /// Returns the number of bytes written. The reader opened from the wrapped content is dropped
    /// before this method returns, on success and on failure alike, and no progress is reported
    /// once an error occurred.
    ///
    /// The writer is flushed after the last chunk. Progress is reported as chunks are handed to
    /// the writer, so when the final flush fails the sink has already seen the full total even
    /// though this method returns an error.
    pub async fn write_to<W>(&mut self, writer: &mut W) -> Result<u64, SendError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        ensure!(!self.disposed, SendError::Disposed);

        let mut reader = self.content.open().await?;
        let transferred = copy_with_progress(&mut reader, writer, self.buffer_size(), &self.progress).await?;

        debug!(transferred, "finished writing content");
        Ok(transferred)
    }

    /// Opens the wrapped content and turns it into a streaming [`http_body::Body`].
    ///
    /// The returned body owns this wrapper; dropping the body disposes the wrapped content.
    pub async fn into_body(mut self) -> Result<ProgressBody<C, P>, SendError> {
        ensure!(!self.disposed, SendError::Disposed);

        let reader = self.content.open().await?;
        Ok(ProgressBody::new(reader, self))
    }

    pub(crate) fn report(&self, transferred: u64) {
        self.progress.report(transferred);
    }

    /// Releases the wrapped content. Only the first call is forwarded.
    pub fn dispose(&mut self) {
        if self.disposed {
            trace!("content already disposed");
            return;
        }

        self.disposed = true;
        self.content.dispose();
        debug!("content disposed");
    }
}

async fn copy_with_progress<R, W, P>(reader: &mut R, writer: &mut W, chunk_size: usize, progress: &P) -> Result<u64, SendError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    P: ProgressSink + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut transferred: u64 = 0;

    loop {
        let size = reader.read(&mut buffer).await.map_err(|e| {
            error!(cause = %e, transferred, "failed to read content");
            SendError::io(e)
        })?;

        if size == 0 {
            break;
        }

        writer.write_all(&buffer[..size]).await.map_err(|e| {
            error!(cause = %e, transferred, "failed to write content");
            SendError::io(e)
        })?;

        transferred += size as u64;
        trace!(chunk = size, transferred, "wrote content chunk");
        progress.report(transferred);
    }

    writer.flush().await.map_err(|e| {
        error!(cause = %e, transferred, "failed to flush content");
        SendError::io(e)
    })?;
    Ok(transferred)
}

impl<C, P> Drop for ProgressContent<C, P>
where
    C: Content,
    P: ProgressSink,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C, P> fmt::Debug for ProgressContent<C, P>
where
    C: Content,
    P: ProgressSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressContent")
            .field("headers", &self.headers)
            .field("content_length", &self.content_length())
            .field("chunk_size", &self.chunk_size)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

/// Builds a [`ProgressContent`], checking that every required part is present.
pub struct ProgressContentBuilder<C, P> {
    content: Option<C>,
    chunk_size: usize,
    progress: Option<P>,
}

impl<C, P> ProgressContentBuilder<C, P>
where
    C: Content,
    P: ProgressSink,
{
    fn new() -> Self {
        Self { content: None, chunk_size: DEFAULT_CHUNK_SIZE, progress: None }
    }

    pub fn content(mut self, content: C) -> Self {
        self.content = Some(content);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn progress(mut self, progress: P) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(self) -> Result<ProgressContent<C, P>, ConfigError> {
        let content = self.content.ok_or(ConfigError::MissingContent)?;
        let progress = self.progress.ok_or(ConfigError::MissingProgress)?;
        ProgressContent::with_chunk_size(content, self.chunk_size, progress)
    }
}

impl<C, P> fmt::Debug for ProgressContentBuilder<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressContentBuilder")
            .field("has_content", &self.content.is_some())
            .field("chunk_size", &self.chunk_size)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}
