use crate::content::Content;
use crate::error::SendError;
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_LENGTH, HeaderValue};
use std::io;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

pub(crate) type Recorded = Arc<Mutex<Vec<u64>>>;

/// A progress sink that records every reported value.
pub(crate) fn recorder() -> (Recorded, impl Fn(u64) + Send + Sync + 'static) {
    let seen = Recorded::default();
    let sink = {
        let seen = Arc::clone(&seen);
        move |transferred: u64| seen.lock().unwrap().push(transferred)
    };
    (seen, sink)
}

/// A content whose readers flag when they are dropped, and which counts dispose calls.
pub(crate) struct TrackedContent {
    bytes: Bytes,
    headers: HeaderMap,
    ok_reads: Option<usize>,
    closed: Arc<AtomicBool>,
    disposed: Arc<AtomicUsize>,
}

impl TrackedContent {
    pub(crate) fn new(bytes: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        Self { bytes, headers, ok_reads: None, closed: Arc::default(), disposed: Arc::default() }
    }

    /// Readers serve `ok_reads` reads, then fail.
    pub(crate) fn failing(bytes: Bytes, ok_reads: usize) -> Self {
        Self { ok_reads: Some(ok_reads), ..Self::new(bytes) }
    }

    pub(crate) fn closed(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub(crate) fn disposed(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.disposed)
    }
}

#[async_trait]
impl Content for TrackedContent {
    type Reader = TrackedReader;

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }

    async fn open(&mut self) -> Result<Self::Reader, SendError> {
        self.closed.store(false, Ordering::SeqCst);
        Ok(TrackedReader { inner: Cursor::new(self.bytes.clone()), ok_reads: self.ok_reads, closed: Arc::clone(&self.closed) })
    }

    fn dispose(&mut self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct TrackedReader {
    inner: Cursor<Bytes>,
    ok_reads: Option<usize>,
    closed: Arc<AtomicBool>,
}

impl AsyncRead for TrackedReader {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.ok_reads {
            Some(0) => return Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reader failed"))),
            Some(ok_reads) => self.ok_reads = Some(ok_reads - 1),
            None => {}
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A reader serving `data` for `ok_reads` reads, then failing.
pub(crate) struct FailingReader {
    data: &'static [u8],
    ok_reads: usize,
}

impl FailingReader {
    pub(crate) fn new(data: &'static [u8], ok_reads: usize) -> Self {
        Self { data, ok_reads }
    }
}

impl AsyncRead for FailingReader {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        if self.ok_reads == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reader failed")));
        }

        self.ok_reads -= 1;
        let amt = std::cmp::min(self.data.len(), buf.remaining());
        buf.put_slice(&self.data[..amt]);
        self.data = &self.data[amt..];
        Poll::Ready(Ok(()))
    }
}

/// A writer accepting `ok_writes` writes, then failing.
pub(crate) struct FailingWriter {
    ok_writes: usize,
    written: usize,
}

impl FailingWriter {
    pub(crate) fn new(ok_writes: usize) -> Self {
        Self { ok_writes, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl AsyncWrite for FailingWriter {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        if self.ok_writes == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "writer failed")));
        }

        self.ok_writes -= 1;
        self.written += buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

/// A writer accepting `ok_writes` writes, then staying pending forever.
pub(crate) struct StalledWriter {
    ok_writes: usize,
    written: usize,
}

impl StalledWriter {
    pub(crate) fn new(ok_writes: usize) -> Self {
        Self { ok_writes, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl AsyncWrite for StalledWriter {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        if self.ok_writes == 0 {
            return Poll::Pending;
        }

        self.ok_writes -= 1;
        self.written += buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

/// A writer accepting every write but failing to flush.
pub(crate) struct UnflushableWriter {
    written: usize,
}

impl UnflushableWriter {
    pub(crate) fn new() -> Self {
        Self { written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl AsyncWrite for UnflushableWriter {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.written += buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "flush failed")))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}
