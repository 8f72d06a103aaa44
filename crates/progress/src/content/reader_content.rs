use crate::content::Content;
use crate::error::SendError;
use async_trait::async_trait;
use http::HeaderMap;
use http::header::{CONTENT_LENGTH, HeaderValue};
use std::fmt;
use tokio::io::AsyncRead;

/// A payload backed by an arbitrary async reader.
///
/// The reader can be opened exactly once; later attempts fail with [`SendError::AlreadyConsumed`].
pub struct ReaderContent<R> {
    reader: Option<R>,
    length: Option<u64>,
    headers: HeaderMap,
}

impl<R> ReaderContent<R>
where
    R: AsyncRead + Send + Unpin,
{
    /// Creates a content of unknown length.
    pub fn new(reader: R) -> Self {
        Self { reader: Some(reader), length: None, headers: HeaderMap::new() }
    }

    /// Creates a content declaring `length` bytes.
    pub fn with_length(reader: R, length: u64) -> Self {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        Self { reader: Some(reader), length: Some(length), headers }
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.reader.is_none()
    }
}

#[async_trait]
impl<R> Content for ReaderContent<R>
where
    R: AsyncRead + Send + Unpin,
{
    type Reader = R;

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn content_length(&self) -> Option<u64> {
        self.length
    }

    async fn open(&mut self) -> Result<Self::Reader, SendError> {
        self.reader.take().ok_or(SendError::AlreadyConsumed)
    }

    fn dispose(&mut self) {
        self.reader.take();
    }
}

impl<R> fmt::Debug for ReaderContent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderContent")
            .field("consumed", &self.reader.is_none())
            .field("length", &self.length)
            .field("headers", &self.headers)
            .finish()
    }
}
