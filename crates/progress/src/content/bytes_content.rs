use crate::content::Content;
use crate::error::SendError;
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use mime::Mime;
use std::io::Cursor;
use tracing::warn;

/// An in-memory payload.
///
/// Declares its `Content-Length` and can be opened any number of times; every reader starts at
/// the first byte. The declared length stays fixed after [`dispose`](Content::dispose), in line with
/// the `Content-Length` header.
#[derive(Debug, Clone)]
pub struct BytesContent {
    bytes: Bytes,
    length: u64,
    headers: HeaderMap,
}

impl BytesContent {
    pub fn new(bytes: Bytes) -> Self {
        let mut headers = HeaderMap::with_capacity(2);
        let length = bytes.len() as u64;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        Self { bytes, length, headers }
    }

    /// Sets the `Content-Type` header.
    pub fn with_content_type(mut self, mime: &Mime) -> Self {
        match HeaderValue::from_str(mime.as_ref()) {
            Ok(value) => {
                self.headers.insert(CONTENT_TYPE, value);
            }
            Err(e) => warn!(cause = %e, mime = %mime, "ignore invalid content type"),
        }
        self
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl From<Bytes> for BytesContent {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for BytesContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(Bytes::from(bytes))
    }
}

impl From<String> for BytesContent {
    fn from(value: String) -> Self {
        Self::new(Bytes::from(value)).with_content_type(&mime::TEXT_PLAIN_UTF_8)
    }
}

impl From<&'static str> for BytesContent {
    fn from(value: &'static str) -> Self {
        Self::new(Bytes::from_static(value.as_bytes())).with_content_type(&mime::TEXT_PLAIN_UTF_8)
    }
}

#[async_trait]
impl Content for BytesContent {
    type Reader = Cursor<Bytes>;

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.length)
    }

    async fn open(&mut self) -> Result<Self::Reader, SendError> {
        Ok(Cursor::new(self.bytes.clone()))
    }

    fn dispose(&mut self) {
        self.bytes = Bytes::new();
    }
}
