//! Request contents and the progress-reporting wrapper around them.
//!
//! # Architecture
//!
//! - [`Content`]: the capability set a request body has to provide: headers, an optional declared
//!   length, a readable stream opened on demand, and disposal
//! - [`ProgressContent`]: wraps any [`Content`] and reports cumulative progress to a
//!   [`ProgressSink`](crate::progress::ProgressSink) while the body is written
//! - [`BytesContent`], [`ReaderContent`], [`FileContent`]: ready-made contents for in-memory
//!   payloads, arbitrary async readers and files on disk
//!
//! The wrapper owns its content exclusively and releases it exactly once, either through
//! [`ProgressContent::dispose`] or when it is dropped.

mod bytes_content;
mod file_content;
mod progress_content;
mod reader_content;

pub use bytes_content::BytesContent;
pub use file_content::FileContent;
pub use progress_content::DEFAULT_CHUNK_SIZE;
pub use progress_content::MAX_CHUNK_SIZE;
pub use progress_content::ProgressContent;
pub use progress_content::ProgressContentBuilder;
pub use reader_content::ReaderContent;

use crate::error::SendError;
use async_trait::async_trait;
use http::HeaderMap;
use http_body::SizeHint;
use tokio::io::AsyncRead;

/// An outgoing HTTP request body.
///
/// Implementations describe the payload through [`headers`](Content::headers) and
/// [`content_length`](Content::content_length), and hand out the bytes through a reader created by
/// [`open`](Content::open). The reader is owned by the caller and closed when it is dropped.
#[async_trait]
pub trait Content: Send {
    type Reader: AsyncRead + Send + Unpin;

    /// Content headers such as `Content-Type` and `Content-Length`, in insertion order.
    fn headers(&self) -> &HeaderMap;

    /// The declared length of the payload, `None` when it is unknown.
    fn content_length(&self) -> Option<u64>;

    /// Opens a fresh reader over the payload.
    async fn open(&mut self) -> Result<Self::Reader, SendError>;

    /// Releases resources held by the content.
    ///
    /// Called at most once by [`ProgressContent`].
    fn dispose(&mut self) {}
}

/// Represents the size information of a request payload.
///
/// - Known length: the transport can send a `Content-Length`
/// - Chunked: the length is unknown, the transport falls back to chunked transfer encoding
/// - Empty: no payload to send
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl From<Option<u64>> for PayloadSize {
    fn from(content_length: Option<u64>) -> Self {
        match content_length {
            Some(0) => PayloadSize::Empty,
            Some(length) => PayloadSize::Length(length),
            None => PayloadSize::Chunked,
        }
    }
}

impl From<PayloadSize> for SizeHint {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(length) => SizeHint::with_exact(length),
            PayloadSize::Chunked => SizeHint::new(),
            PayloadSize::Empty => SizeHint::with_exact(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_size_from_length() {
        assert_eq!(PayloadSize::from(Some(0)), PayloadSize::Empty);
        assert_eq!(PayloadSize::from(Some(12)), PayloadSize::Length(12));
        assert!(PayloadSize::from(None).is_chunked());
        assert!(PayloadSize::from(Some(0)).is_empty());
    }

    #[test]
    fn payload_size_into_size_hint() {
        assert_eq!(SizeHint::from(PayloadSize::Length(12)).exact(), Some(12));
        assert_eq!(SizeHint::from(PayloadSize::Empty).exact(), Some(0));

        let hint = SizeHint::from(PayloadSize::Chunked);
        assert_eq!(hint.exact(), None);
        assert_eq!(hint.lower(), 0);
        assert_eq!(hint.upper(), None);
    }
}
