//! Streaming adapter from [`ProgressContent`] to [`http_body::Body`].
//!
//! Transports built on the `http-body` ecosystem pull request bodies frame by frame instead of
//! handing out a writer. [`ProgressBody`] serves those transports: every data frame holds at most
//! `chunk_size` bytes, and the progress sink receives the cumulative count as each frame is
//! handed out.

use crate::content::{Content, ProgressContent};
use crate::error::SendError;
use crate::progress::ProgressSink;
use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use pin_project_lite::pin_project;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, error, trace};

pin_project! {
    /// A request body that reports upload progress as frames are polled.
    ///
    /// Created by [`ProgressContent::into_body`]. Dropping the body drops the reader and disposes
    /// the wrapped content.
    pub struct ProgressBody<C: Content, P: ProgressSink> {
        reader: Option<C::Reader>,
        content: ProgressContent<C, P>,
        buffer: BytesMut,
        transferred: u64,
    }
}

impl<C, P> ProgressBody<C, P>
where
    C: Content,
    P: ProgressSink,
{
    pub(crate) fn new(reader: C::Reader, content: ProgressContent<C, P>) -> Self {
        let buffer = BytesMut::with_capacity(content.buffer_size());
        Self { reader: Some(reader), content, buffer, transferred: 0 }
    }

    /// Number of bytes handed out so far.
    #[inline]
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// The wrapped content, for access to its headers and declared length.
    #[inline]
    pub fn content(&self) -> &ProgressContent<C, P> {
        &self.content
    }
}

impl<C, P> Body for ProgressBody<C, P>
where
    C: Content,
    P: ProgressSink,
{
    type Data = Bytes;
    type Error = SendError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();

        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(None);
        };

        let buffer_size = this.content.buffer_size();
        this.buffer.resize(buffer_size, 0);

        let mut read_buf = ReadBuf::new(&mut this.buffer[..]);
        let result = ready!(Pin::new(reader).poll_read(cx, &mut read_buf));
        let size = read_buf.filled().len();

        match result {
            Ok(()) if size == 0 => {
                this.reader.take();
                this.buffer.clear();
                debug!(transferred = *this.transferred, "finished streaming content");
                Poll::Ready(None)
            }

            Ok(()) => {
                this.buffer.truncate(size);
                let bytes = this.buffer.split().freeze();

                *this.transferred += size as u64;
                trace!(chunk = size, transferred = *this.transferred, "streamed content chunk");
                this.content.report(*this.transferred);

                Poll::Ready(Some(Ok(Frame::data(bytes))))
            }

            Err(e) => {
                error!(cause = %e, transferred = *this.transferred, "failed to read content");
                this.reader.take();
                this.buffer.clear();
                Poll::Ready(Some(Err(SendError::io(e))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.reader.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        if self.reader.is_none() {
            return SizeHint::with_exact(0);
        }

        match self.content.content_length() {
            Some(length) => SizeHint::with_exact(length.saturating_sub(self.transferred)),
            None => SizeHint::new(),
        }
    }
}

impl<C, P> fmt::Debug for ProgressBody<C, P>
where
    C: Content,
    P: ProgressSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBody")
            .field("content", &self.content)
            .field("transferred", &self.transferred)
            .field("finished", &self.reader.is_none())
            .finish_non_exhaustive()
    }
}
