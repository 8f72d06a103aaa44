use crate::content::Content;
use crate::error::SendError;
use async_trait::async_trait;
use http::HeaderMap;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tracing::trace;

/// A payload read from a file on disk.
///
/// The length is taken from the file metadata when the content is created. Every
/// [`open`](Content::open) opens the file again, so a failed upload can be retried with the same
/// content.
#[derive(Debug)]
pub struct FileContent {
    path: PathBuf,
    length: u64,
    headers: HeaderMap,
}

impl FileContent {
    pub async fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} is not a file", path.display())));
        }

        let length = metadata.len();
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));

        Ok(Self { path, length, headers })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[async_trait]
impl Content for FileContent {
    type Reader = File;

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.length)
    }

    async fn open(&mut self) -> Result<Self::Reader, SendError> {
        trace!(path = %self.path.display(), "open file content");
        File::open(&self.path).await.map_err(SendError::io)
    }
}
