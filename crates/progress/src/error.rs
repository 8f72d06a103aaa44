use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: SendError,
    },
}

/// Errors raised while building a [`ProgressContent`](crate::content::ProgressContent).
///
/// A value that failed to build never exists, so no serialization can follow.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk size must be greater than zero, current: {chunk_size}")]
    InvalidChunkSize { chunk_size: usize },

    #[error("chunk size too large, current: {chunk_size} exceed the limit {max_size}")]
    TooLargeChunkSize { chunk_size: usize, max_size: usize },

    #[error("content must be set")]
    MissingContent,

    #[error("progress must be set")]
    MissingProgress,
}

impl ConfigError {
    pub fn invalid_chunk_size(chunk_size: usize) -> Self {
        Self::InvalidChunkSize { chunk_size }
    }

    pub fn too_large_chunk_size(chunk_size: usize, max_size: usize) -> Self {
        Self::TooLargeChunkSize { chunk_size, max_size }
    }
}

/// Errors raised while a body is being written to the transport.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("content has been disposed")]
    Disposed,

    #[error("content has been consumed")]
    AlreadyConsumed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if this error came from the underlying reader or writer
    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, SendError::Io { .. })
    }
}
