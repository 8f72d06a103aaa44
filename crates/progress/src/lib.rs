//! Upload progress reporting for asynchronous HTTP request bodies
//!
//! This crate wraps an outgoing request body so that, while the body is written to the network,
//! an observer is told how many bytes have been transferred so far. It sits between an HTTP
//! client and whatever consumes the progress (a progress bar, a log, a metrics gauge) and does
//! nothing else: headers, declared length and disposal are forwarded to the wrapped body.
//!
//! # Features
//!
//! - Cumulative, strictly increasing progress per upload
//! - Configurable chunk size (20 KiB by default)
//! - Writing to any `tokio::io::AsyncWrite`
//! - Streaming as an `http_body::Body` for hyper-style transports
//! - Ready-made contents for bytes, async readers and files
//! - Guaranteed release of the source reader on success, failure and cancellation
//!
//! # Example
//!
//! ```no_run
//! use micro_progress::content::{BytesContent, ProgressContent};
//! use micro_progress::progress::TracingProgress;
//! use tokio::net::TcpStream;
//! use tracing::{Level, error, info};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let content = BytesContent::from(vec![0u8; 1024 * 1024]);
//!     let progress = TracingProgress::with_total(Some(1024 * 1024));
//!     let mut upload = ProgressContent::new(content, progress);
//!
//!     let mut stream = match TcpStream::connect("127.0.0.1:8080").await {
//!         Ok(stream) => stream,
//!         Err(e) => {
//!             error!(cause = %e, "connect error");
//!             return;
//!         }
//!     };
//!
//!     match upload.write_to(&mut stream).await {
//!         Ok(sent) => info!(sent, "upload finished"),
//!         Err(e) => error!(cause = %e, "upload failed"),
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`content`]: the [`content::Content`] capability set, the [`content::ProgressContent`]
//!   wrapper and stock contents
//! - [`progress`]: the [`progress::ProgressSink`] observer trait and its implementations
//! - [`body`]: [`body::ProgressBody`], the `http_body::Body` adapter
//! - [`error`]: configuration and send errors
//!
//! # Error Handling
//!
//! - [`error::ConfigError`]: invalid chunk size or missing parts, raised at construction
//! - [`error::SendError`]: I/O failures and misuse, raised while writing
//! - [`error::ProgressError`]: wraps both
//!
//! Errors are returned to the caller as they are; nothing is retried.
//!
//! # Limitations
//!
//! - One upload per serialization call; the same wrapper cannot be written concurrently
//! - No transport: connection handling, TLS and retries belong to the HTTP client

pub mod body;
pub mod content;
pub mod error;
pub mod progress;

mod utils;
pub(crate) use utils::ensure;

#[cfg(test)]
mod test_support;
