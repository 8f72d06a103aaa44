//! Observers for upload progress.
//!
//! A [`ProgressSink`] receives the cumulative number of bytes transferred so far. During a single
//! serialization the reported values are strictly increasing, and no value is reported after the
//! serialization has finished or failed.
//!
//! Any `Fn(u64)` closure is a sink, so the common case needs no extra type:
//!
//! ```
//! use micro_progress::progress::ProgressSink;
//!
//! let sink = |transferred: u64| println!("sent {transferred} bytes");
//! sink.report(1024);
//! ```

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Receives cumulative byte counts while a body is written.
pub trait ProgressSink {
    fn report(&self, transferred: u64);
}

impl<F> ProgressSink for F
where
    F: Fn(u64),
{
    #[inline]
    fn report(&self, transferred: u64) {
        self(transferred);
    }
}

impl<S> ProgressSink for Arc<S>
where
    S: ProgressSink + ?Sized,
{
    #[inline]
    fn report(&self, transferred: u64) {
        (**self).report(transferred);
    }
}

/// Publishes the latest count to every `watch::Receiver`, even when none is alive.
impl ProgressSink for watch::Sender<u64> {
    #[inline]
    fn report(&self, transferred: u64) {
        self.send_replace(transferred);
    }
}

/// A sink that emits one `tracing` event per notification.
#[derive(Debug, Clone, Default)]
pub struct TracingProgress {
    total: Option<u64>,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self { total: None }
    }

    /// Includes the expected total in every event, usually the body's declared length.
    pub fn with_total(total: Option<u64>) -> Self {
        Self { total }
    }
}

impl ProgressSink for TracingProgress {
    fn report(&self, transferred: u64) {
        match self.total {
            Some(total) => info!(transferred, total, "upload progress"),
            None => info!(transferred, "upload progress"),
        }
    }
}
