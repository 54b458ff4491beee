//! Pluggable output sinks.
//!
//! Every sink implements [`Adapter`]: configured once through `init`, then
//! driven exclusively by the dispatch loop (`write`/`flush`/`close`). The
//! file variant additionally guards its own state with a reader-writer lock
//! so rotation-boundary timers can drive it outside the loop.

pub(crate) mod console;
pub(crate) mod file;

use async_trait::async_trait;
use thiserror::Error;

use crate::{level::Level, options::Prefs, record::Record};

/// Failure surfaced by a sink write; reported to stderr by the dispatch
/// loop and never propagated to the emitting caller.
#[derive(Debug, Error)]
pub(crate) enum AdapterError {
    /// The underlying target rejected the write.
    #[error("adapter io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract between the dispatch loop and a configured sink.
#[async_trait]
pub(crate) trait Adapter: Send + Sync {
    /// Apply configuration and report the severity this sink honors.
    /// [`Level::Undefined`] marks a misconfigured or absent sink; it then
    /// only sees forced records and contributes nothing to the global
    /// maximum.
    fn init(&mut self, prefs: &Prefs) -> Level;

    /// Write one record. Sinks re-check their own threshold (and the force
    /// flag) so a record can be emitted pipeline-wide yet skipped here.
    async fn write(&self, record: &Record) -> Result<(), AdapterError>;

    /// Push buffered output through to the underlying target.
    async fn flush(&self);

    /// Flush and release the underlying resource. The engine never writes
    /// to a sink after closing it.
    async fn close(&self);
}
