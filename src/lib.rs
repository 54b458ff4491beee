#![deny(missing_docs)]
//! Hotaru is an embedded, asynchronous, structured logging engine.
//!
//! Call sites submit records concurrently through severity macros; a
//! bounded queue feeds a single dispatch task that fans every record out to
//! the configured sinks (console, rotating file). File sinks rotate on line
//! count, byte size and calendar boundaries, and expire rotated files past
//! a retention window. A per-context tag store lets concurrent units of
//! work attach key/value metadata — and optionally override the severity
//! gate — without threading a parameter through every call.
//!
//! ```no_run
//! # async fn example() {
//! let prefs = hotaru::Prefs::from_toml(
//!     r#"
//!     [Log.Std]
//!     Level = "Info"
//!
//!     [Log.File]
//!     Level = "Debug"
//!     Path = "/var/log/myapp/app.log"
//!     MaxLine = 1000000
//!     "#,
//! )
//! .unwrap();
//! hotaru::setup(&prefs).await;
//!
//! let tag = hotaru::watch(None);
//! tag.set("svc", "gateway");
//! hotaru::info!("listening on {}", 8080);
//!
//! hotaru::defer();
//! hotaru::close().await;
//! # }
//! ```
//!
//! Emission never blocks and never fails the caller: a full queue or a
//! closed engine degrades to a synchronous line on standard output.

mod adapter;
mod caught;
mod engine;
mod level;
mod macros;
mod options;
mod pool;
mod record;
mod tag;
mod util;

pub use caught::{trace_text, Caught};
pub use engine::{able, close, flush, level, log, print, setup, size, Logger};
pub use level::Level;
pub use options::{ConsoleOptions, FileOptions, Prefs, PrefsError, LOG_SECTION};
pub use tag::{context_tag, defer, get_tag, put_tag, tag_with, watch, LogTag};
