//! Scoped panic capture.
//!
//! [`Caught`] wraps a unit of work: a panic inside it is recovered, turned
//! into a full trace, persisted as a crash dump, and emitted as a forced
//! `Critical` record that bypasses every gate. The capture is fail-open —
//! when the dump cannot be written the in-memory record still goes out.

use std::{
    any::Any,
    backtrace::Backtrace,
    fs,
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
};

use chrono::Local;

use crate::{engine, level::Level, util};

/// Render a panic payload plus the captured backtrace.
///
/// Returns the trace text and the number of captured frames.
pub fn trace_text(reason: &str) -> (String, usize) {
    let backtrace = Backtrace::force_capture().to_string();
    let mut text = String::with_capacity(reason.len() + backtrace.len() + 1);
    text.push_str(reason);
    text.push('\n');
    let mut depth = 0usize;
    for line in backtrace.lines() {
        let trimmed = line.trim_start();
        if trimmed
            .chars()
            .next()
            .map_or(false, |first| first.is_ascii_digit())
        {
            depth += 1;
        }
        text.push_str("    ");
        text.push_str(trimmed);
        text.push('\n');
    }
    (text, depth)
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("panic")
    }
}

/// Recovery scope for application panics.
///
/// ```no_run
/// let outcome = hotaru::Caught::new()
///     .handler(|trace, depth| eprintln!("recovered ({depth} frames): {trace}"))
///     .run(|| risky_work());
/// # fn risky_work() {}
/// ```
pub struct Caught {
    exit: bool,
    dump_dir: Option<PathBuf>,
    handler: Option<Box<dyn Fn(&str, usize) + Send + Sync>>,
}

impl Caught {
    /// A capture scope that recovers, reports and continues.
    pub fn new() -> Caught {
        Caught {
            exit: false,
            dump_dir: None,
            handler: None,
        }
    }

    /// After reporting, drain the engine and terminate the process with a
    /// non-zero status.
    pub fn exit(mut self, exit: bool) -> Caught {
        self.exit = exit;
        self
    }

    /// Directory for crash dumps instead of the default
    /// `<local-data>/Panic/`.
    pub fn dump_dir(mut self, dir: impl Into<PathBuf>) -> Caught {
        self.dump_dir = Some(dir.into());
        self
    }

    /// Callback invoked with the trace text and its stack depth after the
    /// forced record has been emitted.
    pub fn handler(mut self, handler: impl Fn(&str, usize) + Send + Sync + 'static) -> Caught {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Run `work`, capturing any panic it raises. Returns the closure's
    /// value, or `None` when a panic was recovered.
    pub fn run<R>(&self, work: impl FnOnce() -> R) -> Option<R> {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.recover(panic_reason(payload.as_ref()));
                None
            }
        }
    }

    fn recover(&self, reason: String) {
        let (trace, depth) = trace_text(&reason);
        self.persist(&trace);
        engine::print(Level::Critical, true, None, format_args!("{trace}"));
        if let Some(handler) = &self.handler {
            handler(&trace, depth);
        }
        if self.exit {
            engine::print(
                Level::Critical,
                true,
                None,
                format_args!("log caught: exit caused by panic"),
            );
            if let Some(logger) = engine::current() {
                logger.close_blocking();
            }
            std::process::exit(1);
        }
    }

    /// Write the trace under the crash-dump directory; failures are
    /// reported and otherwise ignored.
    fn persist(&self, trace: &str) {
        let dir = self
            .dump_dir
            .clone()
            .unwrap_or_else(|| util::local_data_dir().join("Panic"));
        if let Err(err) = fs::create_dir_all(&dir) {
            eprintln!("log caught: create {dir:?}: {err}");
            return;
        }
        let path = dir.join(format!("{}.panic", util::file_stamp(&Local::now())));
        if let Err(err) = fs::write(&path, trace) {
            eprintln!("log caught: write {path:?}: {err}");
        }
    }
}

impl Default for Caught {
    fn default() -> Self {
        Caught::new()
    }
}
