//! Engine lifecycle, level gate and the dispatch loop.
//!
//! One [`Logger`] owns the bounded ingestion queue and every configured
//! sink. Arbitrarily many producers submit records concurrently; a single
//! dedicated task drains the queue and is the only caller of sink methods,
//! which serializes all I/O without locking sinks against producers.
//! Producers never block and never fail: a full queue or a closed engine
//! degrades to a synchronous line on standard output.
//!
//! A process-global instance backs the free-function API ([`setup`],
//! [`log`], [`flush`], [`close`], …); [`setup`] is re-entrant and closes
//! any previous instance first, preserving hot-reload semantics.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

use chrono::Local;
use once_cell::sync::Lazy;
use tokio_util::sync::CancellationToken;

use crate::{
    adapter::{console::ConsoleAdapter, file::FileAdapter, Adapter},
    level::Level,
    options::{Prefs, LOG_SECTION, QUEUE_CAPACITY},
    pool::Pool,
    record::Record,
    tag::{self, LogTag},
    util,
};

/// Idle records retained for reuse.
const RECORD_POOL_CAPACITY: usize = 1024;

/// Requests riding the control channel into the dispatch loop.
enum Control {
    /// Drain the queue, flush every sink, then signal the sender.
    Flush(flume::Sender<()>),
}

/// The logging engine: queue, sinks and their single consumer.
///
/// Most callers use the process-global instance through the free functions
/// in this crate; embedding multiple engines (e.g. in tests) works by
/// holding the `Arc` returned from [`Logger::setup`].
pub struct Logger {
    records: flume::Sender<Box<Record>>,
    control: flume::Sender<Control>,
    /// Disconnects when the dispatch loop has fully drained and released
    /// the sinks; doubles as the close broadcast.
    done: flume::Receiver<()>,
    pool: Arc<Pool<Box<Record>>>,
    shutdown: CancellationToken,
    closed: AtomicBool,
    level_max: Level,
}

impl Logger {
    /// Build an engine from configuration and start its dispatch loop.
    ///
    /// Unsupported adapter names are reported and skipped; the engine runs
    /// with whatever sinks remain. Must be called within a tokio runtime.
    pub fn setup(prefs: &Prefs) -> Arc<Logger> {
        let mut adapters: Vec<(String, Arc<dyn Adapter>)> = Vec::new();
        let mut level_max = Level::Undefined;
        if let Some(section) = prefs.section(LOG_SECTION) {
            for (name, node) in section.sections() {
                let mut adapter: Box<dyn Adapter> = match name {
                    "Std" => Box::new(ConsoleAdapter::new()),
                    "File" => Box::new(FileAdapter::new()),
                    other => {
                        eprintln!("log setup: unsupported adapter: {other}");
                        continue;
                    }
                };
                let level = adapter.init(&node);
                if level > level_max {
                    level_max = level;
                }
                adapters.push((name.to_string(), Arc::from(adapter)));
            }
        }

        let (record_tx, record_rx) = flume::bounded(QUEUE_CAPACITY);
        let (control_tx, control_rx) = flume::unbounded();
        let (done_tx, done_rx) = flume::bounded(0);
        let shutdown = CancellationToken::new();
        let pool = Arc::new(Pool::new(
            RECORD_POOL_CAPACITY,
            || Box::new(Record::new()),
            |record| record.reset(),
        ));

        tokio::spawn(dispatch(
            adapters,
            record_rx,
            control_rx,
            shutdown.clone(),
            Arc::clone(&pool),
            done_tx,
        ));
        spawn_signal_listener(shutdown.clone());

        Arc::new(Logger {
            records: record_tx,
            control: control_tx,
            done: done_rx,
            pool,
            shutdown,
            closed: AtomicBool::new(false),
            level_max,
        })
    }

    /// Maximum severity any configured sink honors.
    pub fn level(&self) -> Level {
        self.level_max
    }

    /// Whether a record at `level` would pass the gate right now, taking
    /// the calling context's tag override into account.
    pub fn able(&self, level: Level) -> bool {
        if let Some(ctx) = tag::context_tag() {
            let override_level = ctx.level();
            if override_level.is_defined() {
                return level <= override_level;
            }
        }
        level <= self.level_max
    }

    /// Records currently buffered in the ingestion queue.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    /// Gate a record and, when eligible, enqueue it.
    ///
    /// Gate priority: an explicit `tag` argument's level override, else the
    /// calling context's tag override, else the engine-wide maximum. A
    /// record admitted through a tag override is forced so per-sink
    /// thresholds cannot suppress it.
    pub fn log(&self, level: Level, tag: Option<impl AsRef<LogTag>>, args: fmt::Arguments<'_>) {
        if let Some(tag) = tag {
            let tag = tag.as_ref();
            let override_level = tag.level();
            let (able, force) = if override_level.is_defined() {
                (level <= override_level, true)
            } else {
                (level <= self.level_max, false)
            };
            if able {
                self.print(level, force, Some(tag), args);
            }
            return;
        }
        if let Some(ctx) = tag::context_tag() {
            let override_level = ctx.level();
            let (able, force) = if override_level.is_defined() {
                (level <= override_level, true)
            } else {
                (level <= self.level_max, false)
            };
            if able {
                self.print(level, force, Some(&ctx), args);
            }
            return;
        }
        if level <= self.level_max {
            self.print(level, false, None, args);
        }
    }

    /// Fill a pooled record and enqueue it, bypassing the gate.
    ///
    /// Queue-full and post-close emissions degrade to a synchronous line on
    /// standard output; emission never blocks and never drops.
    pub fn print(&self, level: Level, force: bool, tag: Option<&LogTag>, args: fmt::Arguments<'_>) {
        let mut record = self.pool.acquire();
        record.level = level;
        record.force = force;
        record.time = Local::now();
        let _ = fmt::Write::write_fmt(&mut record.message, args);
        if let Some(tag) = tag {
            record.tag_text.push_str(&tag.text());
        }

        if self.closed.load(Ordering::SeqCst) {
            direct(&record);
            self.pool.release(record);
            return;
        }
        if let Err(err) = self.records.try_send(record) {
            let record = err.into_inner();
            direct(&record);
            self.pool.release(record);
        }
    }

    /// Block the caller until every record enqueued so far has reached the
    /// sinks and the sinks have flushed.
    pub async fn flush(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let (ack_tx, ack_rx) = flume::bounded(1);
        if self.control.send(Control::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv_async().await;
            self.log(
                Level::Notice,
                None::<&LogTag>,
                format_args!("log flush: queue drained and sinks flushed"),
            );
        }
    }

    /// [`Logger::flush`] for synchronous call sites.
    pub fn flush_blocking(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let (ack_tx, ack_rx) = flume::bounded(1);
        if self.control.send(Control::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Drain the queue, flush and release every sink, then return.
    ///
    /// Idempotent: the first caller triggers the teardown, every caller
    /// (concurrent or later) waits for the same completion.
    pub async fn close(&self) {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            self.shutdown.cancel();
        }
        let _ = self.done.recv_async().await;
        if first {
            direct_line(Level::Notice, "", format_args!("log close: engine closed"));
        }
    }

    /// [`Logger::close`] for synchronous call sites.
    pub fn close_blocking(&self) {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            self.shutdown.cancel();
        }
        let _ = self.done.recv();
    }
}

/// Single consumer: drains the queue, fans records out to every sink, and
/// services flush/termination requests.
async fn dispatch(
    adapters: Vec<(String, Arc<dyn Adapter>)>,
    records: flume::Receiver<Box<Record>>,
    control: flume::Receiver<Control>,
    shutdown: CancellationToken,
    pool: Arc<Pool<Box<Record>>>,
    done: flume::Sender<()>,
) {
    loop {
        tokio::select! {
            biased;
            request = control.recv_async() => match request {
                Ok(Control::Flush(ack)) => {
                    drain(&adapters, &records, &pool).await;
                    for (_, adapter) in &adapters {
                        adapter.flush().await;
                    }
                    let _ = ack.send(());
                }
                Err(_) => break,
            },
            _ = shutdown.cancelled() => break,
            record = records.recv_async() => match record {
                Ok(record) => {
                    write_all(&adapters, &record).await;
                    pool.release(record);
                }
                Err(_) => break,
            },
        }
    }

    // Termination: whatever is still queued reaches the sinks before they
    // are released.
    drain(&adapters, &records, &pool).await;
    for (_, adapter) in &adapters {
        adapter.flush().await;
        adapter.close().await;
    }
    drop(done);
}

async fn write_all(adapters: &[(String, Arc<dyn Adapter>)], record: &Record) {
    for (name, adapter) in adapters {
        if let Err(err) = adapter.write(record).await {
            eprintln!("log dispatch: write to {name}: {err}");
        }
    }
}

async fn drain(
    adapters: &[(String, Arc<dyn Adapter>)],
    records: &flume::Receiver<Box<Record>>,
    pool: &Pool<Box<Record>>,
) {
    while let Ok(record) = records.try_recv() {
        write_all(adapters, &record).await;
        pool.release(record);
    }
}

/// Cancel the engine token on SIGTERM/SIGINT so process termination runs
/// the same drain-then-close path as an explicit close.
fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut terminate =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(signal) => signal,
                    Err(_) => return,
                };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => token.cancel(),
                _ = terminate.recv() => token.cancel(),
                _ = token.cancelled() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => token.cancel(),
                _ = token.cancelled() => {}
            }
        }
    });
}

fn direct(record: &Record) {
    println!("{}{}", util::time_header(&record.time), record.text(true));
}

fn direct_line(level: Level, tag_text: &str, args: fmt::Arguments<'_>) {
    let header = util::time_header(&Local::now());
    if tag_text.is_empty() {
        println!("{header}{} {args}", level.label());
    } else {
        println!("{header}{} {tag_text} {args}", level.label());
    }
}

static GLOBAL: Lazy<RwLock<Option<Arc<Logger>>>> = Lazy::new(|| RwLock::new(None));

/// The process-global engine, if [`setup`] has run.
pub(crate) fn current() -> Option<Arc<Logger>> {
    GLOBAL
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Install the process-global engine from configuration, closing and
/// replacing any previous instance first.
pub async fn setup(prefs: &Prefs) {
    let previous = GLOBAL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    if let Some(previous) = previous {
        previous.close().await;
    }
    let logger = Logger::setup(prefs);
    *GLOBAL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(logger);
}

/// Gate and emit through the global engine. Without one, eligible records
/// render directly to standard output (gate wide open at `Debug`).
pub fn log(level: Level, tag: Option<impl AsRef<LogTag>>, args: fmt::Arguments<'_>) {
    if let Some(logger) = current() {
        logger.log(level, tag, args);
        return;
    }
    // No engine: same gate priority, rendered synchronously.
    match tag {
        Some(tag) => {
            let tag = tag.as_ref();
            if !tag.level().is_defined() || level <= tag.level() {
                direct_line(level, &tag.text(), args);
            }
        }
        None => match tag::context_tag() {
            Some(ctx) => {
                if !ctx.level().is_defined() || level <= ctx.level() {
                    direct_line(level, &ctx.text(), args);
                }
            }
            None => direct_line(level, "", args),
        },
    }
}

/// Emit through the global engine bypassing the gate (used for forced
/// records such as crash reports).
pub fn print(level: Level, force: bool, tag: Option<&LogTag>, args: fmt::Arguments<'_>) {
    match current() {
        Some(logger) => logger.print(level, force, tag, args),
        None => {
            let tag_text = tag.map(|t| t.text()).unwrap_or_default();
            direct_line(level, &tag_text, args);
        }
    }
}

/// Maximum severity the global engine honors; `Debug` without an engine.
pub fn level() -> Level {
    current().map(|logger| logger.level()).unwrap_or(Level::Debug)
}

/// Whether a record at `level` would currently pass the global gate.
pub fn able(level: Level) -> bool {
    match current() {
        Some(logger) => logger.able(level),
        None => {
            if let Some(ctx) = tag::context_tag() {
                if ctx.level().is_defined() {
                    return level <= ctx.level();
                }
            }
            level <= Level::Debug
        }
    }
}

/// Records buffered in the global engine's queue.
pub fn size() -> usize {
    current().map(|logger| logger.size()).unwrap_or(0)
}

/// Flush the global engine; blocks until the drain it requested completes.
pub async fn flush() {
    if let Some(logger) = current() {
        logger.flush().await;
    }
}

/// Close the global engine: drain, flush, release sinks. Idempotent.
pub async fn close() {
    if let Some(logger) = current() {
        logger.close().await;
    }
}
