//! Pooled log records flowing through the ingestion queue.

use chrono::{DateTime, Local};

use crate::level::Level;

/// One log event.
///
/// Records are owned by exactly one stage at a time: the emitting call fills
/// one from the pool, the queue carries it, the dispatch loop fans it out,
/// and the loop returns it to the pool afterwards. Adapters only ever see a
/// shared borrow and must not retain it past `write`.
pub(crate) struct Record {
    /// Severity of the event.
    pub(crate) level: Level,
    /// Bypass per-adapter thresholds (panic/crash capture, tag overrides).
    pub(crate) force: bool,
    /// Rendered message; the buffer survives pooling to keep its allocation.
    pub(crate) message: String,
    /// Rendered context-tag text, empty when the emitting context has none.
    pub(crate) tag_text: String,
    /// Wall-clock time captured at emission.
    pub(crate) time: DateTime<Local>,
}

impl Record {
    pub(crate) fn new() -> Record {
        Record {
            level: Level::Undefined,
            force: false,
            message: String::new(),
            tag_text: String::new(),
            time: Local::now(),
        }
    }

    /// Clear everything but the buffer allocations before pooling.
    pub(crate) fn reset(&mut self) {
        self.level = Level::Undefined;
        self.force = false;
        self.message.clear();
        self.tag_text.clear();
    }

    /// Render the line body: severity label, optional tag text, message.
    pub(crate) fn text(&self, with_tag: bool) -> String {
        if with_tag && !self.tag_text.is_empty() {
            format!("{} {} {}", self.level.label(), self.tag_text, self.message)
        } else {
            format!("{} {}", self.level.label(), self.message)
        }
    }
}
