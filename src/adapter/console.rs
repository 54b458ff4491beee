//! Console sink: timestamp-prefixed lines on standard output, with the
//! severity label optionally wrapped in an ANSI color.

use std::io::Write;

use async_trait::async_trait;

use crate::{
    adapter::{Adapter, AdapterError},
    level::Level,
    options::{ConsoleOptions, Prefs},
    record::Record,
    util,
};

/// ANSI SGR codes keyed by severity, `Emergency` first.
const BRUSHES: [&str; 8] = [
    "1;39", // Emergency
    "1;36", // Alert
    "1;35", // Critical
    "1;31", // Error
    "1;33", // Warn
    "1;32", // Notice
    "1;30", // Info
    "1;34", // Debug
];

fn paint(level: Level, text: &str) -> String {
    let brush = BRUSHES[level as i8 as usize];
    format!("\x1b[{brush}m{text}\x1b[0m")
}

/// Sink writing rendered records to standard output.
pub(crate) struct ConsoleAdapter {
    level: Level,
    color: bool,
}

impl ConsoleAdapter {
    pub(crate) fn new() -> ConsoleAdapter {
        ConsoleAdapter {
            level: Level::Undefined,
            color: false,
        }
    }

    /// Full line for a record, timestamp header included.
    fn render(&self, record: &Record) -> String {
        let mut body = record.text(true);
        if self.color && record.level.is_defined() {
            let label = record.level.label();
            body = body.replacen(label, &paint(record.level, label), 1);
        }
        format!("{}{}", util::time_header(&record.time), body)
    }
}

#[async_trait]
impl Adapter for ConsoleAdapter {
    fn init(&mut self, prefs: &Prefs) -> Level {
        let options: ConsoleOptions = match prefs.decode() {
            Ok(options) => options,
            Err(err) => {
                eprintln!("console adapter config error: {err}");
                return Level::Undefined;
            }
        };
        self.level = options.level;
        self.color = options.color;
        self.level
    }

    async fn write(&self, record: &Record) -> Result<(), AdapterError> {
        if record.level > self.level && !record.force {
            return Ok(());
        }
        let line = self.render(record);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }

    async fn flush(&self) {}

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(level: Level, message: &str) -> Record {
        let mut record = Record::new();
        record.level = level;
        record.message.push_str(message);
        record.time = chrono::Local.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap();
        record
    }

    #[test]
    fn render_plain_line() {
        let mut adapter = ConsoleAdapter::new();
        adapter.init(&Prefs::from_toml("Color = false").unwrap());

        let line = adapter.render(&record(Level::Info, "hello"));
        assert_eq!(line, "[08/07 10:00:00.000] [I] hello");
    }

    #[test]
    fn render_wraps_label_in_color() {
        let mut adapter = ConsoleAdapter::new();
        adapter.init(&Prefs::from_toml("Color = true").unwrap());

        let line = adapter.render(&record(Level::Error, "boom"));
        assert!(line.contains("\x1b[1;31m[E]\x1b[0m"), "label should be painted: {line:?}");
        assert!(line.ends_with("boom"));
    }

    #[tokio::test]
    async fn write_skips_below_threshold_unless_forced() {
        let mut adapter = ConsoleAdapter::new();
        adapter.init(&Prefs::from_toml("Level = \"Error\"").unwrap());

        let quiet = record(Level::Debug, "quiet");
        adapter.write(&quiet).await.expect("skip is not an error");

        let mut forced = record(Level::Debug, "forced");
        forced.force = true;
        adapter.write(&forced).await.expect("forced write");
    }
}
