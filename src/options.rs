//! Configuration consumed at engine setup.
//!
//! Settings arrive as a hierarchical key/value tree ([`Prefs`], backed by a
//! TOML table) holding one section per adapter under `Log`. Each adapter
//! decodes its section into a typed options struct; missing keys fall back
//! to the defaults below, and an entirely absent section leaves the adapter
//! unconfigured.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::{level::Level, util};

/// Name of the configuration section holding the adapter table.
pub const LOG_SECTION: &str = "Log";

/// Default ingestion-queue capacity.
pub(crate) const QUEUE_CAPACITY: usize = 300_000;

/// Error raised when a configuration source cannot be parsed.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// The TOML text was malformed.
    #[error("prefs parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Hierarchical key/value configuration tree.
#[derive(Debug, Clone, Default)]
pub struct Prefs {
    root: toml::Table,
}

impl Prefs {
    /// An empty tree; [`crate::setup`] on it yields an engine without
    /// adapters (records still drain, nothing is written).
    pub fn new() -> Prefs {
        Prefs::default()
    }

    /// Parse a TOML document into a tree.
    pub fn from_toml(text: &str) -> Result<Prefs, PrefsError> {
        Ok(Prefs {
            root: text.parse::<toml::Table>()?,
        })
    }

    /// Wrap an already-built table.
    pub fn from_table(root: toml::Table) -> Prefs {
        Prefs { root }
    }

    /// The named child section, when present and itself a table.
    pub fn section(&self, name: &str) -> Option<Prefs> {
        match self.root.get(name) {
            Some(toml::Value::Table(table)) => Some(Prefs { root: table.clone() }),
            _ => None,
        }
    }

    /// Child sections in key order, skipping non-table values.
    pub(crate) fn sections(&self) -> impl Iterator<Item = (&str, Prefs)> {
        self.root.iter().filter_map(|(name, value)| match value {
            toml::Value::Table(table) => Some((name.as_str(), Prefs { root: table.clone() })),
            _ => None,
        })
    }

    /// Decode this node into a typed options struct.
    pub(crate) fn decode<T>(&self) -> Result<T, toml::de::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        toml::Value::Table(self.root.clone()).try_into()
    }
}

/// Console adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ConsoleOptions {
    /// Threshold for this sink.
    pub level: Level,
    /// Wrap severity labels in ANSI colors.
    pub color: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        ConsoleOptions {
            level: Level::Info,
            color: true,
        }
    }
}

/// File adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FileOptions {
    /// Threshold for this sink.
    pub level: Level,
    /// Master switch for every rotation trigger.
    pub rotate: bool,
    /// Rotate when the calendar day changes.
    pub daily: bool,
    /// Retention window for daily rotation, in days.
    pub max_day: u32,
    /// Rotate when the hour changes; takes precedence over `daily`.
    pub hourly: bool,
    /// Retention window for hourly rotation, in hours.
    pub max_hour: u32,
    /// Target path. A leaf without an extension is treated as a directory
    /// and the default `.log` suffix is appended. May reference
    /// `${LocalData}`, environment variables and `~`.
    pub path: String,
    /// Cap on rotated-file sequence probing before rotation is reported as
    /// exhausted.
    pub max_file: u32,
    /// Rotate after this many lines in the active file (0 disables).
    pub max_line: u64,
    /// Rotate after this many bytes in the active file (0 disables).
    pub max_size: u64,
}

impl Default for FileOptions {
    fn default() -> Self {
        FileOptions {
            level: Level::Notice,
            rotate: true,
            daily: true,
            max_day: 7,
            hourly: true,
            max_hour: 168,
            path: String::from("${LocalData}/Log/"),
            max_file: 100,
            max_line: 1_000_000,
            max_size: 128 * 1024 * 1024,
        }
    }
}

/// Expand deferred references in a configured path: the `${LocalData}`
/// placeholder, environment variables and a leading `~`.
pub(crate) fn resolve_path(path: &str) -> PathBuf {
    let replaced = if path.contains("${LocalData}") {
        path.replace(
            "${LocalData}",
            &util::local_data_dir().to_string_lossy(),
        )
    } else {
        path.to_string()
    };
    match shellexpand::full(&replaced) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(replaced),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_defaults_match_contract() {
        let options = FileOptions::default();
        assert_eq!(options.level, Level::Notice);
        assert!(options.rotate && options.daily && options.hourly);
        assert_eq!(options.max_day, 7);
        assert_eq!(options.max_hour, 168);
        assert_eq!(options.max_file, 100);
        assert_eq!(options.max_line, 1_000_000);
        assert_eq!(options.max_size, 128 * 1024 * 1024);
    }

    #[test]
    fn console_defaults_match_contract() {
        let options = ConsoleOptions::default();
        assert_eq!(options.level, Level::Info);
        assert!(options.color);
    }

    #[test]
    fn decode_overrides_and_defaults() {
        let prefs = Prefs::from_toml(
            r#"
            [Log.File]
            Level = "Debug"
            MaxLine = 2
            Rotate = false
            "#,
        )
        .expect("valid toml");

        let section = prefs
            .section(LOG_SECTION)
            .and_then(|log| log.section("File"))
            .expect("file section");
        let options: FileOptions = section.decode().expect("decodable");
        assert_eq!(options.level, Level::Debug);
        assert_eq!(options.max_line, 2);
        assert!(!options.rotate);
        // Untouched keys keep their defaults.
        assert_eq!(options.max_day, 7);
    }

    #[test]
    fn unknown_level_decodes_to_undefined() {
        let prefs = Prefs::from_toml("Level = \"Loud\"").expect("valid toml");
        let options: ConsoleOptions = prefs.decode().expect("decodable");
        assert_eq!(options.level, Level::Undefined);
    }

    #[test]
    fn sections_skip_scalars() {
        let prefs = Prefs::from_toml(
            r#"
            Stray = 1
            [Std]
            Level = "Info"
            "#,
        )
        .expect("valid toml");
        let names: Vec<_> = prefs.sections().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["Std"]);
    }

    #[test]
    fn resolve_path_expands_local_data() {
        let resolved = resolve_path("${LocalData}/Log/");
        assert!(!resolved.to_string_lossy().contains("${LocalData}"));
    }

    #[test]
    fn resolve_path_expands_environment() {
        std::env::set_var("HOTARU_TEST_DIR", "/tmp/hotaru-env");
        let resolved = resolve_path("${HOTARU_TEST_DIR}/app.log");
        assert_eq!(resolved, PathBuf::from("/tmp/hotaru-env/app.log"));
    }
}
