//! Log severities.
//!
//! Eight ordered severities following RFC 5424, from `Emergency` (0) down to
//! `Debug` (7), plus an `Undefined` sentinel that sorts below all of them.
//! A record is eligible for a sink when its level is less than or equal to
//! the effective maximum, so "more severe" always wins comparisons.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Severity of a log record.
///
/// The numeric ordering matches RFC 5424: `Emergency` is 0 and `Debug` is 7.
/// `Undefined` (-1) marks an unset threshold; an adapter that reports it is
/// effectively disabled and contributes nothing to the global maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Level {
    /// Threshold not configured; sorts below every real severity.
    Undefined = -1,
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warn = 4,
    /// Normal but significant events.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

impl Level {
    /// Short bracketed label used as the line prefix, e.g. `[E]` for errors.
    pub fn label(self) -> &'static str {
        match self {
            Level::Undefined => "[?]",
            Level::Emergency => "[M]",
            Level::Alert => "[A]",
            Level::Critical => "[C]",
            Level::Error => "[E]",
            Level::Warn => "[W]",
            Level::Notice => "[N]",
            Level::Info => "[I]",
            Level::Debug => "[D]",
        }
    }

    /// Full severity name as it appears in configuration values.
    pub fn name(self) -> &'static str {
        match self {
            Level::Undefined => "Undefined",
            Level::Emergency => "Emergency",
            Level::Alert => "Alert",
            Level::Critical => "Critical",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Notice => "Notice",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }

    /// Parse a configuration value; anything unrecognised maps to
    /// [`Level::Undefined`] rather than an error, so a typo disables the
    /// adapter instead of failing setup.
    pub fn from_name(name: &str) -> Level {
        match name {
            "Emergency" => Level::Emergency,
            "Alert" => Level::Alert,
            "Critical" => Level::Critical,
            "Error" => Level::Error,
            "Warn" => Level::Warn,
            "Notice" => Level::Notice,
            "Info" => Level::Info,
            "Debug" => Level::Debug,
            _ => Level::Undefined,
        }
    }

    /// Whether this is a real severity rather than the sentinel.
    pub fn is_defined(self) -> bool {
        self != Level::Undefined
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Level::from_name(&name))
    }
}
