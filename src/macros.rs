//! Severity-specific emission macros.
//!
//! Each macro accepts a format string with arguments, optionally preceded
//! by a tag to gate and annotate the record:
//!
//! ```no_run
//! let tag = hotaru::get_tag();
//! tag.set("svc", "auth");
//! hotaru::info!("listening on {}", 8080);
//! hotaru::warn!(tag: tag, "token close to expiry");
//! hotaru::put_tag(tag);
//! ```

/// Emit an `Emergency` record: the system is unusable.
#[macro_export]
macro_rules! emergency {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Emergency, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Emergency, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit an `Alert` record: action must be taken immediately.
#[macro_export]
macro_rules! alert {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Alert, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Alert, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit a `Critical` record.
#[macro_export]
macro_rules! critical {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Critical, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Critical, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit an `Error` record.
#[macro_export]
macro_rules! error {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Error, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Error, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit a `Warn` record.
#[macro_export]
macro_rules! warn {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Warn, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Warn, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit a `Notice` record: significant but expected.
#[macro_export]
macro_rules! notice {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Notice, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Notice, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit an `Info` record.
#[macro_export]
macro_rules! info {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Info, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Info, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Emit a `Debug` record.
#[macro_export]
macro_rules! debug {
    (tag: $tag:expr, $($arg:tt)+) => {
        $crate::log($crate::Level::Debug, ::core::option::Option::Some(&$tag), ::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::log($crate::Level::Debug, ::core::option::Option::<&$crate::LogTag>::None, ::core::format_args!($($arg)+))
    };
}

/// Format a message and panic with it; pair with [`crate::Caught`] to turn
/// the panic into a crash dump and a forced `Critical` record.
#[macro_export]
macro_rules! panic_log {
    ($($arg:tt)+) => {
        ::core::panic!($($arg)+)
    };
}
