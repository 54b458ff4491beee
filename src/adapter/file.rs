//! File sink with rotation and retention.
//!
//! The active file lives at the configured path; rotation closes it,
//! renames it to the next free sequenced name and reopens a fresh file at
//! the original path. Triggers are line count, byte size and calendar
//! boundaries (hourly/daily), the latter also driven by one-shot timers
//! armed at every file open. Retention sweeps run after each rotation and
//! unlink rotated files older than the configured window.
//!
//! Writers go through a reader-writer lock: the rotation trigger is probed
//! under a read lock and re-checked under the write lock before acting, so
//! the common non-rotating path never serializes on the exclusive lock, and
//! appends happen under the same lock as rotation to keep file content
//! ordered across a rotation.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::{Arc, Weak},
    time::{Duration, SystemTime},
};

use async_lock::RwLock;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    adapter::{Adapter, AdapterError},
    level::Level,
    options::{self, FileOptions, Prefs},
    record::Record,
    util,
};

/// Matches the calendar stamp embedded in rotated names; used to recognise
/// rotated files when the configuration is directory-style (no prefix).
static DATE_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static date pattern"));

/// Rotation failure. The active file is restarted regardless, so the sink
/// never loses its writable target.
#[derive(Debug, Error)]
pub(crate) enum RotateError {
    /// Every candidate sequence number up to the cap already exists.
    #[error("rotate error: no free sequence number to rename {path:?}")]
    Exhausted {
        /// Active file that could not be renamed.
        path: PathBuf,
    },
    /// Renaming the active file failed.
    #[error("rotate rename error: {0}")]
    Rename(#[source] io::Error),
    /// Reopening a fresh active file failed.
    #[error("rotate restart error: {0}")]
    Restart(#[source] io::Error),
}

/// Immutable settings derived from [`FileOptions`] at init.
#[derive(Clone)]
struct FileConfig {
    level: Level,
    rotate: bool,
    daily: bool,
    max_day: u32,
    hourly: bool,
    max_hour: u32,
    /// Active-file path (directory-style configs already have the suffix
    /// appended).
    path: PathBuf,
    dir: PathBuf,
    prefix: String,
    suffix: String,
    max_file: u32,
    max_line: u64,
    max_size: u64,
}

/// Mutable sink state, owned by the lock in [`FileShared`].
struct FileCore {
    /// Back-reference for arming timers; weak so a dropped sink disarms.
    shared: Weak<FileShared>,
    writer: Option<File>,
    lines: u64,
    bytes: u64,
    seq: u32,
    open_day: u32,
    open_hour: u32,
    opened_at: DateTime<Local>,
}

struct FileShared {
    cfg: FileConfig,
    core: RwLock<FileCore>,
}

/// Sink appending rendered records to a rotating file.
pub(crate) struct FileAdapter {
    shared: Option<Arc<FileShared>>,
}

impl FileAdapter {
    pub(crate) fn new() -> FileAdapter {
        FileAdapter { shared: None }
    }
}

/// Split a configured path into (active path, prefix, suffix). A leaf with
/// no dot is a directory: the default suffix is appended and the prefix is
/// empty. A leaf that is exactly a suffix (e.g. a bare `.log`) also has no
/// prefix.
fn split_path(path: &Path) -> (PathBuf, String, String) {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.rfind('.') {
        None => (path.join(".log"), String::new(), String::from(".log")),
        Some(index) => {
            let suffix = name[index..].to_string();
            let prefix = if name == suffix {
                String::new()
            } else {
                name[..index].trim_end_matches('.').to_string()
            };
            (path.to_path_buf(), prefix, suffix)
        }
    }
}

fn create_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    Ok(file)
}

fn count_lines(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(32 * 1024, File::open(path)?);
    let mut count = 0u64;
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        count += chunk.iter().filter(|byte| **byte == b'\n').count() as u64;
        let consumed = chunk.len();
        reader.consume(consumed);
    }
    Ok(count)
}

/// Candidate rotated-file name: optional prefix, optional calendar stamp,
/// zero-padded sequence, suffix.
fn rotated_name(cfg: &FileConfig, stamp: Option<&str>, num: u32) -> PathBuf {
    let name = match (cfg.prefix.as_str(), stamp) {
        ("", None) => format!("{num:03}{}", cfg.suffix),
        ("", Some(stamp)) => format!("{stamp}.{num:03}{}", cfg.suffix),
        (prefix, None) => format!("{prefix}.{num:03}{}", cfg.suffix),
        (prefix, Some(stamp)) => format!("{prefix}.{stamp}.{num:03}{}", cfg.suffix),
    };
    cfg.dir.join(name)
}

/// Whether `name` looks like one of this sink's rotated files. Prefix-style
/// configs match `<prefix>.…<suffix>` (the active `<prefix><suffix>` has no
/// dot and never matches); directory-style configs match on an embedded
/// calendar stamp.
fn retention_match(cfg: &FileConfig, name: &str) -> bool {
    if !name.ends_with(&cfg.suffix) {
        return false;
    }
    if cfg.prefix.is_empty() {
        return DATE_STAMP.is_match(name);
    }
    match name.strip_prefix(cfg.prefix.as_str()) {
        Some(rest) => rest.starts_with('.') && rest.len() > cfg.suffix.len(),
        None => false,
    }
}

/// Remove rotated files whose modification time fell out of the retention
/// window. Per-file failures are reported and skipped; the sweep continues.
fn delete_old(cfg: &FileConfig) {
    let window = if cfg.hourly {
        Duration::from_secs(u64::from(cfg.max_hour) * 3600)
    } else if cfg.daily {
        Duration::from_secs(u64::from(cfg.max_day) * 24 * 3600)
    } else {
        return;
    };
    let entries = match fs::read_dir(&cfg.dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("log retention: read {:?}: {err}", cfg.dir);
            return;
        }
    };
    let now = SystemTime::now();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("log retention: walk {:?}: {err}", cfg.dir);
                continue;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !retention_match(cfg, name) {
            continue;
        }
        let expired = entry
            .metadata()
            .ok()
            .filter(|meta| meta.is_file())
            .and_then(|meta| meta.modified().ok())
            .and_then(|modified| modified.checked_add(window))
            .map_or(false, |deadline| deadline < now);
        if expired {
            if let Err(err) = fs::remove_file(entry.path()) {
                eprintln!("log retention: remove {:?}: {err}", entry.path());
            }
        }
    }
}

impl FileCore {
    fn new(shared: Weak<FileShared>) -> FileCore {
        FileCore {
            shared,
            writer: None,
            lines: 0,
            bytes: 0,
            seq: 0,
            open_day: 0,
            open_hour: 0,
            opened_at: Local::now(),
        }
    }

    /// Open (or reopen) the active file and reset per-file state. Every
    /// open arms the next calendar-boundary timer.
    fn start_logger(&mut self, cfg: &FileConfig) -> io::Result<()> {
        let file = create_log_file(&cfg.path)?;
        // Dropping the previous handle closes it.
        self.writer = Some(file);
        self.init_fd(cfg)
    }

    fn init_fd(&mut self, cfg: &FileConfig) -> io::Result<()> {
        let Some(writer) = self.writer.as_ref() else {
            return Ok(());
        };
        let meta = writer.metadata()?;
        self.bytes = meta.len();
        let now = Local::now();
        self.opened_at = now;
        let (day, hour) = util::day_hour(&now);
        self.open_day = day;
        self.open_hour = hour;
        self.lines = 0;
        self.arm_boundary_timer(cfg);
        if meta.len() > 0 && cfg.max_line > 0 {
            self.lines = count_lines(&cfg.path)?;
        }
        Ok(())
    }

    fn need_rotate_hourly(&self, cfg: &FileConfig, hour: u32) -> bool {
        (cfg.max_line > 0 && self.lines >= cfg.max_line)
            || (cfg.max_size > 0 && self.bytes >= cfg.max_size)
            || (cfg.hourly && hour != self.open_hour)
    }

    fn need_rotate_daily(&self, cfg: &FileConfig, day: u32) -> bool {
        (cfg.max_line > 0 && self.lines >= cfg.max_line)
            || (cfg.max_size > 0 && self.bytes >= cfg.max_size)
            || (cfg.daily && day != self.open_day)
    }

    /// Rotate the active file. Rename failures (including sequence
    /// exhaustion) never prevent the restart: a fresh active file is opened
    /// at the original path no matter what, then retention runs.
    fn do_rotate(&mut self, cfg: &FileConfig, now: DateTime<Local>) -> Result<(), RotateError> {
        let rename_err = self.rotate_active(cfg, now).err();
        let restart_err = self.start_logger(cfg).err();
        self.spawn_cleanup(cfg);
        match (rename_err, restart_err) {
            (None, None) => Ok(()),
            (rename_err, Some(err)) => {
                if let Some(rename_err) = rename_err {
                    eprintln!("log rotate: {:?}: {rename_err}", cfg.path);
                }
                Err(RotateError::Restart(err))
            }
            (Some(err), None) => Err(err),
        }
    }

    /// Close and rename the active file to the next free sequenced name.
    fn rotate_active(&mut self, cfg: &FileConfig, now: DateTime<Local>) -> Result<(), RotateError> {
        if fs::symlink_metadata(&cfg.path).is_err() {
            // Nothing on disk to rename; the restart will recreate it.
            return Ok(());
        }
        let target = self.next_rotated_name(cfg, now)?;
        self.writer = None;
        fs::rename(&cfg.path, &target).map_err(RotateError::Rename)
    }

    fn next_rotated_name(
        &mut self,
        cfg: &FileConfig,
        now: DateTime<Local>,
    ) -> Result<PathBuf, RotateError> {
        let stamp_format = if cfg.hourly {
            Some("%Y-%m-%d-%H")
        } else if cfg.daily {
            Some("%Y-%m-%d")
        } else {
            None
        };
        if cfg.max_line > 0 || cfg.max_size > 0 {
            // Count/size rotation probes for the next unused number, up to
            // the configured cap.
            let stamp = if cfg.prefix.is_empty() {
                None
            } else {
                stamp_format.map(|f| now.format(f).to_string())
            };
            for num in self.seq + 1..=cfg.max_file {
                let candidate = rotated_name(cfg, stamp.as_deref(), num);
                if fs::symlink_metadata(&candidate).is_err() {
                    return Ok(candidate);
                }
            }
            Err(RotateError::Exhausted {
                path: cfg.path.clone(),
            })
        } else {
            // Pure calendar rotation: one candidate per boundary, stamped
            // with the open time of the file being rotated out.
            let stamp = stamp_format.map(|f| self.opened_at.format(f).to_string());
            let num = self.seq + 1;
            self.seq = num;
            let candidate = rotated_name(cfg, stamp.as_deref(), num);
            if fs::symlink_metadata(&candidate).is_ok() {
                return Err(RotateError::Exhausted {
                    path: cfg.path.clone(),
                });
            }
            Ok(candidate)
        }
    }

    /// Arm a one-shot timer for the next calendar boundary. The timer holds
    /// only a weak reference and never reschedules itself; the open that
    /// follows the rotation arms the next one.
    fn arm_boundary_timer(&self, cfg: &FileConfig) {
        if !cfg.rotate {
            return;
        }
        let (wait, hourly) = if cfg.hourly {
            (util::until_next_hour(&self.opened_at), true)
        } else if cfg.daily {
            (util::until_next_day(&self.opened_at), false)
        } else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let weak = self.shared.clone();
        handle.spawn(async move {
            tokio::time::sleep(wait).await;
            let Some(shared) = weak.upgrade() else { return };
            let now = Local::now();
            let (day, hour) = util::day_hour(&now);
            let mut core = shared.core.write().await;
            let due = if hourly {
                core.need_rotate_hourly(&shared.cfg, hour)
            } else {
                core.need_rotate_daily(&shared.cfg, day)
            };
            if due {
                if let Err(err) = core.do_rotate(&shared.cfg, now) {
                    eprintln!("log rotate timer: {:?}: {err}", shared.cfg.path);
                }
            }
        });
    }

    /// Run retention off the write path; inline only when no runtime is
    /// available to park the walk on.
    fn spawn_cleanup(&self, cfg: &FileConfig) {
        if !cfg.hourly && !cfg.daily {
            return;
        }
        let cfg = cfg.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || delete_old(&cfg));
            }
            Err(_) => delete_old(&cfg),
        }
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no active log file",
            ));
        };
        writer.write_all(line.as_bytes())?;
        self.lines += 1;
        self.bytes += line.len() as u64;
        Ok(())
    }
}

#[async_trait]
impl Adapter for FileAdapter {
    fn init(&mut self, prefs: &Prefs) -> Level {
        let options: FileOptions = match prefs.decode() {
            Ok(options) => options,
            Err(err) => {
                eprintln!("file adapter config error: {err}");
                return Level::Undefined;
            }
        };
        let resolved = options::resolve_path(&options.path);
        let (path, prefix, suffix) = split_path(&resolved);
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let cfg = FileConfig {
            level: options.level,
            rotate: options.rotate,
            daily: options.daily,
            max_day: options.max_day,
            hourly: options.hourly,
            max_hour: options.max_hour,
            path,
            dir,
            prefix,
            suffix,
            max_file: options.max_file,
            max_line: options.max_line,
            max_size: options.max_size,
        };
        let level = cfg.level;
        let shared = Arc::new_cyclic(|weak| FileShared {
            cfg,
            core: RwLock::new(FileCore::new(weak.clone())),
        });
        // The lock was created a moment ago and nothing else can hold it.
        if let Some(mut core) = shared.core.try_write() {
            if let Err(err) = core.start_logger(&shared.cfg) {
                eprintln!("file adapter init {:?}: {err}", shared.cfg.path);
            }
        }
        self.shared = Some(shared);
        level
    }

    async fn write(&self, record: &Record) -> Result<(), AdapterError> {
        let Some(shared) = self.shared.as_ref() else {
            return Ok(());
        };
        let cfg = &shared.cfg;
        if record.level > cfg.level && !record.force {
            return Ok(());
        }
        let line = format!("{}{}\n", util::time_header(&record.time), record.text(true));
        let (day, hour) = util::day_hour(&record.time);

        if cfg.rotate {
            // Probe under the read lock, re-check under the write lock.
            let due = {
                let core = shared.core.read().await;
                if core.need_rotate_hourly(cfg, hour) {
                    Some(true)
                } else if core.need_rotate_daily(cfg, day) {
                    Some(false)
                } else {
                    None
                }
            };
            if let Some(hourly) = due {
                let mut core = shared.core.write().await;
                let still_due = if hourly {
                    core.need_rotate_hourly(cfg, hour)
                } else {
                    core.need_rotate_daily(cfg, day)
                };
                if still_due {
                    if let Err(err) = core.do_rotate(cfg, record.time) {
                        eprintln!("log rotate: {:?}: {err}", cfg.path);
                    }
                }
            }
        }

        let mut core = shared.core.write().await;
        core.append(&line)?;
        Ok(())
    }

    async fn flush(&self) {
        if let Some(shared) = self.shared.as_ref() {
            let core = shared.core.write().await;
            if let Some(writer) = core.writer.as_ref() {
                let _ = writer.sync_all();
            }
        }
    }

    async fn close(&self) {
        if let Some(shared) = self.shared.as_ref() {
            let mut core = shared.core.write().await;
            if let Some(writer) = core.writer.take() {
                let _ = writer.sync_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn file_prefs(path: &Path, extra: &str) -> Prefs {
        let text = format!(
            "Level = \"Debug\"\nPath = \"{}\"\n{extra}",
            path.display()
        );
        Prefs::from_toml(&text).expect("test prefs")
    }

    fn record(message: &str) -> Record {
        let mut record = Record::new();
        record.level = Level::Debug;
        record.message.push_str(message);
        record.time = Local::now();
        record
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn split_path_variants() {
        let (active, prefix, suffix) = split_path(Path::new("/var/log/test.log"));
        assert_eq!(active, PathBuf::from("/var/log/test.log"));
        assert_eq!(prefix, "test");
        assert_eq!(suffix, ".log");

        let (active, prefix, suffix) = split_path(Path::new("/var/log/.log"));
        assert_eq!(active, PathBuf::from("/var/log/.log"));
        assert_eq!(prefix, "");
        assert_eq!(suffix, ".log");

        let (active, prefix, suffix) = split_path(Path::new("/var/log/app"));
        assert_eq!(active, PathBuf::from("/var/log/app/.log"));
        assert_eq!(prefix, "");
        assert_eq!(suffix, ".log");
    }

    #[tokio::test]
    async fn writes_without_rotation_keep_one_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("plain.log");
        let mut adapter = FileAdapter::new();
        adapter.init(&file_prefs(&path, "Rotate = false"));

        for index in 0..4 {
            let rec = record(&format!("entry-{index}"));
            adapter.write(&rec).await.expect("write");
        }
        adapter.flush().await;

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        for (index, line) in lines.iter().enumerate() {
            assert!(
                line.contains(&format!("entry-{index}")),
                "payload preserved in order: {line:?}"
            );
        }
        let rotated = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .count();
        assert_eq!(rotated, 1, "no rotated files expected");
        adapter.close().await;
    }

    #[tokio::test]
    async fn line_cap_rotates_and_loses_nothing() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rotating.log");
        let mut adapter = FileAdapter::new();
        adapter.init(&file_prefs(
            &path,
            "Rotate = true\nMaxLine = 2\nMaxFile = 10\nHourly = false\nDaily = false",
        ));

        let payloads = ["a", "b", "c", "d", "e"];
        for payload in payloads {
            adapter.write(&record(payload)).await.expect("write");
        }
        adapter.close().await;

        let files: Vec<PathBuf> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        assert!(
            files.len() >= 3,
            "two rotations plus the active file, got {files:?}"
        );

        let mut seen = Vec::new();
        for file in &files {
            for line in read_lines(file) {
                for payload in payloads {
                    if line.ends_with(&format!("[D] {payload}")) {
                        seen.push(payload);
                    }
                }
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, payloads, "every record lands in exactly one file");
    }

    #[tokio::test]
    async fn directory_style_rotates_with_bare_sequence_names() {
        let dir = tempdir().expect("tempdir");
        let mut adapter = FileAdapter::new();
        adapter.init(&file_prefs(
            dir.path(),
            "Rotate = true\nMaxLine = 1\nMaxFile = 10\nHourly = false\nDaily = false",
        ));

        adapter.write(&record("first")).await.expect("write");
        adapter.write(&record("second")).await.expect("write");
        adapter.close().await;

        let rotated = dir.path().join("001.log");
        assert!(
            rotated.exists(),
            "directory-style rotation names files by bare sequence"
        );
    }

    #[tokio::test]
    async fn exhausted_sequence_still_restarts_active_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("capped.log");
        // Occupy the only allowed sequence slot up front.
        fs::write(dir.path().join("capped.001.log"), "taken").expect("seed");

        let mut adapter = FileAdapter::new();
        adapter.init(&file_prefs(
            &path,
            "Rotate = true\nMaxLine = 1\nMaxFile = 1\nHourly = false\nDaily = false",
        ));

        adapter.write(&record("one")).await.expect("write");
        // Trigger a rotation that cannot find a free name.
        adapter.write(&record("two")).await.expect("write survives");
        adapter.close().await;

        assert!(path.exists(), "active file restarted despite exhaustion");
        let lines = read_lines(&path);
        assert!(
            lines.iter().any(|line| line.contains("two")),
            "writer keeps going after a failed rotation"
        );
    }

    #[test]
    fn retention_window_decides_removal() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("aged.log");
        let (path, prefix, suffix) = split_path(&path);
        let cfg = FileConfig {
            level: Level::Debug,
            rotate: true,
            daily: false,
            max_day: 0,
            hourly: true,
            max_hour: 0,
            dir: dir.path().to_path_buf(),
            path,
            prefix,
            suffix,
            max_file: 10,
            max_line: 0,
            max_size: 0,
        };

        let rotated = dir.path().join("aged.2026-08-07-09.001.log");
        fs::write(&rotated, "old").expect("seed rotated");
        fs::write(dir.path().join("aged.log"), "active").expect("seed active");
        fs::write(dir.path().join("unrelated.txt"), "keep").expect("seed other");

        // Zero-hour window: every rotated file is already expired.
        delete_old(&cfg);
        assert!(!rotated.exists(), "expired rotated file removed");
        assert!(dir.path().join("aged.log").exists(), "active file untouched");
        assert!(dir.path().join("unrelated.txt").exists());

        // Wide window: a fresh rotated file survives the sweep.
        let fresh = dir.path().join("aged.2026-08-07-10.002.log");
        fs::write(&fresh, "new").expect("seed fresh");
        let wide = FileConfig {
            max_hour: 168,
            ..cfg
        };
        delete_old(&wide);
        assert!(fresh.exists(), "file inside the window survives");
    }

    #[test]
    fn retention_match_distinguishes_naming_styles() {
        let (path, prefix, suffix) = split_path(Path::new("/logs/app.log"));
        let named = FileConfig {
            level: Level::Debug,
            rotate: true,
            daily: true,
            max_day: 7,
            hourly: true,
            max_hour: 168,
            dir: PathBuf::from("/logs"),
            path,
            prefix,
            suffix,
            max_file: 100,
            max_line: 0,
            max_size: 0,
        };
        assert!(retention_match(&named, "app.2026-08-07-09.001.log"));
        assert!(retention_match(&named, "app.001.log"));
        assert!(!retention_match(&named, "app.log"), "active file excluded");
        assert!(!retention_match(&named, "other.001.log"));

        let (path, prefix, suffix) = split_path(Path::new("/logs/dir"));
        let bare = FileConfig {
            dir: PathBuf::from("/logs/dir"),
            path,
            prefix,
            suffix,
            ..named
        };
        assert!(retention_match(&bare, "2026-08-07.001.log"));
        assert!(!retention_match(&bare, "001.log"), "no stamp, no match");
        assert!(!retention_match(&bare, ".log"), "active file excluded");
    }

    #[tokio::test]
    async fn reopening_counts_existing_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("resume.log");
        fs::write(&path, "one\ntwo\n").expect("seed");

        let mut adapter = FileAdapter::new();
        adapter.init(&file_prefs(
            &path,
            "Rotate = true\nMaxLine = 3\nMaxFile = 10\nHourly = false\nDaily = false",
        ));
        // Third line hits the cap; the next write must rotate.
        adapter.write(&record("three")).await.expect("write");
        adapter.write(&record("four")).await.expect("write");
        adapter.close().await;

        assert!(
            dir.path().join("resume.001.log").exists(),
            "line count carried over from the pre-existing file"
        );
    }
}
