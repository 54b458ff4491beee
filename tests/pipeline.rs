//! End-to-end pipeline tests: emission, dispatch, file sink, lifecycle.

use std::{fs, path::Path, sync::Arc};

use hotaru::{Level, LogTag, Logger, Prefs};
use tempfile::tempdir;

fn file_engine(path: &Path, extra: &str) -> Arc<Logger> {
    let text = format!(
        "[Log.File]\nLevel = \"Debug\"\nPath = \"{}\"\n{extra}",
        path.display()
    );
    Logger::setup(&Prefs::from_toml(&text).expect("test prefs"))
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn records_round_trip_through_file_sink() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("roundtrip.log");
    let logger = file_engine(&path, "Rotate = false");

    for index in 0..100 {
        logger.log(
            Level::Debug,
            None::<&LogTag>,
            format_args!("payload-{index}"),
        );
    }
    logger.flush().await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 100, "one line per record, none lost");
    for (index, line) in lines.iter().enumerate() {
        assert!(
            line.contains(&format!("payload-{index}")),
            "queue order preserved in file order: {line:?}"
        );
    }
    logger.close().await;
}

#[tokio::test]
async fn line_cap_spreads_records_across_rotated_files() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("spread.log");
    let logger = file_engine(
        &path,
        "Rotate = true\nMaxLine = 2\nMaxFile = 10\nHourly = false\nDaily = false",
    );

    let payloads = ["a", "b", "c", "d", "e"];
    for payload in payloads {
        logger.log(Level::Debug, None::<&LogTag>, format_args!("{payload}"));
    }
    logger.close().await;

    let files: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    assert!(
        files.len() >= 3,
        "expected two rotated files plus the active one, got {files:?}"
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
    assert_eq!(seen, payloads, "every record appears in exactly one file");
}

#[tokio::test]
async fn tag_override_forces_past_sink_threshold() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("forced.log");
    let text = format!(
        "[Log.File]\nLevel = \"Error\"\nPath = \"{}\"\nRotate = false",
        path.display()
    );
    let logger = Logger::setup(&Prefs::from_toml(&text).expect("test prefs"));

    // Below the sink threshold, no override: suppressed.
    logger.log(Level::Debug, None::<&LogTag>, format_args!("quiet"));

    // Tag override admits the record and marks it forced.
    let tag = hotaru::get_tag();
    tag.set("job", "sweep");
    tag.set_level(Level::Debug);
    logger.log(Level::Debug, Some(&tag), format_args!("loud"));
    hotaru::put_tag(tag);

    logger.close().await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1, "only the forced record lands: {lines:?}");
    assert!(lines[0].contains("[job=sweep]"), "tag text attached");
    assert!(lines[0].contains("loud"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_contexts_keep_their_tags() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("contexts.log");
    let logger = file_engine(&path, "Rotate = false");

    let workers: Vec<_> = (0..2)
        .map(|index| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                let tag = hotaru::watch(None);
                tag.set("worker", &index.to_string());
                for turn in 0..10 {
                    logger.log(
                        Level::Debug,
                        None::<&LogTag>,
                        format_args!("worker-{index} turn-{turn}"),
                    );
                }
                hotaru::defer();
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread");
    }
    logger.flush().await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 20);
    for line in &lines {
        for index in 0..2 {
            if line.contains(&format!("worker-{index} ")) {
                assert!(
                    line.contains(&format!("[worker={index}]")),
                    "record carries its own context's tag: {line:?}"
                );
            }
        }
    }
    logger.close().await;
}

#[tokio::test]
async fn close_is_idempotent_and_final() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("closed.log");
    let logger = file_engine(&path, "Rotate = false");

    logger.log(Level::Debug, None::<&LogTag>, format_args!("before"));
    logger.close().await;
    let after_first = read_lines(&path).len();

    logger.close().await;
    logger.close().await;
    // Post-close emission takes the direct stdout path, not the file.
    logger.log(Level::Debug, None::<&LogTag>, format_args!("after"));
    logger.flush().await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), after_first, "closed sink receives nothing more");
    assert_eq!(after_first, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_closers_all_complete() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("race.log");
    let logger = file_engine(&path, "Rotate = false");
    logger.log(Level::Debug, None::<&LogTag>, format_args!("survivor"));

    let closers: Vec<_> = (0..4)
        .map(|_| {
            let logger = Arc::clone(&logger);
            tokio::spawn(async move { logger.close().await })
        })
        .collect();
    futures::future::join_all(closers).await;

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1, "drain happened exactly once: {lines:?}");
    assert!(lines[0].contains("survivor"));
}

#[tokio::test]
async fn global_engine_supports_hot_reload() {
    let dir = tempdir().expect("tempdir");
    let first_path = dir.path().join("first.log");
    let second_path = dir.path().join("second.log");

    let first = format!(
        "[Log.File]\nLevel = \"Debug\"\nPath = \"{}\"\nRotate = false",
        first_path.display()
    );
    hotaru::setup(&Prefs::from_toml(&first).expect("prefs")).await;
    hotaru::debug!("first engine");
    assert_eq!(hotaru::level(), Level::Debug);
    assert!(hotaru::able(Level::Debug));

    // Re-setup closes the previous engine before the new one takes over.
    let second = format!(
        "[Log.File]\nLevel = \"Warn\"\nPath = \"{}\"\nRotate = false",
        second_path.display()
    );
    hotaru::setup(&Prefs::from_toml(&second).expect("prefs")).await;
    assert_eq!(hotaru::level(), Level::Warn);
    assert!(!hotaru::able(Level::Info));
    hotaru::warn!("second engine");
    hotaru::info!("gated out");
    hotaru::flush().await;

    let first_lines = read_lines(&first_path);
    assert_eq!(first_lines.len(), 1);
    assert!(first_lines[0].contains("first engine"));

    let second_lines = read_lines(&second_path);
    assert_eq!(second_lines.len(), 1, "info is below the maximum: {second_lines:?}");
    assert!(second_lines[0].contains("second engine"));

    assert_eq!(hotaru::size(), 0);
    hotaru::close().await;
    hotaru::close().await;
}
