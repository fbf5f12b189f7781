use pretty_assertions::assert_eq;
use quadrant::io::store_io::{LoadSource, load, render_document, save};
use quadrant::model::task::Quadrant;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Helper: load a fixture file, save it elsewhere, and assert byte-for-byte equality
fn assert_document_round_trip(fixture_name: &str) {
    let source = fs::read_to_string(fixture(fixture_name))
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", fixture_name, e));

    let loaded = load(&fixture(fixture_name));
    assert_eq!(loaded.source, LoadSource::File);

    let tmp = tempfile::TempDir::new().unwrap();
    let out_path = tmp.path().join("tasks_data.json");
    save(&out_path, &loaded.store, &loaded.config).unwrap();
    let output = fs::read_to_string(&out_path).unwrap();

    assert_eq!(
        output, source,
        "Round-trip failed for fixture: {}",
        fixture_name
    );
}

#[test]
fn round_trip_full_document() {
    assert_document_round_trip("tasks_data.json");
}

#[test]
fn full_document_loads_every_field() {
    let loaded = load(&fixture("tasks_data.json"));
    let config = &loaded.config;
    assert_eq!(config.main_title, "期末冲刺");
    assert_eq!(config.event_name, "考试");
    assert!(config.is_locked);
    assert!(!config.auto_start);
    assert_eq!(config.window_size.width, 420);
    assert_eq!(config.font_sizes.countdown, 32);
    assert_eq!(config.font_sizes.task, 11);

    let store = &loaded.store;
    assert_eq!(store.total_len(), 6);
    assert_eq!(store.len(Quadrant::ImportantNotUrgent), 2);
    assert_eq!(store.len(Quadrant::UrgentImportant), 2);
    assert_eq!(store.len(Quadrant::NeitherUrgentNorImportant), 1);
    assert_eq!(store.len(Quadrant::UrgentNotImportant), 1);

    let quoted = store.task(Quadrant::UrgentImportant, 1).unwrap();
    assert_eq!(quoted.content, "回复 \"导师\" 邮件");
    assert!(!quoted.is_done());
    let done = store.task(Quadrant::ImportantNotUrgent, 1).unwrap();
    assert_eq!(done.finished_label(), "2026-01-06 07:30");
}

#[test]
fn second_save_is_identical() {
    let loaded = load(&fixture("tasks_data.json"));
    let first = render_document(&loaded.store, &loaded.config).unwrap();

    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks_data.json");
    fs::write(&path, &first).unwrap();
    let reloaded = load(&path);
    assert_eq!(reloaded.store, loaded.store);
    assert_eq!(reloaded.config, loaded.config);
    assert_eq!(
        render_document(&reloaded.store, &reloaded.config).unwrap(),
        first
    );
}

#[test]
fn partial_document_fills_defaults_per_field() {
    let loaded = load(&fixture("legacy_partial.json"));
    assert_eq!(loaded.source, LoadSource::File);

    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks_data.json");
    save(&path, &loaded.store, &loaded.config).unwrap();
    let output = fs::read_to_string(&path).unwrap();

    let expected = r#"{
  "main_title": "计划",
  "event_name": "截止日期",
  "target_date": "2026-02-06",
  "is_locked": false,
  "auto_start": false,
  "window_size": {
    "width": 400,
    "height": 600
  },
  "font_sizes": {
    "title": 20,
    "event": 12,
    "countdown": 30,
    "quadrant_title": 12,
    "task": 12
  },
  "tasks": [
    {
      "content": "规划",
      "quadrant": "不紧急重要",
      "created_at": "2026-01-02 08:00",
      "finished_at": "未完成",
      "is_done": false
    },
    {
      "content": "旧任务",
      "quadrant": "紧急重要",
      "created_at": "2025-12-31 23:59",
      "finished_at": "2025-12-31 23:59",
      "is_done": true
    }
  ]
}"#;
    assert_eq!(output, expected);
}
