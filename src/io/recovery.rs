//! Append-only recovery log kept next to the data file.
//!
//! Anything the board could not handle normally ends up here: a data file
//! that failed to parse (its raw bytes are kept), a save that failed (the
//! document that should have been written is kept), or a rejected drop.
//! Nothing here is ever surfaced as an error to the user.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::io::lock::try_lock;

/// Size above which old entries are trimmed on the next append (1 MB)
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this many days are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

const LOG_FILE_NAME: &str = ".recovery.log";

const FILE_HEADER: &str = "\
<!-- quadrant recovery log: data the board could not load or save normally.
     Unreadable data files, failed saves and rejected drops are kept here.
     View with: quad recovery
     Prune old entries: quad recovery prune -->

---
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Data file present but unreadable
    Parse,
    /// Save failed
    Write,
    /// Drag payload rejected
    Drop,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parse => write!(f, "parse"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Drop => write!(f, "drop"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parse" => Some(RecoveryCategory::Parse),
            "write" => Some(RecoveryCategory::Write),
            "drop" => Some(RecoveryCategory::Drop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Directory a file lives in (`.` for bare file names)
fn parent_dir(data_path: &Path) -> &Path {
    match data_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Path of the recovery log that belongs to `data_path`
pub fn recovery_log_path(data_path: &Path) -> PathBuf {
    parent_dir(data_path).join(LOG_FILE_NAME)
}

/// Write `content` to `path` atomically (temp file in the same directory, then rename).
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry format
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Markdown block as stored in the log
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            let fence = body_fence(&self.body);
            out.push_str(&format!("\n{}text\n", fence));
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fence);
            out.push('\n');
        }
        out.push_str("\n---\n");
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

/// A backtick fence longer than any backtick run inside `body`
fn body_fence(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

// ---------------------------------------------------------------------------
// Appending
// ---------------------------------------------------------------------------

/// Append an entry. Failure to write the log only prints a warning.
pub fn log_recovery(data_path: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(&recovery_log_path(data_path), &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(path: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size > MAX_LOG_SIZE {
        trim_in_place(path);
    }
    let needs_header = std::fs::metadata(path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Drop entries older than [`PRUNE_AGE_DAYS`]; skipped if another process holds the file.
fn trim_in_place(path: &Path) {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(_) => return,
    };
    if try_lock(&file).is_err() {
        return;
    }
    let mut content = String::new();
    if io::BufReader::new(&file).read_to_string(&mut content).is_err() {
        return;
    }
    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);
    if trimmed.len() < content.len() {
        if let Ok(mut f) = File::create(path) {
            let _ = f.write_all(trimmed.as_bytes());
        }
    }
}

/// The data file exists but could not be parsed. Its raw content is kept.
pub fn log_corrupt_data_file(data_path: &Path, reason: &str, raw: &str) {
    log_recovery(
        data_path,
        RecoveryEntry::new(RecoveryCategory::Parse, "data file unreadable, started empty")
            .field("File", data_path.display().to_string())
            .field("Reason", reason)
            .body(raw),
    );
}

/// A save failed. The document that should have been written is kept.
pub fn log_failed_save(data_path: &Path, reason: &str, document: &str) {
    log_recovery(
        data_path,
        RecoveryEntry::new(RecoveryCategory::Write, "save failed")
            .field("File", data_path.display().to_string())
            .field("Reason", reason)
            .body(document),
    );
}

/// A drop was refused; the payload is kept for inspection.
pub fn log_rejected_drop(data_path: &Path, reason: &str, payload: &str) {
    log_recovery(
        data_path,
        RecoveryEntry::new(RecoveryCategory::Drop, "drop rejected")
            .field("Reason", reason)
            .body(payload),
    );
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Entries in the log, most recent first. `limit` keeps only the newest N.
pub fn read_recovery_entries(data_path: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(data_path)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    let mut entries = parse_entries(&content);
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut fence: Option<&str> = None;

        while let Some(&next) = lines.peek() {
            if fence.is_none() && (next == "---" || next.starts_with("## ")) {
                if next == "---" {
                    lines.next();
                }
                break;
            }
            lines.next();
            if let Some(open) = fence {
                if next == open {
                    fence = None;
                } else {
                    body_lines.push(next);
                }
            } else if next.starts_with("```") {
                let ticks = next.len() - next.trim_start_matches('`').len();
                fence = Some(&next[..ticks]);
            } else if let Some((key, value)) = next.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body: body_lines.join("\n"),
        });
    }
    entries
}

/// `<rfc3339> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp, rest) = header.split_once(" [")?;
    let (category, description) = rest.split_once("] ")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .ok()?
        .with_timezone(&Utc);
    let category = RecoveryCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before` (default: [`PRUNE_AGE_DAYS`] ago), or
/// all entries. Returns how many were removed.
pub fn prune_recovery(
    data_path: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_path);
    if !path.exists() {
        return Ok(0);
    }
    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    let mut locked = false;
    for _ in 0..10 {
        if try_lock(&file).is_ok() {
            locked = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    if !locked {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "recovery log is in use, try again later",
        ));
    }

    let content = std::fs::read_to_string(&path)?;
    let original = parse_entries(&content).len();
    let kept = if all {
        FILE_HEADER.to_string()
    } else {
        let cutoff =
            before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
        prune_entries_before(&content, &cutoff)
    };
    let remaining = parse_entries(&kept).len();
    std::fs::write(&path, &kept)?;
    Ok(original - remaining)
}

/// Keep the file header and every entry stamped at or after `cutoff`.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current = String::new();
    let mut current_ts: Option<DateTime<Utc>> = None;
    let mut in_header = true;
    let mut fence: Option<&str> = None;

    let flush = |result: &mut String, current: &str, ts: Option<DateTime<Utc>>| {
        if ts.is_some_and(|ts| ts >= *cutoff) {
            result.push_str(current);
        }
    };

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }
        match fence {
            Some(open) if line == open => fence = None,
            None if line.starts_with("```") => {
                let ticks = line.len() - line.trim_start_matches('`').len();
                fence = Some(&line[..ticks]);
            }
            _ => {}
        }
        if fence.is_none()
            && let Some(header) = line.strip_prefix("## ")
        {
            flush(&mut result, &current, current_ts);
            current.clear();
            current_ts = parse_entry_header(header).map(|(ts, _, _)| ts);
        }
        current.push_str(line);
        current.push('\n');
    }
    flush(&mut result, &current, current_ts);
    result
}
