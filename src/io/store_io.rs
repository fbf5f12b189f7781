use std::fs;
use std::path::{Path, PathBuf};

use crate::io::document::StateDocument;
use crate::io::lock::{FileLock, LockError};
use crate::io::recovery::{atomic_write, log_corrupt_data_file, log_failed_save};
use crate::model::config::Configuration;
use crate::model::store::TaskStore;

pub const DATA_FILE_NAME: &str = "tasks_data.json";

/// Environment variable overriding the data file location
pub const DATA_ENV: &str = "QUADRANT_DATA";

/// Error type for saving the board
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where the loaded state came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// No data file yet; defaults were used
    Missing,
    File,
    /// The file exists but could not be read as a board; defaults were used
    Corrupt { reason: String, raw: String },
}

#[derive(Debug, Clone)]
pub struct LoadedState {
    pub store: TaskStore,
    pub config: Configuration,
    pub source: LoadSource,
}

impl LoadedState {
    fn defaults(source: LoadSource) -> Self {
        LoadedState {
            store: TaskStore::new(),
            config: Configuration::default(),
            source,
        }
    }
}

/// Resolve the data file path: explicit flag, then `$QUADRANT_DATA`, then
/// `$XDG_DATA_HOME/quadrant/tasks_data.json`.
pub fn resolve_data_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    data_path_from_env(|key| std::env::var(key).ok())
}

fn data_path_from_env(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let set = |key: &str| var(key).filter(|v| !v.is_empty());
    if let Some(path) = set(DATA_ENV) {
        return PathBuf::from(path);
    }
    let data_dir = set("XDG_DATA_HOME").map(PathBuf::from).unwrap_or_else(|| {
        set("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"))
            .join(".local")
            .join("share")
    });
    data_dir.join("quadrant").join(DATA_FILE_NAME)
}

/// The JSON text `save` would write
pub fn render_document(
    store: &TaskStore,
    config: &Configuration,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StateDocument::from_state(store, config))
}

/// Write the whole board to `path` (write lock, then temp file + rename).
pub fn save(path: &Path, store: &TaskStore, config: &Configuration) -> Result<(), PersistError> {
    let text = render_document(store, config)?;
    write_document(path, &text)
}

fn write_document(path: &Path, text: &str) -> Result<(), PersistError> {
    let write_error = |source| PersistError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let _lock = FileLock::for_write(path)?;
    atomic_write(path, text.as_bytes()).map_err(write_error)
}

/// Save, keeping the unsaved document in the recovery log on failure.
/// The in-memory board stays authoritative either way. Returns the text written.
pub fn save_or_log(
    path: &Path,
    store: &TaskStore,
    config: &Configuration,
) -> Result<String, PersistError> {
    let text = render_document(store, config)?;
    match write_document(path, &text) {
        Ok(()) => Ok(text),
        Err(e) => {
            log_failed_save(path, &e.to_string(), &text);
            Err(e)
        }
    }
}

/// Read the board from `path`. Never fails: a missing or unreadable file
/// yields an empty store and the default configuration.
pub fn load(path: &Path) -> LoadedState {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return LoadedState::defaults(LoadSource::Missing);
        }
        Err(e) => {
            return LoadedState::defaults(LoadSource::Corrupt {
                reason: e.to_string(),
                raw: String::new(),
            });
        }
    };
    let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    match parse_document(content) {
        Ok(doc) => LoadedState {
            store: doc.task_store(),
            config: doc.configuration(),
            source: LoadSource::File,
        },
        Err(e) => LoadedState::defaults(LoadSource::Corrupt {
            reason: e.to_string(),
            raw: String::from_utf8_lossy(&bytes).into_owned(),
        }),
    }
}

/// The top level must be a JSON object; everything inside it is read leniently.
fn parse_document(content: &[u8]) -> Result<StateDocument, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(content)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object at the top level"));
    }
    serde_json::from_value(value)
}

/// [`load`], recording an unreadable file in the recovery log before its
/// content is replaced by defaults.
pub fn load_or_recover(path: &Path) -> LoadedState {
    let state = load(path);
    if let LoadSource::Corrupt { reason, raw } = &state.source {
        log_corrupt_data_file(path, reason, raw);
    }
    state
}
