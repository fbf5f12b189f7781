//! Small per-user key-value store, separate from the board document.
//!
//! Lives at `$XDG_CONFIG_HOME/<organization>/<application>.toml` and is
//! edited with `toml_edit` so hand-written comments survive. The board keeps
//! its last focused position under `[pos]`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::task::Quadrant;

pub const ORGANIZATION: &str = "MyStudio";
pub const APPLICATION: &str = "EisenhowerDesktop";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Last focused place on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPosition {
    pub quadrant: Quadrant,
    pub row: usize,
}

#[derive(Debug, Default, Deserialize)]
struct KnownKeys {
    #[serde(default)]
    pos: Option<BoardPosition>,
}

pub struct Settings {
    path: PathBuf,
    doc: toml_edit::DocumentMut,
}

/// Settings file for (organization, application), respecting XDG_CONFIG_HOME
pub fn settings_path(organization: &str, application: &str) -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/"))
                .join(".config")
        });
    config_dir
        .join(organization)
        .join(format!("{}.toml", application))
}

impl Settings {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(SettingsError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let doc = text
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| SettingsError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Settings {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Top-level string value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(|item| item.as_str())
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.doc[key] = toml_edit::value(value);
    }

    pub fn position(&self) -> Option<BoardPosition> {
        toml::from_str::<KnownKeys>(&self.doc.to_string())
            .ok()
            .and_then(|keys| keys.pos)
    }

    pub fn set_position(&mut self, pos: BoardPosition) {
        if !self.doc.contains_table("pos") {
            self.doc["pos"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        self.doc["pos"]["quadrant"] = toml_edit::value(pos.quadrant.label());
        self.doc["pos"]["row"] = toml_edit::value(i64::try_from(pos.row).unwrap_or(i64::MAX));
    }

    /// Write back to disk, creating the directory if needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::WriteError {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&self.path, self.doc.to_string()).map_err(write_error)
    }
}
