use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock (flock on Unix).
///
/// Two locks exist per data file: a short-lived write lock taken around every
/// save, so a CLI write never interleaves with a board save, and an instance
/// lock held by the board for its whole lifetime.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another quad process may be writing")]
    Timeout { path: PathBuf },
    #[error("another board is already open on {data_path}")]
    AlreadyRunning { data_path: PathBuf },
}

/// `<dir>/.<file name>.<suffix>`
fn sibling_lock_path(data_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(data_path.file_name().unwrap_or_default());
    name.push(".");
    name.push(suffix);
    data_path.with_file_name(name)
}

pub fn write_lock_path(data_path: &Path) -> PathBuf {
    sibling_lock_path(data_path, "lock")
}

pub fn instance_lock_path(data_path: &Path) -> PathBuf {
    sibling_lock_path(data_path, "instance")
}

impl FileLock {
    /// Lock `lock_path`, retrying for up to `timeout`.
    pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.to_path_buf(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock {
                        _file: file,
                        path: lock_path.to_path_buf(),
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout {
                        path: lock_path.to_path_buf(),
                    });
                }
            }
        }
    }

    /// Write lock for a save of `data_path` (2 second timeout)
    pub fn for_write(data_path: &Path) -> Result<Self, LockError> {
        Self::acquire(&write_lock_path(data_path), Duration::from_secs(2))
    }

    /// Instance lock for a board on `data_path`; fails at once if one is held.
    pub fn single_instance(data_path: &Path) -> Result<Self, LockError> {
        match Self::acquire(&instance_lock_path(data_path), Duration::ZERO) {
            Err(LockError::Timeout { .. }) => Err(LockError::AlreadyRunning {
                data_path: data_path.to_path_buf(),
            }),
            other => other,
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock is released with the file; the lock file itself is just litter
        let _ = fs::remove_file(&self.path);
    }
}

/// Non-blocking exclusive flock
#[cfg(unix)]
pub(crate) fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
