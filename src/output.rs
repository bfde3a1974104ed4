//! Locked writes for run artifacts
//!
//! Checkpoints may be read by another process (a dashboard, a second
//! `taskcheck report`) while a run is going, so every write takes an
//! exclusive `fs2` advisory lock and truncates only after the lock is held.

use fs2::FileExt;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::errors::ReportWriteError;

/// Serialize `value` as pretty JSON and write it with [`write_with_retry`].
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportWriteError> {
    let content = serde_json::to_string_pretty(value).map_err(|e| ReportWriteError {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })?;
    write_with_retry(path, &content)
}

/// Write `content`, retrying once before giving up.
pub fn write_with_retry(path: &Path, content: &str) -> Result<(), ReportWriteError> {
    match locked_write(path, content) {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::warn!(path = %path.display(), error = %first, "write failed, retrying once");
            locked_write(path, content).map_err(|source| ReportWriteError {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Write with an exclusive lock: open → lock → truncate → write → flush.
pub fn locked_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // No truncate on open; set_len(0) happens under the lock.
    #[allow(clippy::suspicious_open_options)]
    let file = OpenOptions::new().write(true).create(true).open(path)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    let mut writer = BufWriter::new(&file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read with a shared lock so a reader never sees a half-written checkpoint.
pub fn locked_read(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;
    let mut content = String::new();
    BufReader::new(&file).read_to_string(&mut content)?;
    Ok(content)
}
