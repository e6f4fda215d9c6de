//! Write-then-rename file replacement.
//!
//! Bytes go to `{path}.tmp`, are flushed with `sync_all()`, and the temp file
//! is renamed over the target. A crash mid-write leaves the previous document
//! intact plus a stray `.tmp` that [`crate::crash_recovery`] removes on open.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of the temporary sibling used while writing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replace the contents of `path` with `data`.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp, path)?;
    Ok(())
}
