//! Crash artifact cleanup.
//!
//! An interrupted [`crate::atomic_write::atomic_write`] leaves a `.tmp` file
//! next to the document it was replacing. The document itself is still the
//! last complete write, so the leftover is simply deleted when a store opens.

use std::fs;
use std::path::Path;

use bevy::log::{info, warn};

/// Remove every `*.tmp` file directly inside `dir`, returning how many were
/// deleted. A missing directory counts as clean.
pub fn clean_tmp_files(dir: &Path) -> std::io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut cleaned = 0;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("tmp") {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed interrupted write {}", path.display());
                cleaned += 1;
            }
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/parking_crash_recovery_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_cleans_only_tmp_files() {
        let dir = test_dir("only_tmp");
        fs::write(dir.join("lot.park"), b"keep").unwrap();
        fs::write(dir.join("lot.park.tmp"), b"drop").unwrap();
        fs::write(dir.join("vehicles.park.tmp"), b"drop").unwrap();

        assert_eq!(clean_tmp_files(&dir).unwrap(), 2);
        assert!(dir.join("lot.park").exists());
        assert!(!dir.join("lot.park.tmp").exists());
        assert!(!dir.join("vehicles.park.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_dir_is_clean() {
        let dir = PathBuf::from("/tmp/parking_crash_recovery_test_does_not_exist");
        let _ = fs::remove_dir_all(&dir);
        assert_eq!(clean_tmp_files(&dir).unwrap(), 0);
    }
}
