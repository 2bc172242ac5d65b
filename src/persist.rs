//! File persistence for the serialized keychain and its pinned checksum.
//!
//! The keychain itself performs no I/O; these helpers are what the CLI
//! uses to keep `keychain.json` and the trusted checksum on disk.
//! Writes are atomic: readers never see a half-written file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::errors::{KeychainError, Result};

/// Write `contents` to `path` **atomically**.
///
/// Writes to a temp file in the same directory, created owner-only on
/// Unix, then renames it over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    // A stale temp file keeps its old mode, so clear it first.
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }
    let mut file = options.open(&tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read a serialized keychain from disk.
pub fn read_store(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(KeychainError::StoreNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Read the pinned checksum, if one has been written.
pub fn read_checksum(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let checksum = fs::read_to_string(path)?;
    let checksum = checksum.trim();
    if checksum.is_empty() {
        return Ok(None);
    }
    Ok(Some(checksum.to_string()))
}

/// Persist a dumped keychain and pin its checksum.
///
/// The store is written first; the pin only moves forward once the
/// matching store is on disk.
pub fn save(store_path: &Path, checksum_path: &Path, store: &str, checksum: &str) -> Result<()> {
    write_atomic(store_path, store.as_bytes())?;
    write_atomic(checksum_path, format!("{checksum}\n").as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keychain.json");
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(read_store(&path).unwrap(), "{}");
        // The temp file must be gone after the rename.
        assert!(!tmp.path().join(".keychain.json.tmp").exists());
    }

    #[test]
    fn read_missing_store_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_store(&tmp.path().join("nope.json")),
            Err(KeychainError::StoreNotFound(_))
        ));
    }

    #[test]
    fn checksum_roundtrip_trims_newline() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("keychain.json");
        let pin = tmp.path().join("pin");
        assert_eq!(read_checksum(&pin).unwrap(), None);

        save(&store, &pin, "{}", "abc=").unwrap();
        assert_eq!(read_checksum(&pin).unwrap().as_deref(), Some("abc="));
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keychain.json");
        write_atomic(&path, b"{}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn stale_world_readable_temp_file_is_not_reused() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keychain.json");
        let stale = tmp.path().join(".keychain.json.tmp");
        fs::write(&stale, b"old").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, b"{}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(read_store(&path).unwrap(), "{}");
    }
}
