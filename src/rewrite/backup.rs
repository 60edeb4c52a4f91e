//! Write-temp-then-replace commit for the rewrite stages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Park `rewritten` in a sibling pending-output slot (`path` + `suffix`),
/// then either promote it over the original or discard it.
///
/// Returns whether the file changed. When the rewrite produced identical
/// content the slot is removed and the original is left untouched, bytes
/// and inode alike. Every exit path leaves exactly one complete file at
/// `path`.
pub fn commit(path: &Path, original: &str, rewritten: &str, suffix: &str) -> io::Result<bool> {
    let slot = pending_slot(path, suffix);
    fs::write(&slot, rewritten)?;
    if rewritten == original {
        fs::remove_file(&slot)?;
        Ok(false)
    } else {
        fs::rename(&slot, path)?;
        Ok(true)
    }
}

fn pending_slot(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_content_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        fs::write(&path, "same\n").unwrap();
        let changed = commit(&path, "same\n", "same\n", ".ubak").unwrap();
        assert!(!changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "same\n");
        assert!(!dir.path().join("project.pbxproj.ubak").exists());
    }

    #[test]
    fn test_changed_content_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        fs::write(&path, "old\n").unwrap();
        let changed = commit(&path, "old\n", "new\n", ".sbak").unwrap();
        assert!(changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!dir.path().join("project.pbxproj.sbak").exists());
    }
}
