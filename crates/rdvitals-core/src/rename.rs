//! Collision-safe path allocation via numbered suffixing.

use std::path::{Path, PathBuf};

/// Returns a path that does not currently exist, based on `desired`.
///
/// If `desired` is free it is returned unchanged. Otherwise the stem gets
/// a ` (n)` suffix, probing n = 2, 3, ... until a name is free; both files
/// and directories count as taken. The lowest free index wins, so deleting
/// `level (3).rdzip` makes a later call return it again.
///
/// This is a probe, not a reservation: nothing stops another process (or a
/// concurrent allocation for the same desired path) from creating the
/// returned path before the caller does. Callers fanning out downloads
/// into one directory must serialize allocation or accept the race.
pub fn unique_path(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut index: u32 = 2;
    loop {
        let candidate = desired.with_file_name(format!("{stem} ({index}){extension}"));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn free_path_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("level.rdzip");
        assert_eq!(unique_path(&p), p);
    }

    #[test]
    fn taken_path_gets_suffix_two() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("level.rdzip");
        fs::write(&p, b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("level (2).rdzip"));
    }

    #[test]
    fn probe_returns_lowest_free_index() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("level.rdzip");
        fs::write(&p, b"x").unwrap();
        fs::write(dir.path().join("level (2).rdzip"), b"x").unwrap();
        fs::write(dir.path().join("level (3).rdzip"), b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("level (4).rdzip"));

        // Freeing a lower index makes it the next allocation; nothing is cached.
        fs::remove_file(dir.path().join("level (3).rdzip")).unwrap();
        assert_eq!(unique_path(&p), dir.path().join("level (3).rdzip"));
    }

    #[test]
    fn directories_count_as_taken() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("level");
        fs::create_dir(&p).unwrap();
        assert_eq!(unique_path(&p), dir.path().join("level (2)"));
    }

    #[test]
    fn extensionless_path_suffixes_whole_name() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bundle");
        fs::write(&p, b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("bundle (2)"));
    }
}
