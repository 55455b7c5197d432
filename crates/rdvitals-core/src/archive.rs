//! .rdzip archive validation and extraction.
//!
//! # Untrusted input
//!
//! Level packages come from arbitrary URLs and are untrusted. Entry names
//! are checked (no absolute paths, no `..` traversal), but **archive
//! metadata is otherwise believed**: uncompressed sizes and entry counts
//! are not cross-checked, so a decompression bomb will happily fill the
//! disk. That matches the upstream tooling's behavior and is an explicit
//! non-guarantee; integrators extracting from hostile sources need their
//! own quota or sandbox.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::control::AbortFlag;
use crate::download::{download_level, DownloadError};
use crate::http::HttpOptions;
use crate::rename::unique_path;

/// The input was not a valid level archive, or could not be safely
/// unpacked. Both cases carry the offending archive path.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{path} is not a valid zip file: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("{path} was unable to be unzipped: {reason}")]
    Extract { path: PathBuf, reason: String },
}

/// Failure of the combined download-then-unzip operation.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[from] io::Error),
}

/// Unzips `input` into the `output` directory.
///
/// The archive is validated before anything is created on disk, so a
/// non-archive input fails without leaving an empty output directory
/// behind. Entries whose names escape the output directory (absolute
/// paths, `..` components, reserved names) fail extraction as
/// [`ArchiveError::Extract`] rather than a raw OS error; in that case any
/// output directory created by this call is removed again.
pub fn unzip_level(input: &Path, output: &Path) -> Result<(), ArchiveError> {
    let file = File::open(input).map_err(|e| ArchiveError::Invalid {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ArchiveError::Invalid {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;

    let created_root = !output.exists();
    let result = extract_all(&mut zip, input, output);
    if result.is_err() && created_root {
        // Leave no partial tree for a failed extraction we started.
        if let Err(rm) = fs::remove_dir_all(output) {
            tracing::warn!(path = %output.display(), error = %rm, "failed to remove partial extraction");
        }
    }
    result
}

fn extract_all(
    zip: &mut zip::ZipArchive<File>,
    input: &Path,
    output: &Path,
) -> Result<(), ArchiveError> {
    let extract_err = |reason: String| ArchiveError::Extract {
        path: input.to_path_buf(),
        reason,
    };

    fs::create_dir_all(output).map_err(|e| extract_err(e.to_string()))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| extract_err(e.to_string()))?;

        // enclosed_name rejects absolute paths and `..` traversal.
        let relative: PathBuf = entry
            .enclosed_name()
            .ok_or_else(|| extract_err(format!("unsafe entry name {:?}", entry.name())))?
            .to_owned();
        let target = output.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| extract_err(e.to_string()))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| extract_err(e.to_string()))?;
        }
        let mut out = File::create(&target).map_err(|e| extract_err(e.to_string()))?;
        io::copy(&mut entry, &mut out).map_err(|e| extract_err(e.to_string()))?;
    }

    Ok(())
}

/// Downloads the level at `url` into a scratch directory, then unzips it
/// into `output_dir`; the scratch copy is dropped afterwards. With
/// `create_subfolder` the contents land in a collision-safe subdirectory
/// named after the archive stem instead of directly in `output_dir`.
///
/// See the module docs for the untrusted-archive caveat.
pub fn download_unzip(
    opts: &HttpOptions,
    url: &str,
    output_dir: &Path,
    create_subfolder: bool,
    abort: Option<&AbortFlag>,
) -> Result<PathBuf, AcquireError> {
    let scratch = tempfile::tempdir()?;
    let zipped = download_level(opts, url, scratch.path(), None, abort)?;

    let output = if create_subfolder {
        let stem = zipped.file_stem().unwrap_or_default();
        unique_path(&output_dir.join(stem))
    } else {
        output_dir.to_path_buf()
    };

    unzip_level(&zipped, &output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_all_members() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("level.rdzip");
        write_zip(
            &zip_path,
            &[
                ("main.rdlevel", br#"{"settings": {}}"#),
                ("art/cover.png", b"png bytes"),
            ],
        );

        let out = dir.path().join("unzipped");
        unzip_level(&zip_path, &out).unwrap();
        assert!(out.join("main.rdlevel").is_file());
        assert!(out.join("art/cover.png").is_file());
    }

    #[test]
    fn non_archive_fails_without_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let not_zip = dir.path().join("not_a.rdzip");
        fs::write(&not_zip, b"plain text, not a zip").unwrap();

        let out = dir.path().join("unzipped");
        let err = unzip_level(&not_zip, &out).unwrap_err();
        assert!(matches!(err, ArchiveError::Invalid { ref path, .. } if path == &not_zip));
        assert!(!out.exists());
    }

    #[test]
    fn traversal_entry_fails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("evil.rdzip");
        write_zip(&zip_path, &[("../escape.txt", b"nope")]);

        let out = dir.path().join("unzipped");
        let err = unzip_level(&zip_path, &out).unwrap_err();
        assert!(matches!(err, ArchiveError::Extract { .. }));
        assert!(!out.exists());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn preexisting_output_dir_is_kept_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("evil.rdzip");
        write_zip(&zip_path, &[("../escape.txt", b"nope")]);

        let out = dir.path().join("unzipped");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep.txt"), b"existing data").unwrap();

        unzip_level(&zip_path, &out).unwrap_err();
        assert!(out.join("keep.txt").is_file());
    }
}
