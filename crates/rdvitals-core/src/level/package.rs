//! Reading level documents out of an .rdzip package.
//!
//! Every package carries its primary document as `main.rdlevel`. Levels
//! with a separate two-player chart name the alternate document in
//! `settings.separate2PLevelFilename`; the member it names lives next to
//! the primary one in the same archive.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::control::AbortFlag;
use crate::download::{download_level, DownloadError};
use crate::http::HttpOptions;

use super::{decode_level, DecodeError, Level};

/// Archive member holding the primary level document.
pub const MAIN_LEVEL: &str = "main.rdlevel";

/// Settings key naming the separate two-player document, when one exists.
pub const SEPARATE_2P_KEY: &str = "separate2PLevelFilename";

/// Failure to get a level document out of a package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    /// A two-player document was requested but the settings don't name
    /// one, or the named member is absent from the archive. Distinct from
    /// a decode failure so callers can treat "no 2P chart" as a normal
    /// condition.
    #[error("unable to find a 2 player level in {path}")]
    AlternateNotFound { path: std::path::PathBuf },
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[from] io::Error),
}

/// Parses the level data directly from an .rdzip file, using
/// `main.rdlevel` as the document. With `two_player` set, the separate 2P
/// document referenced by the primary document's settings is parsed and
/// returned instead.
pub fn parse_rdzip(path: &Path, two_player: bool) -> Result<Level, PackageError> {
    let file = File::open(path).map_err(|e| ArchiveError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ArchiveError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let main_text = read_member(&mut zip, path, MAIN_LEVEL)?;
    let main_doc = decode_level(&main_text)?;

    if !two_player {
        return Ok(main_doc);
    }

    let two_p_name = main_doc
        .get("settings")
        .and_then(|s| s.get(SEPARATE_2P_KEY))
        .and_then(|v| v.as_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PackageError::AlternateNotFound {
            path: path.to_path_buf(),
        })?
        .to_string();

    if zip.by_name(&two_p_name).is_err() {
        return Err(PackageError::AlternateNotFound {
            path: path.to_path_buf(),
        });
    }
    let alt_text = read_member(&mut zip, path, &two_p_name)?;
    Ok(decode_level(&alt_text)?)
}

/// Reads one archive member as text. Invalid UTF-8 byte sequences become
/// U+FFFD here and are removed by the decoder's sanitization pass if they
/// break the parse.
fn read_member(
    zip: &mut zip::ZipArchive<File>,
    path: &Path,
    member: &str,
) -> Result<String, PackageError> {
    let extract_err = |reason: String| {
        PackageError::Archive(ArchiveError::Extract {
            path: path.to_path_buf(),
            reason,
        })
    };

    let mut entry = zip
        .by_name(member)
        .map_err(|e| extract_err(format!("missing member {member:?}: {e}")))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| extract_err(format!("failed reading member {member:?}: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Downloads the level at `url` to a scratch directory and parses it with
/// [`parse_rdzip`]; the downloaded archive is dropped afterwards.
pub fn parse_url(
    opts: &HttpOptions,
    url: &str,
    two_player: bool,
    abort: Option<&AbortFlag>,
) -> Result<Level, PackageError> {
    let scratch = tempfile::tempdir()?;
    let path = download_level(opts, url, scratch.path(), None, abort)?;
    parse_rdzip(&path, two_player)
}
