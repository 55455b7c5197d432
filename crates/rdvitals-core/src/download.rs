//! Streamed level download with all-or-nothing failure semantics.
//!
//! The response body goes straight to disk through libcurl's write
//! callback; nothing is buffered in memory. Any failure mid-stream
//! (transfer error, disk error, abort) removes the partial file before the
//! error reaches the caller, so a failed download leaves no artifact.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::control::AbortFlag;
use crate::filename::{rdzip_segment, resolve_filename, FilenameError};
use crate::http::{self, HttpError, HttpOptions};
use crate::rename::unique_path;

/// Failure to acquire a level file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No usable filename could be derived for the URL.
    #[error(transparent)]
    Filename(#[from] FilenameError),
    /// The request failed or returned an error status.
    #[error(transparent)]
    Http(#[from] HttpError),
    /// Writing the body to disk failed. The partial file has already been
    /// removed.
    #[error("failed writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The download was cancelled via its [`AbortFlag`]. The partial file
    /// has already been removed.
    #[error("download aborted")]
    Aborted,
}

/// Downloads the level at `url` into `dir`, returning the written path.
///
/// With `filename: None` the name is derived automatically: from the URL
/// when it ends in `.rdzip` (no extra request), otherwise from the
/// Content-Disposition header of a HEAD probe; either way the final path
/// is made collision-safe with [`unique_path`]. Passing an explicit
/// `filename` skips both steps and **will overwrite** an existing file of
/// that name — that is the documented opt-in for callers that manage their
/// own naming.
///
/// An HTTP error status aborts before the destination file is even
/// created. If `abort` is set mid-stream the transfer stops, the partial
/// file is removed, and `DownloadError::Aborted` is returned.
pub fn download_level(
    opts: &HttpOptions,
    url: &str,
    dir: &Path,
    filename: Option<&str>,
    abort: Option<&AbortFlag>,
) -> Result<PathBuf, DownloadError> {
    let full_path = match filename {
        Some(name) => dir.join(name),
        None => unique_path(&auto_name(opts, url).map(|n| dir.join(n))?),
    };

    tracing::debug!(url, path = %full_path.display(), "starting level download");
    stream_to_file(opts, url, &full_path, abort)?;
    tracing::info!(url, path = %full_path.display(), "level downloaded");
    Ok(full_path)
}

/// Derives the filename without touching the filesystem. URLs already
/// ending in `.rdzip` are resolved locally; anything else needs a HEAD
/// probe for the Content-Disposition header (and the post-redirect URL).
fn auto_name(opts: &HttpOptions, url: &str) -> Result<String, DownloadError> {
    if rdzip_segment(url).is_some() {
        return Ok(resolve_filename(url, None)?);
    }
    let probed = http::probe(opts, url)?;
    Ok(resolve_filename(
        &probed.final_url,
        probed.content_disposition.as_deref(),
    )?)
}

/// Streams a GET body into `path`. The file is created lazily on the first
/// body chunk, so an error response never creates (or truncates) anything.
fn stream_to_file(
    opts: &HttpOptions,
    url: &str,
    path: &Path,
    abort: Option<&AbortFlag>,
) -> Result<(), DownloadError> {
    let mut file: Option<File> = None;
    let mut write_err: Option<io::Error> = None;
    let mut aborted = false;

    let mut easy = curl::easy::Easy::new();
    http::configure(&mut easy, opts, url).map_err(HttpError::from)?;
    // Fail on 4xx/5xx without invoking the write callback for the error body.
    easy.fail_on_error(true).map_err(HttpError::from)?;

    let perform = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if abort.map_or(false, AbortFlag::is_aborted) {
                    aborted = true;
                    return Ok(0); // abort transfer
                }
                let out = match &mut file {
                    Some(f) => f,
                    None => match File::create(path) {
                        Ok(f) => file.insert(f),
                        Err(e) => {
                            write_err = Some(e);
                            return Ok(0);
                        }
                    },
                };
                match out.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0)
                    }
                }
            })
            .map_err(HttpError::from)?;
        transfer.perform()
    };

    if let Err(e) = perform {
        // Clean up before propagating; a failed delete is logged rather
        // than allowed to mask the transfer error.
        if file.is_some() {
            if let Err(rm) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %rm, "failed to remove partial download");
            }
        }
        if aborted {
            return Err(DownloadError::Aborted);
        }
        if let Some(source) = write_err {
            return Err(DownloadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        if e.is_http_returned_error() {
            let status = easy.response_code().unwrap_or(0);
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }
        return Err(HttpError::Transfer(e).into());
    }

    // A 200 with an empty body never invokes the write callback; the
    // contract still promises a file at the returned path.
    if file.is_none() {
        file = Some(File::create(path).map_err(|source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        })?);
    }

    // Flush buffered bytes; treat a flush failure like any other write failure.
    if let Some(f) = &mut file {
        if let Err(source) = f.flush() {
            if let Err(rm) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %rm, "failed to remove partial download");
            }
            return Err(DownloadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    Ok(())
}
