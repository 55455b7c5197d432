//! Filename resolution for level downloads.
//!
//! Derives a filesystem-safe name for an .rdzip either from the URL's last
//! path segment (when it already ends in `.rdzip`; no network needed) or
//! from a Content-Disposition header captured by the HEAD probe.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::extract_filename;
pub use path::rdzip_segment;
pub use sanitize::sanitize_filename;

use thiserror::Error;

/// Extension every level package carries.
pub const RDZIP_EXT: &str = ".rdzip";

/// Failure to derive a filename for a download. Never silently defaulted;
/// callers that want a fallback name must supply one explicitly.
#[derive(Debug, Error)]
pub enum FilenameError {
    /// URL does not end in `.rdzip` and no Content-Disposition header was sent.
    #[error("could not find Content-Disposition header for {url}")]
    MissingHeader { url: String },
    /// A Content-Disposition header was present but had no usable `filename=`.
    #[error("could not extract filename from Content-Disposition for {url}")]
    HeaderMismatch { url: String },
    /// The extracted name consisted entirely of characters illegal in
    /// filenames and sanitized down to nothing.
    #[error("filename for {url} sanitized to an empty string")]
    Unusable { url: String },
}

/// Resolves the filename for a level at `url`.
///
/// If the URL's last path segment (query string ignored) ends with
/// `.rdzip`, that segment is used verbatim apart from sanitization and no
/// header is consulted. Otherwise `content_disposition` is required.
///
/// Sanitization removes the characters Windows rejects in filenames
/// (`< > : " / \ | ? *`); nothing is substituted in their place, so the
/// result can shrink. A name that shrinks to empty is an error, keeping
/// the non-empty / no-path-separator invariant.
pub fn resolve_filename(
    url: &str,
    content_disposition: Option<&str>,
) -> Result<String, FilenameError> {
    let raw = match rdzip_segment(url) {
        Some(segment) => segment,
        None => {
            let header = content_disposition.ok_or_else(|| FilenameError::MissingHeader {
                url: url.to_string(),
            })?;
            extract_filename(header).ok_or_else(|| FilenameError::HeaderMismatch {
                url: url.to_string(),
            })?
        }
    };

    let name = sanitize_filename(&raw);
    if name.is_empty() {
        return Err(FilenameError::Unusable {
            url: url.to_string(),
        });
    }
    Ok(name)
}
