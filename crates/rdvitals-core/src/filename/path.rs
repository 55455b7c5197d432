//! Filename extraction from URL path.

use super::RDZIP_EXT;

/// Returns the URL's last path segment when it ends with `.rdzip`
/// (query string and fragment ignored), else `None`.
///
/// `None` means the URL alone cannot name the file and the caller must
/// fall back to response headers.
pub fn rdzip_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment.ends_with(RDZIP_EXT) {
        Some(segment.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdzip_url() {
        assert_eq!(
            rdzip_segment("https://example.com/a/b/level.rdzip").as_deref(),
            Some("level.rdzip")
        );
    }

    #[test]
    fn rdzip_url_with_query() {
        assert_eq!(
            rdzip_segment("https://example.com/level.rdzip?download=1").as_deref(),
            Some("level.rdzip")
        );
    }

    #[test]
    fn non_rdzip_url() {
        assert_eq!(rdzip_segment("https://drive.google.com/uc?export=download&id=1LZ5"), None);
        assert_eq!(rdzip_segment("https://example.com/level.zip"), None);
    }

    #[test]
    fn root_or_unparsable() {
        assert_eq!(rdzip_segment("https://example.com/"), None);
        assert_eq!(rdzip_segment("not a url"), None);
    }
}
