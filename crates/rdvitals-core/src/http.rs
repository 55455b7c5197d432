//! HTTP plumbing shared by the probe, download, and API modules.
//!
//! Uses the curl crate (libcurl) with one Easy handle per request. All
//! functions here are blocking; call from `spawn_blocking` when used from
//! async code (see `bulk`). There is no ambient global client: every call
//! takes an explicitly constructed [`HttpOptions`].

use std::str;
use std::time::Duration;

use thiserror::Error;

/// Options applied to every outgoing request.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// User-Agent header value.
    pub user_agent: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Maximum redirects to follow.
    pub max_redirects: u32,
}

impl Default for HttpOptions {
    fn default() -> Self {
        crate::config::RdvitalsConfig::default().http_options()
    }
}

/// Error from a single HTTP request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// libcurl reported an error (bad URL, timeout, connection, TLS, ...).
    #[error("request failed: {0}")]
    Transfer(#[from] curl::Error),
    /// The response had a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u32 },
}

/// Result of a HEAD probe: the headers needed to name a download.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// `Content-Length` if present.
    pub content_length: Option<u64>,
    /// `Content-Disposition` if present (filename hint).
    pub content_disposition: Option<String>,
    /// Effective URL after redirects.
    pub final_url: String,
}

/// Apply shared options to an Easy handle and set the URL.
pub(crate) fn configure(
    easy: &mut curl::easy::Easy,
    opts: &HttpOptions,
    url: &str,
) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.useragent(&opts.user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirects)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    Ok(())
}

/// Performs a HEAD request and returns the headers needed to resolve a
/// filename. Follows redirects; `final_url` reflects where they landed.
pub fn probe(opts: &HttpOptions, url: &str) -> Result<ProbeResult, HttpError> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, opts, url)?;
    easy.nobody(true)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(HttpError::Status {
            url: url.to_string(),
            status: code,
        });
    }

    let final_url = easy
        .effective_url()?
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string());

    Ok(parse_probe_headers(&lines, final_url))
}

/// Parse collected header lines into a ProbeResult.
fn parse_probe_headers(lines: &[String], final_url: String) -> ProbeResult {
    let mut content_length = None;
    let mut content_disposition = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                content_disposition = Some(value.to_string());
            }
        }
    }

    ProbeResult {
        content_length,
        content_disposition,
        final_url,
    }
}

/// GET a URL and return the body as a UTF-8 string (lossy). For small API
/// responses only; downloads stream to disk instead (see `download`).
pub fn get_string(opts: &HttpOptions, url: &str) -> Result<String, HttpError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, opts, url)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(HttpError::Status {
            url: url.to_string(),
            status: code,
        });
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_probe_headers_basic() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 314311".to_string(),
            "Content-Disposition: attachment; filename=\"level.rdzip\"".to_string(),
        ];
        let r = parse_probe_headers(&lines, "https://example.com/x".to_string());
        assert_eq!(r.content_length, Some(314311));
        assert_eq!(
            r.content_disposition.as_deref(),
            Some("attachment; filename=\"level.rdzip\"")
        );
    }

    #[test]
    fn parse_probe_headers_missing_disposition() {
        let lines = ["HTTP/1.1 200 OK".to_string()];
        let r = parse_probe_headers(&lines, "https://example.com/x".to_string());
        assert!(r.content_length.is_none());
        assert!(r.content_disposition.is_none());
        assert_eq!(r.final_url, "https://example.com/x");
    }
}
