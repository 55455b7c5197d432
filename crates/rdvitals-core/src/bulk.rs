//! Async entry points and bounded bulk fan-out.
//!
//! The download path is blocking (libcurl Easy handles), so the async
//! variants run it on the blocking thread pool via `spawn_blocking`; the
//! semantics are identical to the blocking calls. Bulk fan-out caps
//! concurrency with a semaphore instead of spawning one task per URL
//! unbounded.
//!
//! Note that collision-safe naming is not serialized across concurrent
//! downloads: two tasks racing on the same desired name in one directory
//! can, rarely, pick the same suffix. Callers that need a guarantee must
//! serialize their allocations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::archive::{download_unzip, AcquireError};
use crate::control::AbortFlag;
use crate::download::{download_level, DownloadError};
use crate::http::HttpOptions;
use crate::level::{parse_url, Level, PackageError};
use crate::sheet::{get_setlist_urls, get_sheet_data, SheetError};

/// Unwraps a blocking-task join result, forwarding panics.
fn join<T>(result: Result<T, JoinError>) -> T {
    match result {
        Ok(value) => value,
        Err(join_err) => std::panic::resume_unwind(join_err.into_panic()),
    }
}

/// Async [`download_level`]: same contract, run on the blocking pool.
pub async fn download_level_async(
    opts: &HttpOptions,
    url: &str,
    dir: &Path,
    filename: Option<&str>,
    abort: Option<&AbortFlag>,
) -> Result<PathBuf, DownloadError> {
    let opts = opts.clone();
    let url = url.to_string();
    let dir = dir.to_path_buf();
    let filename = filename.map(str::to_string);
    let abort = abort.cloned();

    join(
        tokio::task::spawn_blocking(move || {
            download_level(&opts, &url, &dir, filename.as_deref(), abort.as_ref())
        })
        .await,
    )
}

/// Async [`download_unzip`]: same contract, run on the blocking pool.
pub async fn download_unzip_async(
    opts: &HttpOptions,
    url: &str,
    output_dir: &Path,
    create_subfolder: bool,
    abort: Option<&AbortFlag>,
) -> Result<PathBuf, AcquireError> {
    let opts = opts.clone();
    let url = url.to_string();
    let output_dir = output_dir.to_path_buf();
    let abort = abort.cloned();

    join(
        tokio::task::spawn_blocking(move || {
            download_unzip(&opts, &url, &output_dir, create_subfolder, abort.as_ref())
        })
        .await,
    )
}

/// Async [`parse_url`]: same contract, run on the blocking pool.
pub async fn parse_url_async(
    opts: &HttpOptions,
    url: &str,
    two_player: bool,
    abort: Option<&AbortFlag>,
) -> Result<Level, PackageError> {
    let opts = opts.clone();
    let url = url.to_string();
    let abort = abort.cloned();

    join(
        tokio::task::spawn_blocking(move || parse_url(&opts, &url, two_player, abort.as_ref()))
            .await,
    )
}

/// Async [`get_sheet_data`]: same contract, run on the blocking pool.
pub async fn get_sheet_data_async(
    opts: &HttpOptions,
    verified_only: bool,
) -> Result<Vec<serde_json::Value>, SheetError> {
    let opts = opts.clone();

    join(tokio::task::spawn_blocking(move || get_sheet_data(&opts, verified_only)).await)
}

/// Async [`get_setlist_urls`]: same contract, run on the blocking pool.
pub async fn get_setlist_urls_async(
    opts: &HttpOptions,
    keep_none: bool,
    trim_none: bool,
) -> Result<serde_json::Map<String, serde_json::Value>, SheetError> {
    let opts = opts.clone();

    join(
        tokio::task::spawn_blocking(move || get_setlist_urls(&opts, keep_none, trim_none)).await,
    )
}

/// Downloads many levels into `dir` with at most `max_concurrent` in
/// flight at once. Results come back in input order, one per URL; a
/// failure for one URL does not stop the others. A shared `abort` flag
/// cancels every download still in flight.
pub async fn download_many(
    opts: &HttpOptions,
    urls: &[String],
    dir: &Path,
    max_concurrent: usize,
    abort: Option<&AbortFlag>,
) -> Vec<Result<PathBuf, DownloadError>> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let semaphore = Arc::clone(&semaphore);
        let opts = opts.clone();
        let url = url.clone();
        let dir = dir.to_path_buf();
        let abort = abort.cloned();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            join(
                tokio::task::spawn_blocking(move || {
                    download_level(&opts, &url, &dir, None, abort.as_ref())
                })
                .await,
            )
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(join(handle.await));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_opts() -> HttpOptions {
        HttpOptions {
            user_agent: "rdvitals-test".into(),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(2),
            max_redirects: 2,
        }
    }

    #[tokio::test]
    async fn async_download_failure_matches_blocking_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_level_async(
            &local_opts(),
            "http://127.0.0.1:9/level.rdzip",
            dir.path(),
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DownloadError::Http(_)));
        assert!(!dir.path().join("level.rdzip").exists());
    }

    #[tokio::test]
    async fn download_many_returns_one_result_per_url_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            "http://127.0.0.1:9/a.rdzip".to_string(),
            "http://127.0.0.1:9/b.rdzip".to_string(),
            "http://127.0.0.1:9/c.rdzip".to_string(),
        ];
        let results = download_many(&local_opts(), &urls, dir.path(), 2, None).await;
        assert_eq!(results.len(), 3);
        for result in results {
            assert!(matches!(result, Err(DownloadError::Http(_))));
        }
    }

    #[tokio::test]
    async fn async_sheet_failure_matches_blocking_semantics() {
        // A 1ms deadline fails the transfer during connect/DNS, so the
        // wrapper's error path is exercised without real network traffic.
        let opts = HttpOptions {
            connect_timeout: Duration::from_millis(1),
            timeout: Duration::from_millis(1),
            ..local_opts()
        };
        let err = get_sheet_data_async(&opts, false).await.unwrap_err();
        assert!(matches!(err, SheetError::Http(_)));

        let err = get_setlist_urls_async(&opts, false, true).await.unwrap_err();
        assert!(matches!(err, SheetError::Http(_)));
    }

    #[tokio::test]
    async fn download_many_with_no_urls_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let results = download_many(&local_opts(), &[], dir.path(), 4, None).await;
        assert!(results.is_empty());
    }
}
