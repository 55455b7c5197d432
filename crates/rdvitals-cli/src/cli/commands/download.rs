//! `rdvitals download <url>...` – download levels into a directory.

use std::path::Path;

use anyhow::{bail, Result};
use rdvitals_core::{bulk, HttpOptions};

pub async fn run_download(
    opts: &HttpOptions,
    urls: &[String],
    dir: &Path,
    filename: Option<&str>,
    jobs: usize,
) -> Result<()> {
    if let Some(name) = filename {
        if urls.len() > 1 {
            bail!("--filename only makes sense with a single URL");
        }
        let path = bulk::download_level_async(opts, &urls[0], dir, Some(name), None).await?;
        println!("{}", path.display());
        return Ok(());
    }

    let results = bulk::download_many(opts, urls, dir, jobs, None).await;

    let mut failures = 0usize;
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(path) => println!("{}", path.display()),
            Err(err) => {
                failures += 1;
                tracing::error!(url, error = %err, "download failed");
                eprintln!("{url}: {err}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} downloads failed", urls.len());
    }
    Ok(())
}
