//! `rdvitals unzip` / `rdvitals extract` – unpack level packages.

use std::path::Path;

use anyhow::Result;
use rdvitals_core::{bulk, unzip_level, HttpOptions};

pub async fn run_unzip(
    opts: &HttpOptions,
    url: &str,
    dir: &Path,
    subfolder: bool,
) -> Result<()> {
    let path = bulk::download_unzip_async(opts, url, dir, subfolder, None).await?;
    println!("{}", path.display());
    Ok(())
}

pub fn run_extract(input: &Path, output: &Path) -> Result<()> {
    unzip_level(input, output)?;
    println!("{}", output.display());
    Ok(())
}
