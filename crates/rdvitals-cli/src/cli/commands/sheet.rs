//! `rdvitals sheet` / `rdvitals setlists` – query the community APIs.

use anyhow::Result;
use rdvitals_core::{bulk, HttpOptions};

pub async fn run_sheet(opts: &HttpOptions, verified: bool) -> Result<()> {
    let levels = bulk::get_sheet_data_async(opts, verified).await?;
    println!("{}", serde_json::to_string_pretty(&levels)?);
    Ok(())
}

pub async fn run_setlists(opts: &HttpOptions, keep_none: bool, trim: bool) -> Result<()> {
    let setlists = bulk::get_setlist_urls_async(opts, keep_none, trim).await?;
    println!("{}", serde_json::to_string_pretty(&setlists)?);
    Ok(())
}
