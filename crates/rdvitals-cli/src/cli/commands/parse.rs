//! `rdvitals parse` – decode a level and print its JSON document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rdvitals_core::{bulk, decode_level, parse_rdzip, HttpOptions, Level};

pub async fn run_parse(opts: &HttpOptions, target: &str, two_player: bool) -> Result<()> {
    let doc: Level = if target.starts_with("http://") || target.starts_with("https://") {
        bulk::parse_url_async(opts, target, two_player, None).await?
    } else if target.ends_with(".rdlevel") {
        let text = fs::read_to_string(Path::new(target))
            .with_context(|| format!("failed to read {target}"))?;
        decode_level(&text)?
    } else {
        parse_rdzip(Path::new(target), two_player)?
    };

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
