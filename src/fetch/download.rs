// src/fetch/download.rs
use anyhow::{Context, Result};
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Open a streaming GET over `url_str` and return the body as a reader.
///
/// Uses the blocking client so the body can feed a synchronous
/// decompress/parse chain; call from a blocking context, not from an
/// async worker. The client timeout is disabled since a full month of
/// trip data takes well over the default 30s.
pub fn open(url_str: &str) -> Result<impl Read> {
    let url = Url::parse(url_str).with_context(|| format!("invalid URL {url_str}"))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .build()
        .context("building HTTP client")?;

    let resp = client
        .get(url.as_str())
        .send()
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;

    Ok(resp)
}
