use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

const TABLE_TIMEOUT_SECS: u64 = 20;
const CONNECT_TIMEOUT_SECS: u64 = 5;

static TABLE_CLIENT: OnceCell<Client> = OnceCell::new();

fn table_client() -> Result<&'static Client> {
    TABLE_CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(concat!("xg_terminal/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TABLE_TIMEOUT_SECS))
            .build()
            .context("build table http client")
    })
}

/// Downloads a remote CSV or JSON table as text.
pub fn fetch_table(url: &str) -> Result<String> {
    let resp = table_client()?
        .get(url)
        .header(ACCEPT, "text/csv, application/json;q=0.9, */*;q=0.5")
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;
    resp.text().with_context(|| format!("read body of {url}"))
}
