//! Call OMDb directly and print the raw fields it returns.
//! Usage:
//!   cargo run --bin omdb_props -- search <title words...>
//!   cargo run --bin omdb_props -- id <imdb_id>
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::str::FromStr;

const OMDB_BASE: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Copy, PartialEq)]
enum LookupKind {
    Search,
    Id,
}

impl FromStr for LookupKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "search" => Ok(LookupKind::Search),
            "id" => Ok(LookupKind::Id),
            _ => Err(anyhow::anyhow!("lookup kind must be 'search' or 'id'")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let api_key = env::var("OMDB_API_KEY").context("Missing OMDB_API_KEY in environment")?;
    let base = env::var("OMDB_BASE_URL").unwrap_or_else(|_| OMDB_BASE.to_string());

    let mut args = env::args().skip(1);
    let kind: LookupKind = args
        .next()
        .context("usage: omdb_props <search|id> <value>")?
        .parse()?;
    let value = args.collect::<Vec<_>>().join(" ");
    if value.trim().is_empty() {
        anyhow::bail!("usage: omdb_props <search|id> <value>");
    }

    let param = match kind {
        LookupKind::Search => "s",
        LookupKind::Id => "i",
    };
    let url = format!(
        "{base}?{param}={}&apikey={}",
        urlencoding::encode(value.trim()),
        urlencoding::encode(&api_key)
    );

    let body: Value = Client::new()
        .get(&url)
        .send()
        .await
        .context("Failed to call OMDb")?
        .error_for_status()
        .context("OMDb returned an error status")?
        .json()
        .await
        .context("Failed to parse OMDb response")?;

    match kind {
        LookupKind::Search => {
            let hits = body
                .get("Search")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            if hits.is_empty() {
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }
            for hit in hits {
                println!("{}", serde_json::to_string(&hit)?);
            }
        }
        LookupKind::Id => {
            let fields = body
                .as_object()
                .context("OMDb response is not a JSON object")?;
            for (name, value) in fields {
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}
