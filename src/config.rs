use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::omdb::OMDB_BASE;

const DEFAULT_FAVORITES_PATH: &str = "favorites.json";
const DEFAULT_ADDR: &str = "127.0.0.1:3147";

/// Variables that must be present before the server starts.
pub const REQUIRED_ENV: [&str; 1] = ["OMDB_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub favorites_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let omdb_api_key = env::var("OMDB_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("OMDB_API_KEY must be set")?;
        let omdb_base_url = optional_var("OMDB_BASE_URL").unwrap_or_else(|| OMDB_BASE.to_string());
        let favorites_path = optional_var("FAVORITES_PATH")
            .unwrap_or_else(|| DEFAULT_FAVORITES_PATH.to_string())
            .into();
        let addr = optional_var("CINESEARCH_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .with_context(|| format!("CINESEARCH_ADDR is not a socket address: {}", addr))?;
        Ok(Self {
            omdb_api_key,
            omdb_base_url,
            favorites_path,
            bind_addr,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}
