use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_REDIS_KEY_PREFIX: &str = "resume-builder:";
const DEFAULT_RASTERIZER_BIN: &str = "wkhtmltoimage";

/// Where resume collections are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File { data_dir: PathBuf },
    Redis { url: String, key_prefix: String },
}

impl StorageBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File { .. } => "file",
            StorageBackend::Redis { .. } => "redis",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub rasterizer_bin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key)
                .map(str::to_string)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let storage_backend = match get("STORAGE_BACKEND").unwrap_or("file") {
            "memory" => StorageBackend::Memory,
            "file" => StorageBackend::File {
                data_dir: PathBuf::from(get("DATA_DIR").unwrap_or(DEFAULT_DATA_DIR)),
            },
            "redis" => StorageBackend::Redis {
                url: require("REDIS_URL")?,
                key_prefix: get("REDIS_KEY_PREFIX")
                    .unwrap_or(DEFAULT_REDIS_KEY_PREFIX)
                    .to_string(),
            },
            other => bail!("STORAGE_BACKEND must be one of file, redis, memory (got '{other}')"),
        };

        Ok(Config {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            port: match get("PORT") {
                Some(port) => port
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => DEFAULT_PORT,
            },
            rust_log: get("RUST_LOG").unwrap_or("info").to_string(),
            storage_backend,
            rasterizer_bin: get("RASTERIZER_BIN")
                .unwrap_or(DEFAULT_RASTERIZER_BIN)
                .to_string(),
        })
    }
}
