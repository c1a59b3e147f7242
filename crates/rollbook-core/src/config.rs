//! Configuration module
//!
//! Env-driven configuration for the API binary. Storage and face-analysis
//! collaborators receive their settings explicitly through constructors;
//! nothing reads the environment after startup.

use std::env;

use crate::validation::DEFAULT_MAX_UPLOAD_BYTES;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;

/// Which object storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

impl StorageBackendKind {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            other => anyhow::bail!("unknown STORAGE_BACKEND '{other}' (expected 's3' or 'local')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,

    pub storage_backend: StorageBackendKind,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// CDN base URL for public file links; falls back to backend URLs.
    pub cdn_base_url: Option<String>,

    /// AWS region for the face-analysis service.
    pub aws_region: Option<String>,

    pub max_upload_bytes: usize,
    pub signed_url_ttl_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_opt("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => StorageBackendKind::parse(&raw)?,
            None => StorageBackendKind::S3,
        };

        let cors_origins = env_opt("CORS_ORIGINS")
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            cors_origins,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            cdn_base_url: env_opt("CDN_BASE_URL"),
            aws_region: env_opt("AWS_REGION").or_else(|| env_opt("S3_REGION")),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            signed_url_ttl_secs: env_parse("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS)?,
        })
    }
}
