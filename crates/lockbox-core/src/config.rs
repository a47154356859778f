//! Configuration module
//!
//! Environment-driven configuration for the attachment service: backend
//! selection, local staging/durable paths, object-store settings and
//! processing limits. The core never reads configuration sources outside of
//! this module; everything else receives an already-built `Config`.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;
use crate::AppError;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1024;
const DEFAULT_PREVIEW_WIDTH: u32 = 320;

/// Object-store backend settings, passed opaquely to the storage factory.
#[derive(Clone, Debug, Default)]
pub struct S3Config {
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Optional object-key prefix. Trailing slashes are normalized away by
    /// the naming layer.
    pub prefix: String,
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub storage_backend: StorageBackend,
    /// Local directory where raw uploads are staged before processing.
    pub staging_path: String,
    /// Local directory holding encrypted durable copies (local backend only).
    pub durable_path: String,
    pub s3: S3Config,
    pub database_url: String,
    /// Originals wider than this are scaled down before persistence.
    pub max_image_width: u32,
    /// Target width for generated previews.
    pub preview_width: u32,
}

impl Config {
    /// Load configuration from environment variables, applying defaults for
    /// anything unset. `.env` files are honored when present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let storage_backend = StorageBackend::from_str(&get_env("LOCKBOX_STORAGE", "local"))
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(Config {
            server_port: get_env_parse("LOCKBOX_SERVER_PORT", DEFAULT_SERVER_PORT)?,
            storage_backend,
            staging_path: get_env("LOCKBOX_STAGING_PATH", "staging"),
            durable_path: get_env("LOCKBOX_VAULT_PATH", "vault"),
            s3: S3Config {
                endpoint: get_env_opt("LOCKBOX_S3_ENDPOINT"),
                bucket: get_env("LOCKBOX_S3_BUCKET", "lockbox"),
                region: get_env("LOCKBOX_S3_REGION", "us-east-1"),
                prefix: get_env("LOCKBOX_S3_PREFIX", ""),
                force_path_style: get_env_parse("LOCKBOX_S3_FORCE_PATH_STYLE", true)?,
                access_key_id: get_env_opt("AWS_ACCESS_KEY_ID"),
                secret_access_key: get_env_opt("AWS_SECRET_ACCESS_KEY"),
            },
            database_url: get_env("LOCKBOX_DATABASE_URL", "sqlite://lockbox.sqlite?mode=rwc"),
            max_image_width: get_env_parse("LOCKBOX_MAX_IMAGE_WIDTH", DEFAULT_MAX_IMAGE_WIDTH)?,
            preview_width: get_env_parse("LOCKBOX_PREVIEW_WIDTH", DEFAULT_PREVIEW_WIDTH)?,
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn get_env_parse<T: FromStr>(key: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| AppError::InvalidInput(format!("invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
