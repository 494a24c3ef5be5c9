//! Configuration management for PDF Sorter
//!
//! Read once from the environment at startup; nothing is reloadable.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per session
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Key for signing session cookies
    pub secret: String,
    /// Idle time after which a session directory is swept
    pub retention: Duration,
    /// Time between sweeps
    pub sweep_interval: Duration,
}

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RETENTION_HOURS: u64 = 72;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_MB: usize = 100;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                max_upload_bytes: megabytes(DEFAULT_MAX_UPLOAD_MB),
            },
            storage: StorageConfig {
                base_dir: PathBuf::from("./pdfs"),
            },
            session: SessionConfig {
                secret: random_secret(),
                retention: hours(DEFAULT_RETENTION_HOURS),
                sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!(
                    "SESSION_SECRET is not set; using a random secret, sessions will not survive a restart"
                );
                random_secret()
            }
        };

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", DEFAULT_PORT),
                max_upload_bytes: megabytes(parse_var("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)),
            },
            storage: StorageConfig {
                base_dir: env::var("PDF_STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./pdfs")),
            },
            session: SessionConfig {
                secret,
                retention: hours(parse_var("SESSION_RETENTION_HOURS", DEFAULT_RETENTION_HOURS)),
                sweep_interval: Duration::from_secs(
                    parse_var("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS).max(1),
                ),
            },
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using {}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}

/// Megabytes to bytes, saturating at `usize::MAX`
fn megabytes(mb: usize) -> usize {
    mb.saturating_mul(1024 * 1024)
}

/// Hours to a duration, saturating at `u64::MAX` seconds
fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}
