use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tableside_archive::DEFAULT_MAX_UPLOAD_BYTES;
use tableside_auth::DEFAULT_TTL_SECS;

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub raports_root: PathBuf,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub max_upload_bytes: usize,
    pub admin_login: String,
    pub admin_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: PathBuf::from("tableside.sqlite"),
            raports_root: PathBuf::from("raports"),
            token_secret: "change-me".to_string(),
            token_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            admin_login: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_string("TABLESIDE_BIND", &defaults.bind_addr),
            db_path: PathBuf::from(env_string(
                "TABLESIDE_DB_PATH",
                &defaults.db_path.display().to_string(),
            )),
            raports_root: PathBuf::from(env_string(
                "TABLESIDE_RAPORTS_ROOT",
                &defaults.raports_root.display().to_string(),
            )),
            token_secret: env_string("TABLESIDE_TOKEN_SECRET", &defaults.token_secret),
            token_ttl: Duration::from_secs(env_u64("TABLESIDE_TOKEN_TTL_SECS", DEFAULT_TTL_SECS)),
            max_upload_bytes: env_usize("TABLESIDE_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            admin_login: env_string("ADMIN_LOGIN", &defaults.admin_login),
            admin_password: env_string("ADMIN_PASSWORD", &defaults.admin_password),
        }
    }
}

pub fn validate_startup_config(config: &ServerConfig) -> Result<(), String> {
    if config.token_secret.trim().is_empty() {
        return Err("token secret must not be empty".to_string());
    }
    if config.token_ttl.is_zero() {
        return Err("token ttl must be > 0".to_string());
    }
    if config.max_upload_bytes == 0 {
        return Err("upload limit must be > 0".to_string());
    }
    if config.bind_addr.trim().is_empty() {
        return Err("bind address must not be empty".to_string());
    }
    Ok(())
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

pub fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
