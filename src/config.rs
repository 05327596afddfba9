//! Runtime configuration read from the environment (and `.env`, if present).

use log::info;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ROOT: &str = "./files";
const DEFAULT_PREFIX: &str = "/";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("STORE_ROOT should not be empty")]
    EmptyRoot,

    #[error("STORE_PREFIX must start with '/': '{0}'")]
    BadPrefix(String),
}

/// Settings the request handlers need.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory of the store. Relative roots resolve per request.
    pub root_dir: PathBuf,
    pub path_prefix: String,
    /// Include failure details in 500 responses.
    pub verbose_errors: bool,
    pub max_body_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            root_dir: PathBuf::from(DEFAULT_ROOT),
            path_prefix: DEFAULT_PREFIX.to_string(),
            verbose_errors: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub tls: Option<TlsPaths>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup("STORE_ROOT").unwrap_or_else(|| DEFAULT_ROOT.to_string());
        if root.trim().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }
        let path_prefix = lookup("STORE_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if !path_prefix.starts_with('/') {
            return Err(ConfigError::BadPrefix(path_prefix));
        }

        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };
        let verbose_errors = match lookup("VERBOSE_ERRORS") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue {
                key: "VERBOSE_ERRORS",
                value: v,
            })?,
            None => true,
        };
        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue { key: "MAX_BODY_BYTES", value: v }),
            },
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let tls = match (lookup("CERT_PATH"), lookup("KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            _ => None,
        };

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            store: StoreConfig {
                root_dir: PathBuf::from(root),
                path_prefix,
                verbose_errors,
                max_body_bytes,
            },
            tls,
        };
        info!(
            "Serving '{}' under prefix '{}' (verbose errors: {})",
            config.store.root_dir.display(),
            config.store.path_prefix,
            config.store.verbose_errors
        );
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
