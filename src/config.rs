//! Gateway configuration, read from the process environment.

use std::{collections::HashMap, net::SocketAddr};

use thiserror::Error;

pub const DEFAULT_BUCKET: &str = "property-media";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// 200 MiB. Uploads are buffered whole, so this is the real ceiling.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing SUPABASE_URL or SUPABASE_SERVICE_ROLE in env")]
    MissingCredentials,

    #[error("Invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub service_role_key: String,
    pub bucket: String,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map; `from_env` delegates here.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (supabase_url, service_role_key) =
            match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_SERVICE_ROLE")) {
                (Some(url), Some(key)) => (url.trim_end_matches('/').to_string(), key),
                _ => return Err(ConfigError::MissingCredentials),
            };

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match non_empty("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let allowed_origins = non_empty("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            supabase_url,
            service_role_key,
            bucket: non_empty("BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_upload_bytes,
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: raw,
        })
    }
}
