//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::http::CorsPolicy;

/// Upper bound for the per-request deadline.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 900;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// Log filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Per-request deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum buffered request payload
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// CORS allowed origins (comma-separated); empty echoes the request origin
    pub cors_origins: Option<String>,

    /// Value of `Access-Control-Allow-Methods` on pre-flight responses
    #[serde(default = "default_cors_allow_methods")]
    pub cors_allow_methods: String,

    /// Value of `Access-Control-Allow-Headers` on pre-flight responses
    #[serde(default = "default_cors_allow_headers")]
    pub cors_allow_headers: String,

    /// Value of `Access-Control-Max-Age` on pre-flight responses
    #[serde(default = "default_cors_max_age")]
    pub cors_max_age_secs: u64,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(self.host.clone()))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get CORS origins as a vector
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// CORS policy applied by the dispatcher
    pub fn cors_policy(&self) -> CorsPolicy {
        CorsPolicy::new()
            .with_origins(self.cors_origins_list())
            .with_allow_methods(self.cors_allow_methods.clone())
            .with_allow_headers(self.cors_allow_headers.clone())
            .with_max_age(self.cors_max_age_secs)
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_body_bytes == 0 {
            return Err(ValidationError::InvalidBodyLimit);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            cors_origins: None,
            cors_allow_methods: default_cors_allow_methods(),
            cors_allow_headers: default_cors_allow_headers(),
            cors_max_age_secs: default_cors_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,assistant_gateway=debug,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_cors_allow_methods() -> String {
    "GET, POST, PUT, DELETE, OPTIONS".to_string()
}

fn default_cors_allow_headers() -> String {
    "Content-Type, Authorization".to_string()
}

fn default_cors_max_age() -> u64 {
    86_400
}
