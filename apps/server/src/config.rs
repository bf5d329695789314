//! Server configuration.
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. an optional `config.{toml,yaml,json}` file (or an explicit path)
//! 3. `.env` in the working directory, loaded into the process environment
//! 4. environment variables prefixed with `HOMESTEAD__`, e.g.
//!    `HOMESTEAD__DATABASE__URL` or `HOMESTEAD__AUTH__ENABLED`

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub cdn: CdnConfig,
    pub uploads: UploadConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_request_body_size: 50 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Empty selects the in-memory store.
    pub url: String,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_min_size: 1,
            pool_max_size: 10,
            pool_timeout_seconds: 30,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily, hourly, minutely or never
    pub file_rotation: String,
    pub service_name: String,
    pub service_version: Option<String>,
    pub deployment_environment: String,
    pub opentelemetry_enabled: bool,
    pub otlp_endpoint: String,
    pub otlp_timeout_seconds: u64,
    pub trace_sample_ratio: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "homestead".to_string(),
            file_rotation: "daily".to_string(),
            service_name: "homestead".to_string(),
            service_version: None,
            deployment_environment: "development".to_string(),
            opentelemetry_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            otlp_timeout_seconds: 10,
            trace_sample_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// Reject requests without a bearer token even on public routes.
    pub required: bool,
    pub public_paths: Vec<String>,
    /// Role claim value granting admin rights.
    pub admin_role: String,
    /// Subjects treated as admins regardless of their claims.
    pub admin_subjects: Vec<String>,
    pub oidc: OidcConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            required: false,
            public_paths: Vec::new(),
            admin_role: "admin".to_string(),
            admin_subjects: Vec::new(),
            oidc: OidcConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfig {
    pub issuer_url: Option<String>,
    pub audience: Option<String>,
    /// Skip discovery and fetch keys from here.
    pub jwks_url: Option<String>,
    /// HS256 shared secret. When set, tokens are verified with it instead
    /// of the provider's JWKS.
    pub shared_secret: Option<String>,
    pub http_timeout_seconds: u64,
    pub jwks_cache_ttl_seconds: u64,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            issuer_url: None,
            audience: None,
            jwks_url: None,
            shared_secret: None,
            http_timeout_seconds: 5,
            jwks_cache_ttl_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub folder: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: "real-estate".to_string(),
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl CdnConfig {
    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub max_files: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024,
            max_files: 10,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: u64,
    /// Cap on `limit`; unset accepts any page size.
    pub max_page_size: Option<u64>,
    pub featured_page_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: homestead_query::DEFAULT_PAGE_SIZE,
            max_page_size: None,
            featured_page_size: 6,
        }
    }
}

impl SearchConfig {
    pub fn normalizer_options(&self) -> homestead_query::NormalizerOptions {
        homestead_query::NormalizerOptions {
            default_limit: self.default_page_size,
            max_limit: self.max_page_size,
        }
    }
}

impl Config {
    /// Load configuration from `config.*` in the working directory and the
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file name
    /// when given. An explicit path must exist.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        // Missing .env is fine; malformed is reported by the env source below.
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let loaded = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("HOMESTEAD")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("auth.public_paths")
                    .with_list_parse_key("auth.admin_subjects")
                    .with_list_parse_key("uploads.allowed_mime_types")
                    .try_parsing(true),
            )
            .build()?;

        Ok(loaded.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.database.pool_max_size == 0 {
            return Err("database.pool_max_size must be greater than 0".to_string());
        }
        if self.database.pool_min_size > self.database.pool_max_size {
            return Err(format!(
                "database.pool_min_size ({}) exceeds database.pool_max_size ({})",
                self.database.pool_min_size, self.database.pool_max_size
            ));
        }
        if !(0.0..=1.0).contains(&self.logging.trace_sample_ratio) {
            return Err("logging.trace_sample_ratio must be between 0.0 and 1.0".to_string());
        }
        if self.search.default_page_size == 0 {
            return Err("search.default_page_size must be greater than 0".to_string());
        }
        if let Some(max) = self.search.max_page_size {
            if max < self.search.default_page_size {
                return Err(format!(
                    "search.max_page_size ({max}) is smaller than search.default_page_size ({})",
                    self.search.default_page_size
                ));
            }
        }
        if self.uploads.max_files == 0 {
            return Err("uploads.max_files must be greater than 0".to_string());
        }
        if self.uploads.max_file_size_bytes > self.server.max_request_body_size {
            return Err(
                "uploads.max_file_size_bytes exceeds server.max_request_body_size".to_string(),
            );
        }
        if self.auth.enabled
            && self.auth.oidc.shared_secret.is_none()
            && self.auth.oidc.issuer_url.is_none()
            && self.auth.oidc.jwks_url.is_none()
        {
            return Err(
                "auth is enabled but neither auth.oidc.shared_secret, auth.oidc.issuer_url nor auth.oidc.jwks_url is set"
                    .to_string(),
            );
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow::anyhow!("could not resolve listen address {addr}"))
    }
}
