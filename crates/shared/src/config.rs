//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Cashflow query configuration.
    #[serde(default)]
    pub cashflow: CashflowConfig,
    /// Report document configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Identifiers used to keep internal transfers out of the cashflow.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CashflowConfig {
    /// Transaction type whose postings are never counted as flows.
    #[serde(default = "default_transfer_origin_id")]
    pub transfer_origin_id: i32,
    /// Voucher type whose records are never counted as flows.
    #[serde(default = "default_transfer_voucher_type_id")]
    pub transfer_voucher_type_id: i32,
}

fn default_transfer_origin_id() -> i32 {
    4
}

fn default_transfer_voucher_type_id() -> i32 {
    4
}

impl Default for CashflowConfig {
    fn default() -> Self {
        Self {
            transfer_origin_id: default_transfer_origin_id(),
            transfer_voucher_type_id: default_transfer_voucher_type_id(),
        }
    }
}

/// Rendered report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Name printed in document headers.
    #[serde(default = "default_enterprise_name")]
    pub enterprise_name: String,
}

fn default_enterprise_name() -> String {
    "Hospital".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enterprise_name: default_enterprise_name(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BHIMA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
