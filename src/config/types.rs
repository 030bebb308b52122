// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub resource_path: ResourcePathConfig,
    pub addons: AddonsConfig,
    #[serde(default)]
    pub https_options: Option<HttpsOptionsConfig>,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub https_port: u16,
    pub enable_https: bool,
    pub redirect_http_to_https: bool,
}

/// Resource locations, relative to the server root
#[derive(Debug, Deserialize, Clone)]
pub struct ResourcePathConfig {
    /// 404 page template (contains the server-version placeholder)
    pub not_found_page: String,
    /// Archive view page template
    pub view_page: String,
    /// Page served for `/`
    pub index_page: String,
    /// Directory holding the article files
    pub archive: String,
}

/// Addon configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AddonsConfig {
    pub netease: NeteaseConfig,
}

/// External music service settings
#[derive(Debug, Deserialize, Clone)]
pub struct NeteaseConfig {
    pub uid: u64,
    /// Cache lifetime of the fetched record, in seconds
    pub expire_time_secs: u64,
}

/// Paths to the TLS credential files
#[derive(Debug, Deserialize, Clone)]
pub struct HttpsOptionsConfig {
    #[serde(default)]
    pub ca: Option<String>,
    pub key: String,
    pub cert: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    #[serde(default)]
    pub access_log_file: Option<String>,
    #[serde(default)]
    pub error_log_file: Option<String>,
}
