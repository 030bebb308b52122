// Configuration module entry point
// Manages application configuration and the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::logger;

// Re-export public types
pub use state::AppState;
pub use types::{
    AddonsConfig, Config, HttpsOptionsConfig, LoggingConfig, NeteaseConfig, ResourcePathConfig,
    ServerConfig,
};

impl Config {
    /// Load configuration from the default `config.json`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config.json")
    }

    /// Load configuration from the given JSON file. A missing file falls
    /// back to defaults; `PORT` and `HTTPS_PORT` environment variables
    /// override the file in either case.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::new(config_path, config::FileFormat::Json).required(false))
            .set_default("server.port", 8080)?
            .set_default("server.https_port", 8443)?
            .set_default("server.enable_https", false)?
            .set_default("server.redirect_http_to_https", false)?
            .set_default("resource_path.not_found_page", "page/404.html")?
            .set_default("resource_path.view_page", "page/view.html")?
            .set_default("resource_path.index_page", "page/index.html")?
            .set_default("resource_path.archive", "archive")?
            .set_default("addons.netease.uid", 76_980_626)?
            .set_default("addons.netease.expire_time_secs", 14_400)?
            .set_default("logging.access_log", true)?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Hosting platforms assign the port through the environment, so
    /// `PORT` and `HTTPS_PORT` take precedence over the config file.
    fn apply_env_overrides(&mut self) {
        if let Some(port) = env_port("PORT") {
            self.server.port = port;
        }
        if let Some(port) = env_port("HTTPS_PORT") {
            self.server.https_port = port;
        }
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.server.port))
    }

    pub fn https_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.server.https_port))
    }
}

fn env_port(name: &str) -> Option<u16> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(port) => Some(port),
        Err(_) => {
            logger::log_warning(&format!("Ignoring invalid {name} value '{raw}'"));
            None
        }
    }
}
