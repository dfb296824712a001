// Configuration module entry point
// Loads layered configuration and owns the runtime state

mod allowlist;
mod state;
mod types;

use std::net::SocketAddr;

pub use allowlist::Allowlist;
pub use state::AppState;
pub use types::{
    Config, CorsConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    StorageBackend, StorageConfig,
};

/// Environment variable carrying the origin allowlist as a JSON array
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("GATEWAY").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("cors.allowed_origins", "[]")?
            .set_default("storage.backend", "memory")?
            .set_default("storage.root", "./data")?
            .set_override_option(
                "cors.allowed_origins",
                std::env::var(ALLOWED_ORIGINS_ENV).ok(),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
