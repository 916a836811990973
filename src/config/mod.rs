// Configuration module entry point
// Loads configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, LIGHTUP_PATH};
pub use types::Config;

/// Environment variable naming the config file (without extension)
pub const CONFIG_PATH_ENV: &str = "BOM_LOCATOR_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the path in `BOM_LOCATOR_CONFIG`, or "config"
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `BOM_*` environment variables override it
    /// (`BOM_SERVER__PORT=8080`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("BOM").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.api_host", "127.0.0.1")?
            .set_default("server.api_port", 5001)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 1024)?
            .set_default("http.server_name", "bom-locator")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("catalog.components_file", "components.json")?
            .set_default("bom.file", "InteractiveBOM.html")?
            .set_default("bom.patch_console_log", true)?
            .set_default("serial.baud_rate", i64::from(crate::serial::DEFAULT_BAUD_RATE))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn get_api_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.api_host, self.server.api_port)
            .parse()
            .map_err(|e| format!("Invalid API address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load_from("definitely-missing-bom-locator-config").unwrap();
        assert_eq!(config.get_socket_addr().unwrap().port(), 5000);
        assert_eq!(config.get_api_socket_addr().unwrap().port(), 5001);
        assert_eq!(config.catalog.components_file, "components.json");
        assert_eq!(config.bom.file, "InteractiveBOM.html");
        assert!(config.bom.patch_console_log);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert!(config.health.enabled);
        assert_eq!(config.performance.max_connections, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locator.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[catalog]\ncomponents_file = \"parts.json\"\n\n[serial]\nbaud_rate = 9600\n\n[health]\nenabled = false"
        )
        .unwrap();

        let stem = dir.path().join("locator");
        let config = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(config.catalog.components_file, "parts.json");
        assert_eq!(config.serial.baud_rate, 9600);
        assert!(!config.health.enabled);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut config = Config::load_from("definitely-missing-bom-locator-config").unwrap();
        config.server.host = "not a host".to_string();
        assert!(config.get_socket_addr().is_err());
    }
}
