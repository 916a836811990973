// Configuration schema
// One struct per section of the config file; defaults live in `Config::load_from`

use serde::Deserialize;

/// Process configuration, shared read-only by both listeners
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
    pub bom: BomConfig,
    pub serial: SerialConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Listener addresses
///
/// `host:port` serves the BOM viewer, `api_host:api_port` the component manager.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_host: String,
    pub api_port: u16,
    /// Tokio worker threads; Tokio's default when unset
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`
    pub level: String,
    pub access_log: bool,
    /// `combined`, `common`, `json`, or a `$variable` pattern
    pub access_log_format: String,
    /// stdout when unset
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// stderr when unset
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling; timeouts in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Per listener; unlimited when unset
    pub max_connections: Option<usize>,
    pub backlog: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` header
    pub server_name: String,
    pub enable_cors: bool,
    /// Largest accepted request body in bytes
    pub max_body_size: u64,
}

/// Component lookup table location
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub components_file: String,
}

/// Interactive BOM page served by the viewer
#[derive(Debug, Deserialize, Clone)]
pub struct BomConfig {
    pub file: String,
    /// Rewrite the page's click logging to include the package
    pub patch_console_log: bool,
}

/// Serial link settings handed to the browser
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
}

/// Liveness and readiness probes, answered on both listeners
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub liveness_path: String,
    pub readiness_path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            liveness_path: "/healthz".to_string(),
            readiness_path: "/readyz".to_string(),
        }
    }
}
