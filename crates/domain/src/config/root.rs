use serde::{Deserialize, Serialize};

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::socket::SocketConfig;

/// Main configuration structure for mailnet
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Server paths
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolver and DNS transport settings
    #[serde(default)]
    pub dns: DnsConfig,

    /// Buffered socket settings
    #[serde(default)]
    pub socket: SocketConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. mailnet.toml in current directory
    /// 3. /etc/mailnet/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(root) = overrides.root_path {
            self.server.root_path = root;
        }
        if let Some(port) = overrides.dns_port {
            self.dns.port = port;
        }
        if let Some(timeout) = overrides.dns_timeout_ms {
            self.dns.timeout_ms = timeout;
        }
        if let Some(depth) = overrides.max_depth {
            self.dns.max_depth = depth;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.dns.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "DNS timeout cannot be 0".to_string(),
            ));
        }
        if self.dns.udp_retries == 0 {
            return Err(ConfigError::Validation(
                "At least one UDP attempt is required".to_string(),
            ));
        }
        if self.socket.buffer_size < 2 {
            return Err(ConfigError::Validation(format!(
                "Socket buffer size {} is too small",
                self.socket.buffer_size
            )));
        }
        if self.socket.line_buffer_size < 2 {
            return Err(ConfigError::Validation(format!(
                "Line buffer size {} is too small",
                self.socket.line_buffer_size
            )));
        }
        if self.socket.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Socket timeout cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("mailnet.toml").exists() {
            Some("mailnet.toml".to_string())
        } else if std::path::Path::new("/etc/mailnet/config.toml").exists() {
            Some("/etc/mailnet/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub root_path: Option<String>,
    pub dns_port: Option<u16>,
    pub dns_timeout_ms: Option<u64>,
    pub max_depth: Option<u32>,
    pub log_level: Option<String>,
}
