use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::server::ServerConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-attempt socket timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_udp_retries")]
    pub udp_retries: u32,

    /// Receive buffer for UDP replies; longer datagrams are cut by the kernel.
    #[serde(default = "default_max_udp_response")]
    pub max_udp_response: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_roots_file")]
    pub roots_file: String,
}

impl DnsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full path of the root hints file: server root path + roots file name.
    pub fn roots_path(&self, server: &ServerConfig) -> PathBuf {
        Path::new(&server.root_path).join(&self.roots_file)
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            udp_retries: default_udp_retries(),
            max_udp_response: default_max_udp_response(),
            max_depth: default_max_depth(),
            roots_file: default_roots_file(),
        }
    }
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    16_000
}

fn default_udp_retries() -> u32 {
    3
}

fn default_max_udp_response() -> usize {
    1024
}

fn default_max_depth() -> u32 {
    32
}

fn default_roots_file() -> String {
    "dnsroots".to_string()
}
