use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocketConfig {
    /// Read-ahead buffer size of each buffered socket.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Initial capacity of growable line buffers.
    #[serde(default = "default_line_buffer_size")]
    pub line_buffer_size: usize,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SocketConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            line_buffer_size: default_line_buffer_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_buffer_size() -> usize {
    4096
}

fn default_line_buffer_size() -> usize {
    1024
}

fn default_timeout_ms() -> u64 {
    60_000
}
