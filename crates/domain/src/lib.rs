//! mailnet domain layer: decoded DNS data, error kinds and configuration
pub mod config;
pub mod dns_answer;
pub mod dns_record;
pub mod errors;

pub use config::{
    CliOverrides, Config, ConfigError, DnsConfig, LoggingConfig, ServerConfig, SocketConfig,
};
pub use dns_answer::DnsAnswer;
pub use dns_record::{DnsRecord, RecordData, RecordType, SoaData, CLASS_IN};
pub use errors::{DnsError, SocketError};
