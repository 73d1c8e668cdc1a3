use std::io;
use thiserror::Error;

/// Errors raised by the buffered socket stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    #[error("Memory allocation failed")]
    AllocationFailure,

    #[error("Line too long: {len} bytes read without a newline")]
    LineTooLong { len: usize },

    #[error("No data within timeout")]
    Timeout,

    #[error("No more data on socket")]
    EndOfStream,

    #[error("Transport stalled after {written} of {expected} bytes")]
    WriteZero { written: u64, expected: u64 },

    #[error("Failed to open {path}: {reason}")]
    FileOpen { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for SocketError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SocketError::Timeout,
            io::ErrorKind::UnexpectedEof => SocketError::EndOfStream,
            _ => SocketError::Io(err.to_string()),
        }
    }
}

/// Errors raised by the DNS wire codec, transport and resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("Memory allocation failed")]
    AllocationFailure,

    #[error("Bad DNS name record")]
    BadNameRecord,

    #[error("Bad DNS response")]
    BadResponse,

    #[error("No response to DNS datagram query")]
    NoDatagramResponse,

    #[error("Truncated DNS datagram response")]
    TruncatedResponse,

    #[error("DNS recursion not available")]
    RecursionNotAvailable,

    #[error("Domain not found (NXDOMAIN)")]
    DomainNotFound,

    #[error("DNS format error")]
    FormatError,

    #[error("DNS server failure")]
    ServerFailure,

    #[error("DNS query not supported")]
    NotSupported,

    #[error("DNS query refused")]
    Refused,

    #[error("Maximum DNS query depth {max_depth} exceeded ('{name}')")]
    MaxDepthExceeded { name: String, max_depth: u32 },

    #[error("DNS name not found")]
    NotFound,

    #[error("Failed to open {path}: {reason}")]
    FileOpen { path: String, reason: String },

    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Transport error talking to {server}: {reason}")]
    Transport { server: String, reason: String },

    #[error("Timeout waiting for {server}")]
    Timeout { server: String },
}

impl DnsError {
    /// Maps a non-zero RCODE from a response header to its error.
    pub fn from_rcode(rcode: u8) -> Self {
        match rcode {
            1 => DnsError::FormatError,
            2 => DnsError::ServerFailure,
            3 => DnsError::DomainNotFound,
            4 => DnsError::NotSupported,
            5 => DnsError::Refused,
            _ => DnsError::BadResponse,
        }
    }

    /// Fatal errors abort a recursive walk instead of moving to the next candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DnsError::DomainNotFound | DnsError::MaxDepthExceeded { .. }
        )
    }

    pub fn transport(server: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DnsError::Timeout {
                server: server.to_string(),
            },
            _ => DnsError::Transport {
                server: server.to_string(),
                reason: err.to_string(),
            },
        }
    }
}
