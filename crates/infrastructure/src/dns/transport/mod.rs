pub mod tcp;
pub mod udp;

use crate::dns::wire::DnsQuery;
use mailnet_domain::{DnsConfig, DnsError};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

pub const DNS_PORT: u16 = 53;
pub const DNS_SOCKET_TIMEOUT: Duration = Duration::from_millis(16_000);
pub const DNS_SEND_RETRIES: u32 = 3;
pub const MAX_UDP_RESPONSE_SIZE: usize = 1024;

/// Per-query network parameters shared by the UDP and TCP transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    pub port: u16,
    pub timeout: Duration,
    pub udp_retries: u32,
    pub max_udp_response: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            port: DNS_PORT,
            timeout: DNS_SOCKET_TIMEOUT,
            udp_retries: DNS_SEND_RETRIES,
            max_udp_response: MAX_UDP_RESPONSE_SIZE,
        }
    }
}

impl From<&DnsConfig> for TransportSettings {
    fn from(config: &DnsConfig) -> Self {
        Self {
            port: config.port,
            timeout: config.timeout(),
            udp_retries: config.udp_retries,
            max_udp_response: config.max_udp_response,
        }
    }
}

/// Socket type used for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// UDP first, TCP only if the datagram reply was truncated.
    #[default]
    Udp,
    Tcp,
}

/// Sends one query to one named server and returns the raw reply.
pub trait DnsExchange: Send + Sync {
    fn exchange(
        &self,
        server: &str,
        query: &DnsQuery,
        mode: QueryMode,
    ) -> Result<Vec<u8>, DnsError>;
}

/// [`DnsExchange`] over real sockets.
#[derive(Debug, Clone, Default)]
pub struct NetworkExchange {
    settings: TransportSettings,
}

impl NetworkExchange {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }
}

impl DnsExchange for NetworkExchange {
    fn exchange(
        &self,
        server: &str,
        query: &DnsQuery,
        mode: QueryMode,
    ) -> Result<Vec<u8>, DnsError> {
        let addr = resolve_server(server, self.settings.port)?;

        if mode == QueryMode::Tcp {
            return TcpTransport::new(server, addr, self.settings).send(query);
        }

        match UdpTransport::new(server, addr, self.settings).send(query) {
            Err(DnsError::TruncatedResponse) => {
                debug!(server = %addr, id = query.id, "Truncated UDP reply, retrying over TCP");
                TcpTransport::new(server, addr, self.settings).send(query)
            }
            other => other,
        }
    }
}

/// Zeroed reply buffer of `len` bytes, failing instead of aborting when the
/// allocation cannot be satisfied.
pub(crate) fn alloc_reply(len: usize) -> Result<Vec<u8>, DnsError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DnsError::AllocationFailure)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Turns a server host name or address literal into a socket address.
pub fn resolve_server(server: &str, port: u16) -> Result<SocketAddr, DnsError> {
    let mut addrs = (server, port)
        .to_socket_addrs()
        .map_err(|e| DnsError::transport(server, e))?;

    addrs.next().ok_or_else(|| DnsError::Transport {
        server: server.to_string(),
        reason: "no address found".to_string(),
    })
}
