//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages go out unframed. A reply whose id does not match the query, or
//! which is shorter than a header, is dropped and the query is re-sent, up to
//! the configured retry count. A reply with TC set is reported as
//! [`DnsError::TruncatedResponse`] so the caller can switch to TCP.

use super::{alloc_reply, TransportSettings};
use crate::dns::wire::{DnsHeader, DnsQuery, HEADER_LEN};
use mailnet_domain::DnsError;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use tracing::{debug, warn};

pub struct UdpTransport {
    server: String,
    server_addr: SocketAddr,
    settings: TransportSettings,
}

impl UdpTransport {
    pub fn new(server: &str, server_addr: SocketAddr, settings: TransportSettings) -> Self {
        Self {
            server: server.to_string(),
            server_addr,
            settings,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        "UDP"
    }

    pub fn send(&self, query: &DnsQuery) -> Result<Vec<u8>, DnsError> {
        let socket = self
            .create_socket()
            .map_err(|e| DnsError::transport(&self.server, e))?;
        let mut recv_buf = alloc_reply(self.settings.max_udp_response.max(HEADER_LEN))?;

        for attempt in 1..=self.settings.udp_retries {
            match socket.send_to(&query.bytes, self.server_addr) {
                Ok(sent) if sent == query.bytes.len() => {}
                Ok(sent) => {
                    debug!(server = %self.server_addr, sent, attempt, "Short UDP send");
                    continue;
                }
                Err(e) => {
                    debug!(server = %self.server_addr, error = %e, attempt, "UDP send failed");
                    continue;
                }
            }

            debug!(
                server = %self.server_addr,
                id = query.id,
                bytes_sent = query.bytes.len(),
                attempt,
                "UDP query sent"
            );

            let (received, from_addr) = match socket.recv_from(&mut recv_buf) {
                Ok(r) => r,
                Err(e) => {
                    debug!(server = %self.server_addr, error = %e, attempt, "No UDP reply");
                    continue;
                }
            };

            if from_addr.ip() != self.server_addr.ip() {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
            }

            if received < HEADER_LEN {
                debug!(server = %self.server_addr, received, "Undersized UDP reply dropped");
                continue;
            }

            let reply = &recv_buf[..received];
            let header = DnsHeader::parse(reply)?;
            if header.id != query.id {
                warn!(
                    server = %self.server_addr,
                    expected = query.id,
                    received = header.id,
                    "UDP reply with mismatched transaction id"
                );
                continue;
            }
            if query.recursion_desired && !header.recursion_available {
                return Err(DnsError::RecursionNotAvailable);
            }
            if header.truncated {
                return Err(DnsError::TruncatedResponse);
            }

            debug!(
                server = %self.server_addr,
                bytes_received = received,
                "UDP response received"
            );
            return Ok(reply.to_vec());
        }

        Err(DnsError::NoDatagramResponse)
    }

    fn create_socket(&self) -> io::Result<UdpSocket> {
        let (domain, bind_addr) = if self.server_addr.is_ipv4() {
            (Domain::IPV4, SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
        } else {
            (Domain::IPV6, SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)))
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.bind(&bind_addr.into())?;

        let timeout = Some(self.settings.timeout.max(std::time::Duration::from_millis(1)));
        socket.set_read_timeout(timeout)?;
        socket.set_write_timeout(timeout)?;

        Ok(socket.into())
    }
}
