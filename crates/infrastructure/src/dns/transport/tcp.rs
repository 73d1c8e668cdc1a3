use super::{alloc_reply, TransportSettings};
use crate::dns::wire::{DnsHeader, DnsQuery, HEADER_LEN};
use mailnet_domain::DnsError;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server: String,
    server_addr: SocketAddr,
    settings: TransportSettings,
}

impl TcpTransport {
    pub fn new(server: &str, server_addr: SocketAddr, settings: TransportSettings) -> Self {
        Self {
            server: server.to_string(),
            server_addr,
            settings,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        "TCP"
    }

    fn connect(&self) -> io::Result<TcpStream> {
        let timeout = self.settings.timeout.max(Duration::from_millis(1));
        let stream = TcpStream::connect_timeout(&self.server_addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    pub fn send(&self, query: &DnsQuery) -> Result<Vec<u8>, DnsError> {
        let mut stream = self
            .connect()
            .map_err(|e| DnsError::transport(&self.server, e))?;

        write_with_length_prefix(&mut stream, &query.bytes)
            .map_err(|e| DnsError::transport(&self.server, e))?;

        debug!(
            server = %self.server_addr,
            id = query.id,
            message_len = query.bytes.len(),
            "TCP query sent"
        );

        let response = read_with_length_prefix(&mut stream, &self.server)?;

        debug!(
            server = %self.server_addr,
            response_len = response.len(),
            "TCP response received"
        );

        if response.len() < HEADER_LEN {
            return Err(DnsError::BadResponse);
        }
        let header = DnsHeader::parse(&response)?;
        if query.recursion_desired && !header.recursion_available {
            return Err(DnsError::RecursionNotAvailable);
        }

        Ok(response)
    }
}

/// Writes `message` preceded by its 2-byte big-endian length.
pub fn write_with_length_prefix<W: Write>(stream: &mut W, message: &[u8]) -> io::Result<()> {
    if message.len() > MAX_TCP_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("DNS message too large: {} bytes", message.len()),
        ));
    }

    stream.write_all(&(message.len() as u16).to_be_bytes())?;
    stream.write_all(message)?;
    stream.flush()
}

/// Reads a 2-byte big-endian length, then exactly that many bytes from
/// `peer`.
pub fn read_with_length_prefix<R: Read>(stream: &mut R, peer: &str) -> Result<Vec<u8>, DnsError> {
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .map_err(|e| DnsError::transport(peer, e))?;

    let mut message = alloc_reply(usize::from(u16::from_be_bytes(len_buf)))?;
    stream
        .read_exact(&mut message)
        .map_err(|e| DnsError::transport(peer, e))?;

    Ok(message)
}
