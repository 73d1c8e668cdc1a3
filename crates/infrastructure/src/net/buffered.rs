//! Buffered, line-oriented socket used by the mail protocol handlers.

use super::transport::{PlainTransport, SocketTransport};
use mailnet_domain::SocketError;
use std::fmt;
use std::net::{Shutdown, TcpStream};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

pub const STD_SOCK_BUFFER_SIZE: usize = 4096;

/// Outcome of a bounded line read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRead {
    /// Bytes stored in the destination, trailing CRs excluded.
    pub len: usize,

    /// False when the destination filled up before a `\n` arrived.
    pub got_newline: bool,
}

/// A TCP connection with a read-ahead buffer and a swappable transport.
///
/// The read-ahead buffer is refilled from offset 0 each time it runs dry, so
/// `read_index + unread` never exceeds its length.
pub struct BufferedSocket {
    socket: TcpStream,
    transport: Box<dyn SocketTransport>,
    buffer: Vec<u8>,
    read_index: usize,
    unread: usize,
}

impl fmt::Debug for BufferedSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedSocket")
            .field("socket", &self.socket)
            .field("transport", &self.transport.name())
            .field("capacity", &self.buffer.len())
            .field("unread", &self.unread)
            .finish()
    }
}

impl BufferedSocket {
    /// Wraps `socket` with a `buffer_size` byte read-ahead buffer and the
    /// plain socket transport.
    pub fn attach(socket: TcpStream, buffer_size: usize) -> Result<Self, SocketError> {
        let stream = socket.try_clone()?;
        Self::with_transport(socket, Box::new(PlainTransport::new(stream)), buffer_size)
    }

    pub fn with_transport(
        socket: TcpStream,
        transport: Box<dyn SocketTransport>,
        buffer_size: usize,
    ) -> Result<Self, SocketError> {
        let buffer = alloc_buffer(buffer_size.max(1))?;

        Ok(Self {
            socket,
            transport,
            buffer,
            read_index: 0,
            unread: 0,
        })
    }

    /// Releases the transport and the buffer. Returns the raw socket unless
    /// `close` is set, in which case the socket is shut down and dropped.
    pub fn detach(self, close: bool) -> Option<TcpStream> {
        let BufferedSocket {
            socket,
            mut transport,
            ..
        } = self;

        if let Err(e) = transport.release() {
            debug!(transport = transport.name(), error = %e, "Transport release failed");
        }
        drop(transport);

        if close {
            if let Err(e) = socket.shutdown(Shutdown::Both) {
                debug!(error = %e, "Socket shutdown failed");
            }
            return None;
        }

        Some(socket)
    }

    /// The raw socket this buffered socket was attached to.
    pub fn socket(&self) -> &TcpStream {
        &self.socket
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes already read from the transport and not yet consumed.
    pub fn buffered(&self) -> usize {
        self.unread
    }

    /// Installs a new transport and hands back the previous one. Buffered,
    /// already-decoded bytes are kept.
    pub fn set_transport(
        &mut self,
        transport: Box<dyn SocketTransport>,
    ) -> Box<dyn SocketTransport> {
        debug!(
            from = self.transport.name(),
            to = transport.name(),
            buffered = self.unread,
            "Switching socket transport"
        );
        std::mem::replace(&mut self.transport, transport)
    }

    fn fetch(&mut self, timeout: Duration) -> Result<usize, SocketError> {
        self.read_index = 0;
        self.unread = 0;

        let n = self.transport.read(&mut self.buffer, timeout)?;
        if n == 0 {
            return Err(SocketError::EndOfStream);
        }
        trace!(bytes = n, "Socket buffer refilled");
        self.unread = n;

        Ok(n)
    }

    fn consume(&mut self, n: usize) {
        self.read_index += n;
        self.unread -= n;
    }

    pub fn read_byte(&mut self, timeout: Duration) -> Result<u8, SocketError> {
        if self.unread == 0 {
            self.fetch(timeout)?;
        }
        let byte = self.buffer[self.read_index];
        self.consume(1);

        Ok(byte)
    }

    /// Reads one line a byte at a time into `dst`.
    ///
    /// At most `dst.len() - 1` bytes are stored. The newline and every CR
    /// right before it are dropped. Fails with [`SocketError::LineTooLong`]
    /// when `dst` fills up first; the partial line stays in `dst`.
    pub fn read_line_bytewise(
        &mut self,
        dst: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, SocketError> {
        self.read_line_bytewise_partial(dst, timeout)?.complete()
    }

    /// Same contract as [`read_line_bytewise`](Self::read_line_bytewise), but
    /// scans the read-ahead buffer for `\n` and copies whole runs.
    pub fn read_line(&mut self, dst: &mut [u8], timeout: Duration) -> Result<usize, SocketError> {
        self.read_line_partial(dst, timeout)?.complete()
    }

    /// Like [`read_line_bytewise`](Self::read_line_bytewise), but reports a
    /// full destination through [`LineRead::got_newline`] instead of failing.
    pub fn read_line_bytewise_partial(
        &mut self,
        dst: &mut [u8],
        timeout: Duration,
    ) -> Result<LineRead, SocketError> {
        let max_chars = dst.len().saturating_sub(1);
        let mut len = 0;

        while len < max_chars {
            let byte = self.read_byte(timeout)?;
            if byte == b'\n' {
                return Ok(LineRead {
                    len: strip_cr(dst, len),
                    got_newline: true,
                });
            }
            dst[len] = byte;
            len += 1;
        }

        Ok(LineRead {
            len,
            got_newline: false,
        })
    }

    /// Like [`read_line`](Self::read_line), but reports a full destination
    /// through [`LineRead::got_newline`] instead of failing.
    pub fn read_line_partial(
        &mut self,
        dst: &mut [u8],
        timeout: Duration,
    ) -> Result<LineRead, SocketError> {
        let max_chars = dst.len().saturating_sub(1);
        let mut len = 0;

        while len < max_chars {
            if self.unread == 0 {
                self.fetch(timeout)?;
            }

            let lookup = self.unread.min(max_chars - len);
            let start = self.read_index;
            let window = &self.buffer[start..start + lookup];

            match window.iter().position(|&b| b == b'\n') {
                Some(nl) => {
                    dst[len..len + nl].copy_from_slice(&window[..nl]);
                    len += nl;
                    self.consume(nl + 1);

                    return Ok(LineRead {
                        len: strip_cr(dst, len),
                        got_newline: true,
                    });
                }
                None => {
                    dst[len..len + lookup].copy_from_slice(window);
                    len += lookup;
                    self.consume(lookup);
                }
            }
        }

        Ok(LineRead {
            len,
            got_newline: false,
        })
    }

    /// Sends `line` followed by CRLF. Returns the number of bytes sent.
    pub fn write_line(&mut self, line: &str, timeout: Duration) -> Result<usize, SocketError> {
        let mut out = Vec::new();
        out.try_reserve_exact(line.len() + 2)
            .map_err(|_| SocketError::AllocationFailure)?;
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(b"\r\n");

        self.write_all(&out, timeout)?;
        Ok(out.len())
    }

    /// Formats `args` and sends the result as one CRLF-terminated line.
    ///
    /// ```ignore
    /// sock.send_formatted(timeout, format_args!("250 {} Hello", domain))?;
    /// ```
    pub fn send_formatted(
        &mut self,
        timeout: Duration,
        args: fmt::Arguments<'_>,
    ) -> Result<usize, SocketError> {
        let line = fmt::format(args);
        self.write_line(&line, timeout)
    }

    /// Sends all of `data`, retrying partial writes.
    pub fn send_data(&mut self, data: &[u8], timeout: Duration) -> Result<usize, SocketError> {
        self.write_all(data, timeout)?;
        Ok(data.len())
    }

    /// Reads into `dst`, draining the read-ahead buffer first.
    ///
    /// Goes to the transport directly when nothing was buffered, or, with
    /// `fill`, until `dst` is full or the transport stops delivering. Bytes
    /// already buffered are never read twice.
    pub fn read_data(
        &mut self,
        dst: &mut [u8],
        timeout: Duration,
        fill: bool,
    ) -> Result<usize, SocketError> {
        let from_buffer = dst.len().min(self.unread);
        if from_buffer > 0 {
            let start = self.read_index;
            dst[..from_buffer].copy_from_slice(&self.buffer[start..start + from_buffer]);
            self.consume(from_buffer);
        }

        let mut read = from_buffer;
        if read < dst.len() && (read == 0 || fill) {
            while read < dst.len() {
                match self.transport.read(&mut dst[read..], timeout) {
                    Ok(0) => break,
                    Ok(n) => read += n,
                    Err(e) if read == 0 => return Err(e),
                    Err(e) => {
                        debug!(error = %e, read, wanted = dst.len(), "Transport stalled");
                        break;
                    }
                }
                if !fill {
                    break;
                }
            }
        }

        Ok(read)
    }

    /// Sends bytes `start..end` of a file (`end == None` for the whole rest)
    /// through the bound transport.
    pub fn send_file(
        &mut self,
        path: &Path,
        start: u64,
        end: Option<u64>,
        timeout: Duration,
    ) -> Result<u64, SocketError> {
        self.transport.send_file(path, start, end, timeout)
    }

    fn write_all(&mut self, data: &[u8], timeout: Duration) -> Result<(), SocketError> {
        let mut written = 0;

        while written < data.len() {
            let n = self.transport.write(&data[written..], timeout)?;
            if n == 0 {
                return Err(SocketError::WriteZero {
                    written: written as u64,
                    expected: data.len() as u64,
                });
            }
            written += n;
        }

        Ok(())
    }
}

impl LineRead {
    fn complete(self) -> Result<usize, SocketError> {
        if self.got_newline {
            Ok(self.len)
        } else {
            Err(SocketError::LineTooLong { len: self.len })
        }
    }
}

/// Drops every CR at the end of `dst[..len]`; returns the new length.
pub(crate) fn strip_cr(dst: &[u8], mut len: usize) -> usize {
    while len > 0 && dst[len - 1] == b'\r' {
        len -= 1;
    }
    len
}

pub(crate) fn alloc_buffer(size: usize) -> Result<Vec<u8>, SocketError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| SocketError::AllocationFailure)?;
    buffer.resize(size, 0);
    Ok(buffer)
}
