use super::buffered::{alloc_buffer, strip_cr, BufferedSocket};
use mailnet_domain::SocketError;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_LINE_BUFFER_SIZE: usize = 1024;

/// Growable destination for reading lines of unbounded length.
///
/// The buffer only ever grows; a long line read once keeps the larger
/// allocation for every later line.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new(size: Option<usize>) -> Result<Self, SocketError> {
        let size = size.unwrap_or(DEFAULT_LINE_BUFFER_SIZE).max(2);
        Ok(Self {
            buffer: alloc_buffer(size)?,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Reads one complete line from `sock`, growing the buffer to `2n + 1`
    /// bytes whenever a line does not fit. The returned slice excludes the
    /// newline and any CRs before it.
    pub fn get(
        &mut self,
        sock: &mut BufferedSocket,
        timeout: Duration,
    ) -> Result<&[u8], SocketError> {
        let mut len = 0;

        loop {
            let read = sock.read_line_partial(&mut self.buffer[len..], timeout)?;
            len += read.len;

            if read.got_newline {
                let len = strip_cr(&self.buffer, len);
                return Ok(&self.buffer[..len]);
            }

            self.grow()?;
        }
    }

    fn grow(&mut self) -> Result<(), SocketError> {
        let size = self.buffer.len() * 2 + 1;
        self.buffer
            .try_reserve_exact(size - self.buffer.len())
            .map_err(|_| SocketError::AllocationFailure)?;
        self.buffer.resize(size, 0);
        trace!(size, "Line buffer grown");
        Ok(())
    }
}
