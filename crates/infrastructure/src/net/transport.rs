//! Pluggable byte transports beneath [`BufferedSocket`](super::BufferedSocket).
//!
//! A transport moves raw bytes for one connection. The plain transport talks
//! straight to the TCP socket; an encrypting layer installs its own
//! implementation over the same socket when a session upgrades mid-stream.

use mailnet_domain::SocketError;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const PLAIN_TRANSPORT_NAME: &str = "SOCK";

const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Byte transport bound to a buffered socket.
///
/// `read` and `write` return the number of bytes moved; `Ok(0)` means the
/// peer closed the stream. A call that sees no progress within `timeout`
/// fails with [`SocketError::Timeout`].
pub trait SocketTransport: Send {
    fn name(&self) -> &str;

    /// Releases private resources. Called once when the socket is detached.
    fn release(&mut self) -> Result<(), SocketError> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, SocketError>;

    fn write(&mut self, buf: &[u8], timeout: Duration) -> Result<usize, SocketError>;

    /// Sends bytes `start..end` of the file at `path`; `end == None` means up
    /// to the end of the file. Returns the number of bytes sent.
    ///
    /// The default reads the file and pushes it through [`write`](Self::write),
    /// which is what an encrypting transport needs.
    fn send_file(
        &mut self,
        path: &Path,
        start: u64,
        end: Option<u64>,
        timeout: Duration,
    ) -> Result<u64, SocketError> {
        copy_file_range(self, path, start, end, timeout)
    }
}

/// Streams a file range through `transport.write`.
pub fn copy_file_range<T: SocketTransport + ?Sized>(
    transport: &mut T,
    path: &Path,
    start: u64,
    end: Option<u64>,
    timeout: Duration,
) -> Result<u64, SocketError> {
    let (mut file, start, end) = open_range(path, start, end)?;
    file.seek(SeekFrom::Start(start))?;

    let expected = end - start;
    let mut chunk = vec![0u8; COPY_CHUNK_SIZE.min(expected as usize).max(1)];
    let mut sent = 0u64;

    while sent < expected {
        let want = ((expected - sent) as usize).min(chunk.len());
        let n = file.read(&mut chunk[..want])?;
        if n == 0 {
            break;
        }

        let mut off = 0;
        while off < n {
            let written = transport.write(&chunk[off..n], timeout)?;
            if written == 0 {
                return Err(SocketError::WriteZero {
                    written: sent + off as u64,
                    expected,
                });
            }
            off += written;
        }
        sent += n as u64;
    }

    debug!(path = %path.display(), bytes = sent, "file range copied");
    Ok(sent)
}

fn open_range(path: &Path, start: u64, end: Option<u64>) -> Result<(File, u64, u64), SocketError> {
    let file = File::open(path).map_err(|e| SocketError::FileOpen {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let size = file.metadata()?.len();
    let end = end.map_or(size, |end| end.min(size));

    Ok((file, start.min(end), end))
}

/// Socket timeouts reject a zero duration; clamp to the smallest usable one.
pub(crate) fn io_timeout(timeout: Duration) -> Option<Duration> {
    Some(timeout.max(Duration::from_millis(1)))
}

/// Transport that reads and writes the TCP socket directly.
pub struct PlainTransport {
    stream: TcpStream,
}

impl PlainTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl SocketTransport for PlainTransport {
    fn name(&self) -> &str {
        PLAIN_TRANSPORT_NAME
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, SocketError> {
        self.stream.set_read_timeout(io_timeout(timeout))?;
        loop {
            match self.stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write(&mut self, buf: &[u8], timeout: Duration) -> Result<usize, SocketError> {
        self.stream.set_write_timeout(io_timeout(timeout))?;
        loop {
            match self.stream.write(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[cfg(target_os = "linux")]
    fn send_file(
        &mut self,
        path: &Path,
        start: u64,
        end: Option<u64>,
        timeout: Duration,
    ) -> Result<u64, SocketError> {
        use std::os::unix::io::AsRawFd;

        let (file, start, end) = open_range(path, start, end)?;
        self.stream.set_write_timeout(io_timeout(timeout))?;

        let expected = end - start;
        let mut offset = start as libc::off_t;
        let mut sent = 0u64;

        while sent < expected {
            let count = ((expected - sent) as usize).min(COPY_CHUNK_SIZE * 16);
            let rc = unsafe {
                libc::sendfile(
                    self.stream.as_raw_fd(),
                    file.as_raw_fd(),
                    &mut offset,
                    count,
                )
            };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err.into());
            }
            if rc == 0 {
                return Err(SocketError::WriteZero { written: sent, expected });
            }
            sent += rc as u64;
        }

        debug!(path = %path.display(), bytes = sent, "sendfile complete");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink(Vec<u8>);

    impl SocketTransport for Sink {
        fn name(&self) -> &str {
            "SINK"
        }

        fn read(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<usize, SocketError> {
            Ok(0)
        }

        fn write(&mut self, buf: &[u8], _timeout: Duration) -> Result<usize, SocketError> {
            // Accept at most 3 bytes per call to exercise partial writes.
            let n = buf.len().min(3);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_default_send_file_copies_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789abcdef").unwrap();

        let mut sink = Sink(Vec::new());
        let sent = sink
            .send_file(file.path(), 4, Some(10), Duration::from_secs(1))
            .unwrap();

        assert_eq!(sent, 6);
        assert_eq!(sink.0, b"456789");
    }

    #[test]
    fn test_default_send_file_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"headerbody").unwrap();

        let mut sink = Sink(Vec::new());
        let sent = sink
            .send_file(file.path(), 6, None, Duration::from_secs(1))
            .unwrap();

        assert_eq!(sent, 4);
        assert_eq!(sink.0, b"body");
    }

    #[test]
    fn test_send_missing_file() {
        let mut sink = Sink(Vec::new());
        let result = sink.send_file(
            Path::new("/nonexistent/mailnet/file"),
            0,
            None,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(SocketError::FileOpen { .. })));
    }

    #[test]
    fn test_io_timeout_never_zero() {
        assert_eq!(io_timeout(Duration::ZERO), Some(Duration::from_millis(1)));
        assert_eq!(
            io_timeout(Duration::from_secs(2)),
            Some(Duration::from_secs(2))
        );
    }
}
