pub mod buffered;
pub mod line_buffer;
pub mod transport;

pub use buffered::{BufferedSocket, LineRead, STD_SOCK_BUFFER_SIZE};
pub use line_buffer::{LineBuffer, DEFAULT_LINE_BUFFER_SIZE};
pub use transport::{copy_file_range, PlainTransport, SocketTransport, PLAIN_TRANSPORT_NAME};
