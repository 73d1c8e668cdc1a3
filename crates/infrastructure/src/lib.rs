//! I/O layer of mailnet: the buffered socket stack used by the line protocol
//! handlers and the recursive DNS stub resolver.

pub mod dns;
pub mod net;

pub use dns::{DnsClient, DnsExchange, NetworkExchange, QueryMode, RootHints, TransportSettings};
pub use net::{BufferedSocket, LineBuffer, LineRead, PlainTransport, SocketTransport};
