pub mod resolver;
pub mod root_hints;
pub mod transport;
pub mod wire;

pub use resolver::DnsClient;
pub use root_hints::{RootHints, ROOTS_FILE};
pub use transport::{DnsExchange, NetworkExchange, QueryMode, TransportSettings};
pub use wire::{DnsQuery, MessageBuilder, QueryIdGenerator, ResponseParser};
