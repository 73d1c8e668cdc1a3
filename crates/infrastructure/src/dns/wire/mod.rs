//! RFC 1035 wire format: headers, names, queries and responses.

pub mod header;
pub mod message_builder;
pub mod name;
pub mod reader;
pub mod response_parser;

pub use header::{DnsHeader, HEADER_LEN};
pub use message_builder::{DnsQuery, MessageBuilder, QueryIdGenerator};
pub use name::{encode_name, read_name, MAX_HOST_NAME};
pub use reader::WireReader;
pub use response_parser::{Question, ResourceRecord, ResponseParser};
