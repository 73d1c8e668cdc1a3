#![allow(dead_code)]

pub mod builders;
pub mod dns_server_mock;
pub mod scripted;

pub use builders::{loopback_pair, roots_file, ResponseBuilder};
pub use dns_server_mock::{MockDnsServer, Protocol};
pub use scripted::{ScriptedExchange, ScriptedTransport};
