pub mod client;
mod recursive;

pub use client::DnsClient;
