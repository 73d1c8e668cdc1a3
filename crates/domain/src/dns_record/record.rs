use super::RecordType;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const CLASS_IN: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaData {
    pub primary: String,

    pub mailbox: String,

    pub serial: u32,

    pub refresh: u32,

    pub retry: u32,

    pub expire: u32,

    pub min_ttl: u32,
}

/// Type-specific payload of a decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    NS(String),
    PTR(String),
    MX { preference: u16, exchange: String },
    SOA(SoaData),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::NS(_) => RecordType::NS,
            RecordData::PTR(_) => RecordType::PTR,
            RecordData::MX { .. } => RecordType::MX,
            RecordData::SOA(_) => RecordType::SOA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,

    pub class: u16,

    pub ttl: u32,

    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(name: impl Into<String>, class: u16, ttl: u32, data: RecordData) -> Self {
        Self {
            name: name.into(),
            class,
            ttl,
            data,
        }
    }

    /// NS-shaped record pointing at `server`, as produced by the root hints loader.
    pub fn name_server(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self::new(name, CLASS_IN, 0, RecordData::NS(server.into()))
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Target host of an NS, CNAME or PTR record.
    pub fn target_name(&self) -> Option<&str> {
        match &self.data {
            RecordData::NS(name) | RecordData::CNAME(name) | RecordData::PTR(name) => Some(name),
            _ => None,
        }
    }
}
