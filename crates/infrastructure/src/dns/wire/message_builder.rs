//! DNS query construction.

use super::header::{DnsHeader, HEADER_LEN};
use super::name::encode_name;
use mailnet_domain::{DnsError, RecordType, CLASS_IN};
use std::sync::atomic::{AtomicU16, Ordering};

/// Source of transaction ids for outgoing queries.
///
/// An atomic counter starting at a random value; concurrent callers never
/// observe the same id until the counter wraps.
#[derive(Debug)]
pub struct QueryIdGenerator {
    next: AtomicU16,
}

impl QueryIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(fastrand::u16(..))
    }

    pub fn starting_at(seed: u16) -> Self {
        Self {
            next: AtomicU16::new(seed),
        }
    }

    pub fn next_id(&self) -> u16 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for QueryIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// An encoded query ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub id: u16,
    pub recursion_desired: bool,
    pub bytes: Vec<u8>,
}

pub struct MessageBuilder;

impl MessageBuilder {
    /// Builds a single-question query for `name`/`record_type` in class IN.
    pub fn build_query(
        id: u16,
        name: &str,
        record_type: RecordType,
        recursion_desired: bool,
    ) -> Result<DnsQuery, DnsError> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + name.len() + 6);

        DnsHeader::query(id, recursion_desired).encode(&mut bytes);
        encode_name(name, &mut bytes)?;
        bytes.extend_from_slice(&record_type.to_u16().to_be_bytes());
        bytes.extend_from_slice(&CLASS_IN.to_be_bytes());

        Ok(DnsQuery {
            id,
            recursion_desired,
            bytes,
        })
    }
}
