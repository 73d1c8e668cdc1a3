use super::header::{DnsHeader, HEADER_LEN};
use super::name::{read_name, MAX_HOST_NAME};
use super::reader::WireReader;
use mailnet_domain::{DnsAnswer, DnsError, DnsRecord, RecordData, RecordType, SoaData};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, info};

/// A resource record as it sits in a response, payload not yet decoded.
///
/// `data_offset` points into the message the record was read from, which
/// the payload decoder needs to follow compression pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rtype: u16,
    pub class: u16,
    pub ttl: u32,
    pub data_len: u16,
    pub data_offset: usize,
}

/// One entry of the question section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decodes a full response into a [`DnsAnswer`].
    ///
    /// A non-zero RCODE fails straight away with the mapped error. Records
    /// from the answer, authority and additional sections all land in the
    /// returned answer, filed by type.
    pub fn parse(msg: &[u8]) -> Result<DnsAnswer, DnsError> {
        let header = DnsHeader::parse(msg)?;
        if header.rcode != 0 {
            return Err(DnsError::from_rcode(header.rcode));
        }

        let mut answer = DnsAnswer::new();
        answer.authoritative = header.authoritative;
        answer.qd_count = header.qd_count;
        answer.an_count = header.an_count;
        answer.ns_count = header.ns_count;
        answer.ar_count = header.ar_count;

        let mut offset = HEADER_LEN;
        for _ in 0..header.qd_count {
            let (_, len) = Self::read_question(msg, offset)?;
            offset += len;
        }

        let records =
            u32::from(header.an_count) + u32::from(header.ns_count) + u32::from(header.ar_count);
        for _ in 0..records {
            let (rr, len) = Self::read_resource_record(msg, offset)?;
            offset += len;

            match Self::classify(msg, &rr) {
                Ok(Some(record)) => answer.push(record),
                Ok(None) => info!(rtype = rr.rtype, name = %rr.name, "Unknown DNS record type"),
                Err(e) => debug!(
                    rtype = rr.rtype,
                    name = %rr.name,
                    error = %e,
                    "Skipping undecodable record"
                ),
            }
        }

        debug!(
            authoritative = answer.authoritative,
            answers = answer.an_count,
            authority = answer.ns_count,
            additional = answer.ar_count,
            decoded = answer.record_count(),
            "DNS response parsed"
        );

        Ok(answer)
    }

    pub fn read_question(msg: &[u8], offset: usize) -> Result<(Question, usize), DnsError> {
        let (name, name_len) = read_name(msg, offset, MAX_HOST_NAME)?;
        let mut r = WireReader::at(msg, offset + name_len);
        let qtype = r.u16()?;
        let qclass = r.u16()?;

        Ok((
            Question {
                name,
                qtype,
                qclass,
            },
            name_len + 4,
        ))
    }

    /// Reads the fixed part of the record at `offset`; returns it with the
    /// record's full length, payload included.
    pub fn read_resource_record(
        msg: &[u8],
        offset: usize,
    ) -> Result<(ResourceRecord, usize), DnsError> {
        let (name, name_len) = read_name(msg, offset, MAX_HOST_NAME)?;
        let mut r = WireReader::at(msg, offset + name_len);

        let rtype = r.u16()?;
        let class = r.u16()?;
        let ttl = r.u32()?;
        let data_len = r.u16()?;
        let data_offset = r.position();
        r.skip(usize::from(data_len))?;

        Ok((
            ResourceRecord {
                name,
                rtype,
                class,
                ttl,
                data_len,
                data_offset,
            },
            name_len + 10 + usize::from(data_len),
        ))
    }

    /// Decodes the payload of `rr`. `Ok(None)` for types without a slot.
    pub fn classify(msg: &[u8], rr: &ResourceRecord) -> Result<Option<DnsRecord>, DnsError> {
        let Some(record_type) = RecordType::from_u16(rr.rtype) else {
            return Ok(None);
        };

        let mut r = WireReader::at(msg, rr.data_offset);
        let target = || read_name(msg, rr.data_offset, MAX_HOST_NAME).map(|(name, _)| name);
        let data = match record_type {
            RecordType::MX => {
                let preference = r.u16()?;
                let (exchange, _) = read_name(msg, r.position(), MAX_HOST_NAME)?;
                RecordData::MX {
                    preference,
                    exchange,
                }
            }
            RecordType::CNAME => RecordData::CNAME(target()?),
            RecordType::NS => RecordData::NS(target()?),
            RecordType::PTR => RecordData::PTR(target()?),
            RecordType::A => RecordData::A(Ipv4Addr::from(r.array::<4>()?)),
            RecordType::AAAA => RecordData::AAAA(Ipv6Addr::from(r.array::<16>()?)),
            RecordType::SOA => {
                let (primary, len) = read_name(msg, rr.data_offset, MAX_HOST_NAME)?;
                let (mailbox, len2) = read_name(msg, rr.data_offset + len, MAX_HOST_NAME)?;
                let mut r = WireReader::at(msg, rr.data_offset + len + len2);

                RecordData::SOA(SoaData {
                    primary,
                    mailbox,
                    serial: r.u32()?,
                    refresh: r.u32()?,
                    retry: r.u32()?,
                    expire: r.u32()?,
                    min_ttl: r.u32()?,
                })
            }
        };

        Ok(Some(DnsRecord::new(rr.name.clone(), rr.class, rr.ttl, data)))
    }
}
