#![allow(dead_code)]
use mailnet_domain::{RecordType, CLASS_IN};
use mailnet_infrastructure::dns::wire::{encode_name, DnsHeader, HEADER_LEN};
use std::io::Write;
use std::net::{Ipv4Addr, TcpListener, TcpStream};

/// Builds wire-format DNS responses for mocks.
pub struct ResponseBuilder {
    header: DnsHeader,
    question: Vec<u8>,
    answers: Vec<Vec<u8>>,
    authority: Vec<Vec<u8>>,
    additional: Vec<Vec<u8>>,
}

impl ResponseBuilder {
    pub fn new(id: u16) -> Self {
        Self {
            header: DnsHeader {
                id,
                response: true,
                ..DnsHeader::default()
            },
            question: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Response echoing the id, RD bit and question section of `query`.
    pub fn for_query(query: &[u8]) -> Self {
        let header = DnsHeader::parse(query).unwrap();
        let mut builder = Self::new(header.id);
        builder.header.recursion_desired = header.recursion_desired;
        builder.header.qd_count = header.qd_count;
        builder.question = query[HEADER_LEN..].to_vec();
        builder
    }

    pub fn id(mut self, id: u16) -> Self {
        self.header.id = id;
        self
    }

    pub fn authoritative(mut self) -> Self {
        self.header.authoritative = true;
        self
    }

    pub fn truncated(mut self) -> Self {
        self.header.truncated = true;
        self
    }

    pub fn recursion_available(mut self, available: bool) -> Self {
        self.header.recursion_available = available;
        self
    }

    pub fn rcode(mut self, rcode: u8) -> Self {
        self.header.rcode = rcode;
        self
    }

    pub fn answer(mut self, name: &str, record_type: u16, rdata: Vec<u8>) -> Self {
        self.answers.push(record(name, record_type, 300, &rdata));
        self
    }

    pub fn answer_a(self, name: &str, addr: Ipv4Addr) -> Self {
        self.answer(name, RecordType::A.to_u16(), addr.octets().to_vec())
    }

    pub fn answer_mx(self, name: &str, preference: u16, exchange: &str) -> Self {
        let mut rdata = preference.to_be_bytes().to_vec();
        encode_name(exchange, &mut rdata).unwrap();
        self.answer(name, RecordType::MX.to_u16(), rdata)
    }

    pub fn authority_ns(mut self, zone: &str, server: &str) -> Self {
        let mut rdata = Vec::new();
        encode_name(server, &mut rdata).unwrap();
        self.authority
            .push(record(zone, RecordType::NS.to_u16(), 172_800, &rdata));
        self
    }

    pub fn additional_a(mut self, name: &str, addr: Ipv4Addr) -> Self {
        self.additional.push(record(
            name,
            RecordType::A.to_u16(),
            172_800,
            &addr.octets(),
        ));
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.header.an_count = self.answers.len() as u16;
        self.header.ns_count = self.authority.len() as u16;
        self.header.ar_count = self.additional.len() as u16;

        let mut out = Vec::with_capacity(512);
        self.header.encode(&mut out);
        out.extend_from_slice(&self.question);
        for rr in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            out.extend_from_slice(rr);
        }
        out
    }
}

fn record(name: &str, record_type: u16, ttl: u32, rdata: &[u8]) -> Vec<u8> {
    let mut rr = Vec::new();
    encode_name(name, &mut rr).unwrap();
    rr.extend_from_slice(&record_type.to_be_bytes());
    rr.extend_from_slice(&CLASS_IN.to_be_bytes());
    rr.extend_from_slice(&ttl.to_be_bytes());
    rr.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    rr.extend_from_slice(rdata);
    rr
}

/// Connected TCP pair over loopback: (client side, server side).
pub fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

/// Root hints file with one host per line.
pub fn roots_file(hosts: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for host in hosts {
        writeln!(file, "{}", host).unwrap();
    }
    file.flush().unwrap();
    file
}
