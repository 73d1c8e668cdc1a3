use super::reader::WireReader;
use mailnet_domain::DnsError;

pub const HEADER_LEN: usize = 12;

const FLAG_QR: u16 = 0x8000;
const FLAG_AA: u16 = 0x0400;
const FLAG_TC: u16 = 0x0200;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;

/// Fixed 12-byte DNS message header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub response: bool,
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: u8,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl DnsHeader {
    pub fn query(id: u16, recursion_desired: bool) -> Self {
        Self {
            id,
            recursion_desired,
            qd_count: 1,
            ..Self::default()
        }
    }

    pub fn parse(msg: &[u8]) -> Result<Self, DnsError> {
        Self::read(&mut WireReader::new(msg))
    }

    pub fn read(r: &mut WireReader<'_>) -> Result<Self, DnsError> {
        let id = r.u16()?;
        let flags = r.u16()?;

        Ok(Self {
            id,
            response: flags & FLAG_QR != 0,
            opcode: ((flags >> 11) & 0x0f) as u8,
            authoritative: flags & FLAG_AA != 0,
            truncated: flags & FLAG_TC != 0,
            recursion_desired: flags & FLAG_RD != 0,
            recursion_available: flags & FLAG_RA != 0,
            rcode: (flags & 0x000f) as u8,
            qd_count: r.u16()?,
            an_count: r.u16()?,
            ns_count: r.u16()?,
            ar_count: r.u16()?,
        })
    }

    pub fn flags(&self) -> u16 {
        let mut flags = (u16::from(self.opcode) & 0x0f) << 11 | u16::from(self.rcode) & 0x0f;
        for (set, bit) in [
            (self.response, FLAG_QR),
            (self.authoritative, FLAG_AA),
            (self.truncated, FLAG_TC),
            (self.recursion_desired, FLAG_RD),
            (self.recursion_available, FLAG_RA),
        ] {
            if set {
                flags |= bit;
            }
        }
        flags
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.flags().to_be_bytes());
        out.extend_from_slice(&self.qd_count.to_be_bytes());
        out.extend_from_slice(&self.an_count.to_be_bytes());
        out.extend_from_slice(&self.ns_count.to_be_bytes());
        out.extend_from_slice(&self.ar_count.to_be_bytes());
    }
}
