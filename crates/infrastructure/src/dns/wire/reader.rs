use mailnet_domain::DnsError;

/// Bounds-checked big-endian cursor over a DNS message.
///
/// Every read checks the requested range against the message length before
/// touching the bytes; running off the end yields [`DnsError::BadResponse`].
#[derive(Debug, Clone, Copy)]
pub struct WireReader<'a> {
    msg: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(msg: &'a [u8]) -> Self {
        Self { msg, pos: 0 }
    }

    pub fn at(msg: &'a [u8], pos: usize) -> Self {
        Self { msg, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DnsError> {
        self.bytes(n).map(|_| ())
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DnsError> {
        let end = self.pos.checked_add(n).ok_or(DnsError::BadResponse)?;
        if end > self.msg.len() {
            return Err(DnsError::BadResponse);
        }
        let out = &self.msg[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DnsError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DnsError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, DnsError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DnsError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }
}
