use crate::dns_record::{DnsRecord, RecordType};

/// Decoded DNS response: one record list per [`RecordType`] slot plus the
/// header counts.
///
/// Records are filed by their own type, so every record in the slot for `T`
/// has type `T`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsAnswer {
    pub authoritative: bool,

    pub qd_count: u16,

    pub an_count: u16,

    pub ns_count: u16,

    pub ar_count: u16,

    slots: [Vec<DnsRecord>; RecordType::COUNT],
}

impl DnsAnswer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DnsRecord) {
        self.slots[record.record_type().slot()].push(record);
    }

    pub fn records(&self, record_type: RecordType) -> &[DnsRecord] {
        &self.slots[record_type.slot()]
    }

    /// Moves the record list for `record_type` out of the answer, leaving the
    /// slot empty.
    pub fn take_records(&mut self, record_type: RecordType) -> Vec<DnsRecord> {
        std::mem::take(&mut self.slots[record_type.slot()])
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn record_count(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// Non-empty slots in [`RecordType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordType, &[DnsRecord])> + '_ {
        RecordType::ALL
            .iter()
            .map(move |rt| (*rt, self.records(*rt)))
            .filter(|(_, records)| !records.is_empty())
    }
}
