mod record;
mod record_type;

pub use record::{DnsRecord, RecordData, SoaData, CLASS_IN};
pub use record_type::RecordType;
