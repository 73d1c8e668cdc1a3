use crate::dns::transport::{DnsExchange, QueryMode};
use crate::dns::wire::{MessageBuilder, QueryIdGenerator, ResponseParser};
use mailnet_domain::{DnsAnswer, DnsError, DnsRecord, RecordType};
use tracing::{debug, warn};

/// One top-level resolution: the name being looked up and the limits that
/// apply to every level of the walk.
pub(crate) struct RecursiveWalk<'a, E: DnsExchange> {
    pub exchange: &'a E,
    pub ids: &'a QueryIdGenerator,
    pub name: &'a str,
    pub record_type: RecordType,
    pub max_depth: u32,
}

impl<E: DnsExchange> RecursiveWalk<'_, E> {
    /// Queries `candidates` in order until one yields answers.
    ///
    /// A candidate that replies with no answers but with NS records hands
    /// those records to the next level. Success, a fatal error or
    /// [`DnsError::NotFound`] from that level ends this one too; any other
    /// candidate failure moves on to the next candidate.
    pub fn walk(&self, candidates: Vec<DnsRecord>, depth: u32) -> Result<DnsAnswer, DnsError> {
        if depth > self.max_depth {
            warn!(
                name = %self.name,
                max_depth = self.max_depth,
                "Maximum DNS query depth exceeded"
            );
            return Err(DnsError::MaxDepthExceeded {
                name: self.name.to_string(),
                max_depth: self.max_depth,
            });
        }

        for candidate in &candidates {
            let Some(server) = candidate.target_name() else {
                continue;
            };

            let mut answer = match self.query(server) {
                Ok(answer) => answer,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(server = %server, depth, error = %e, "Name server candidate failed");
                    continue;
                }
            };

            if answer.an_count > 0 {
                debug!(server = %server, depth, answers = answer.an_count, "DNS answer found");
                return Ok(answer);
            }

            let referral = answer.take_records(RecordType::NS);
            drop(answer);
            if referral.is_empty() {
                debug!(server = %server, depth, "No answers and no referral");
                continue;
            }

            debug!(
                server = %server,
                depth,
                name_servers = referral.len(),
                "Following referral"
            );
            match self.walk(referral, depth + 1) {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_fatal() || e == DnsError::NotFound => return Err(e),
                Err(e) => {
                    debug!(server = %server, depth, error = %e, "Referral failed");
                }
            }
        }

        Err(DnsError::NotFound)
    }

    fn query(&self, server: &str) -> Result<DnsAnswer, DnsError> {
        let query =
            MessageBuilder::build_query(self.ids.next_id(), self.name, self.record_type, false)?;
        let reply = self.exchange.exchange(server, &query, QueryMode::Udp)?;
        ResponseParser::parse(&reply)
    }
}
