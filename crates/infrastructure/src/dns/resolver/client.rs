use super::recursive::RecursiveWalk;
use crate::dns::root_hints::RootHints;
use crate::dns::transport::{DnsExchange, NetworkExchange, QueryMode, TransportSettings};
use crate::dns::wire::{MessageBuilder, QueryIdGenerator, ResponseParser};
use mailnet_domain::{Config, DnsAnswer, DnsError, RecordType};
use tracing::{debug, info};

/// Stub resolver entry points: a recursive walk from the root hints, or a
/// single query to a chosen server.
pub struct DnsClient<E: DnsExchange = NetworkExchange> {
    exchange: E,
    ids: QueryIdGenerator,
    root_hints: RootHints,
}

impl DnsClient<NetworkExchange> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            NetworkExchange::new(TransportSettings::from(&config.dns)),
            RootHints::from_config(config),
        )
    }
}

impl<E: DnsExchange> DnsClient<E> {
    pub fn new(exchange: E, root_hints: RootHints) -> Self {
        Self {
            exchange,
            ids: QueryIdGenerator::new(),
            root_hints,
        }
    }

    pub fn root_hints(&self) -> &RootHints {
        &self.root_hints
    }

    /// Resolves `name` starting from a freshly loaded, rotated root hints
    /// list. Fails with [`DnsError::MaxDepthExceeded`] when the referral
    /// chain goes deeper than `max_depth`.
    pub fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
        max_depth: u32,
    ) -> Result<DnsAnswer, DnsError> {
        let roots = self.root_hints.load()?;
        debug!(
            name = %name,
            record_type = %record_type,
            roots = roots.len(),
            max_depth,
            "Starting recursive resolution"
        );

        let walk = RecursiveWalk {
            exchange: &self.exchange,
            ids: &self.ids,
            name,
            record_type,
            max_depth,
        };
        let answer = walk.walk(roots, 0)?;

        info!(
            name = %name,
            record_type = %record_type,
            records = answer.record_count(),
            "DNS resolution complete"
        );
        Ok(answer)
    }

    /// Asks `server` directly, with recursion desired.
    pub fn query_direct(
        &self,
        server: &str,
        name: &str,
        record_type: RecordType,
        mode: QueryMode,
    ) -> Result<DnsAnswer, DnsError> {
        let query = MessageBuilder::build_query(self.ids.next_id(), name, record_type, true)?;
        debug!(
            server = %server,
            name = %name,
            record_type = %record_type,
            mode = ?mode,
            id = query.id,
            "Direct DNS query"
        );

        let reply = self.exchange.exchange(server, &query, mode)?;
        ResponseParser::parse(&reply)
    }
}
