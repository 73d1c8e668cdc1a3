#![allow(dead_code)]
use mailnet_domain::{DnsError, SocketError};
use mailnet_infrastructure::dns::transport::{DnsExchange, QueryMode};
use mailnet_infrastructure::dns::wire::DnsQuery;
use mailnet_infrastructure::net::SocketTransport;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory transport: each `read` hands out (part of) the next scripted
/// chunk, `Ok(0)` once the script runs out. Writes are captured.
pub struct ScriptedTransport {
    name: &'static str,
    chunks: VecDeque<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    max_write: usize,
    reads: Arc<Mutex<usize>>,
}

impl ScriptedTransport {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            name: "SCRIPT",
            chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            written: Arc::new(Mutex::new(Vec::new())),
            max_write: usize::MAX,
            reads: Arc::new(Mutex::new(0)),
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Accept at most `n` bytes per write call.
    pub fn max_write(mut self, n: usize) -> Self {
        self.max_write = n;
        self
    }

    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        self.written.clone()
    }

    pub fn reads(&self) -> Arc<Mutex<usize>> {
        self.reads.clone()
    }
}

impl SocketTransport for ScriptedTransport {
    fn name(&self) -> &str {
        self.name
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, SocketError> {
        *self.reads.lock().unwrap() += 1;

        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        if chunk.is_empty() {
            return Err(SocketError::Timeout);
        }
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8], _timeout: Duration) -> Result<usize, SocketError> {
        let n = buf.len().min(self.max_write);
        self.written.lock().unwrap().extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

type Responder = Box<dyn Fn(&DnsQuery) -> Result<Vec<u8>, DnsError> + Send + Sync>;

/// In-memory [`DnsExchange`]: one responder per server name, and a log of
/// every (server, recursion desired) pair queried.
#[derive(Default)]
pub struct ScriptedExchange {
    responders: HashMap<String, Responder>,
    log: Mutex<Vec<(String, bool)>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, server: &str, responder: F) -> Self
    where
        F: Fn(&DnsQuery) -> Result<Vec<u8>, DnsError> + Send + Sync + 'static,
    {
        self.responders
            .insert(server.to_string(), Box::new(responder));
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(server, _)| server.clone())
            .collect()
    }

    pub fn recursion_flags(&self) -> Vec<bool> {
        self.log.lock().unwrap().iter().map(|(_, rd)| *rd).collect()
    }
}

impl DnsExchange for ScriptedExchange {
    fn exchange(
        &self,
        server: &str,
        query: &DnsQuery,
        _mode: QueryMode,
    ) -> Result<Vec<u8>, DnsError> {
        self.log
            .lock()
            .unwrap()
            .push((server.to_string(), query.recursion_desired));

        match self.responders.get(server) {
            Some(responder) => responder(query),
            None => Err(DnsError::Transport {
                server: server.to_string(),
                reason: "unreachable".to_string(),
            }),
        }
    }
}

/// Lets a test hand the exchange to a client and keep reading its log.
impl DnsExchange for &ScriptedExchange {
    fn exchange(
        &self,
        server: &str,
        query: &DnsQuery,
        mode: QueryMode,
    ) -> Result<Vec<u8>, DnsError> {
        <ScriptedExchange as DnsExchange>::exchange(self, server, query, mode)
    }
}
