#![allow(dead_code)]
use mailnet_infrastructure::dns::transport::tcp::{
    read_with_length_prefix, write_with_length_prefix,
};
use std::net::{SocketAddr, TcpListener, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

type Handler = dyn Fn(&[u8], Protocol) -> Option<Vec<u8>> + Send + Sync;

/// Loopback DNS server answering UDP and TCP on the same port.
///
/// The handler sees each raw query; `None` means "stay silent".
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    threads: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&[u8], Protocol) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        let (udp, tcp) = bind_pair();
        let addr = udp.local_addr().unwrap();
        let handler: Arc<Handler> = Arc::new(handler);
        let shutdown = Arc::new(AtomicBool::new(false));
        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));

        udp.set_read_timeout(Some(Duration::from_millis(20))).unwrap();
        tcp.set_nonblocking(true).unwrap();

        let udp_thread = {
            let handler = handler.clone();
            let shutdown = shutdown.clone();
            let count = udp_queries.clone();
            thread::spawn(move || {
                let mut buf = vec![0u8; 4096];
                while !shutdown.load(Ordering::Relaxed) {
                    let Ok((len, peer)) = udp.recv_from(&mut buf) else {
                        continue;
                    };
                    count.fetch_add(1, Ordering::SeqCst);
                    if let Some(reply) = handler(&buf[..len], Protocol::Udp) {
                        let _ = udp.send_to(&reply, peer);
                    }
                }
            })
        };

        let tcp_thread = {
            let shutdown = shutdown.clone();
            let count = tcp_queries.clone();
            thread::spawn(move || {
                while !shutdown.load(Ordering::Relaxed) {
                    let Ok((mut stream, _)) = tcp.accept() else {
                        thread::sleep(Duration::from_millis(5));
                        continue;
                    };
                    stream.set_nonblocking(false).unwrap();
                    stream
                        .set_read_timeout(Some(Duration::from_secs(2)))
                        .unwrap();
                    let Ok(query) = read_with_length_prefix(&mut stream, "client") else {
                        continue;
                    };
                    count.fetch_add(1, Ordering::SeqCst);
                    if let Some(reply) = handler(&query, Protocol::Tcp) {
                        let _ = write_with_length_prefix(&mut stream, &reply);
                    }
                }
            })
        };

        Self {
            addr,
            shutdown,
            udp_queries,
            tcp_queries,
            threads: vec![udp_thread, tcp_thread],
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

/// UDP socket and TCP listener sharing one ephemeral loopback port.
fn bind_pair() -> (UdpSocket, TcpListener) {
    for _ in 0..10 {
        let udp = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = udp.local_addr().unwrap().port();
        if let Ok(tcp) = TcpListener::bind(("127.0.0.1", port)) {
            return (udp, tcp);
        }
    }
    panic!("could not bind UDP and TCP on a common port");
}
