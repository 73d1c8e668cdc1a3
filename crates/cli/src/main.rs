use clap::{Parser, Subcommand};
use mailnet_domain::{CliOverrides, Config, DnsAnswer, RecordData, RecordType};
use mailnet_infrastructure::{BufferedSocket, DnsClient, LineBuffer, QueryMode};
use std::net::TcpStream;
use tracing::{debug, error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "mailnet")]
#[command(version)]
#[command(about = "mailnet - mail server network diagnostics")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Server root path (holds the root hints file)
    #[arg(long, global = true)]
    root_path: Option<String>,

    /// DNS server port
    #[arg(long, global = true)]
    dns_port: Option<u16>,

    /// Per-attempt DNS timeout in milliseconds
    #[arg(long, global = true)]
    dns_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a name by walking down from the root servers
    Resolve {
        name: String,

        #[arg(short = 't', long = "type", default_value = "MX")]
        record_type: RecordType,

        /// Maximum referral depth (defaults to dns.max_depth)
        #[arg(long)]
        max_depth: Option<u32>,
    },

    /// Ask one server directly, recursion desired
    Query {
        server: String,

        name: String,

        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: RecordType,

        /// Use TCP instead of UDP
        #[arg(long)]
        tcp: bool,
    },

    /// Read a mail server greeting, then say QUIT
    Banner {
        host: String,

        #[arg(short = 'p', long, default_value_t = 25)]
        port: u16,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let max_depth = match &cli.command {
        Command::Resolve { max_depth, .. } => *max_depth,
        _ => None,
    };
    let cli_overrides = CliOverrides {
        root_path: cli.root_path.clone(),
        dns_port: cli.dns_port,
        dns_timeout_ms: cli.dns_timeout_ms,
        max_depth,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    let client = DnsClient::from_config(&config);

    let result = match cli.command {
        Command::Resolve {
            name, record_type, ..
        } => {
            info!(
                name = %name,
                record_type = %record_type,
                roots = %client.root_hints().path().display(),
                "Resolving"
            );
            client.resolve(&name, record_type, config.dns.max_depth)
        }
        Command::Query {
            server,
            name,
            record_type,
            tcp,
        } => {
            let mode = if tcp { QueryMode::Tcp } else { QueryMode::Udp };
            client.query_direct(&server, &name, record_type, mode)
        }
        Command::Banner { host, port } => return banner(&config, &host, port),
    };

    match result {
        Ok(answer) => {
            print_answer(&answer);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "DNS lookup failed");
            Err(e.into())
        }
    }
}

fn print_answer(answer: &DnsAnswer) {
    println!(
        ";; authoritative: {}, answers: {}, authority: {}, additional: {}",
        answer.authoritative, answer.an_count, answer.ns_count, answer.ar_count
    );

    for (record_type, records) in answer.iter() {
        for record in records {
            let data = match &record.data {
                RecordData::A(addr) => addr.to_string(),
                RecordData::AAAA(addr) => addr.to_string(),
                RecordData::CNAME(name) | RecordData::NS(name) | RecordData::PTR(name) => {
                    name.clone()
                }
                RecordData::MX {
                    preference,
                    exchange,
                } => format!("{} {}", preference, exchange),
                RecordData::SOA(soa) => format!(
                    "{} {} {} {} {} {} {}",
                    soa.primary,
                    soa.mailbox,
                    soa.serial,
                    soa.refresh,
                    soa.retry,
                    soa.expire,
                    soa.min_ttl
                ),
            };
            println!("{}\t{}\t{}\t{}", record.name, record.ttl, record_type, data);
        }
    }
}

fn banner(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let timeout = config.socket.timeout();
    let stream = TcpStream::connect((host, port))?;
    let mut sock = BufferedSocket::attach(stream, config.socket.buffer_size)?;
    let mut line = LineBuffer::new(Some(config.socket.line_buffer_size))?;
    debug!(
        host = %host,
        port,
        transport = sock.transport_name(),
        "Connected"
    );

    println!("{}", String::from_utf8_lossy(line.get(&mut sock, timeout)?));
    sock.write_line("QUIT", timeout)?;
    println!("{}", String::from_utf8_lossy(line.get(&mut sock, timeout)?));

    sock.detach(true);
    Ok(())
}
