//! Connects to a responder on the loopback address and runs one handshake and teardown.

use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;
use clap::Parser;
use handshake_sim::config::{Config, ViolationPolicy};
use handshake_sim::net::socket;
use handshake_sim::tcp::display::{NullSink, SegmentSink, StdoutSink};
use handshake_sim::tcp::{Initiator, StreamTransport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "initiator", about = "Open a simulated TCP connection and close it again")]
struct Args {
    /// Port the responder listens on
    port: u16,

    #[arg(long, default_value_t = Ipv4Addr::LOCALHOST)]
    host: Ipv4Addr,

    /// Give up on a receive after this many milliseconds; waits forever when unset
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// What to do with a segment whose flags or checksum are wrong
    #[arg(long, value_enum, default_value_t = ViolationPolicy::Abort)]
    on_violation: ViolationPolicy,

    /// Seed for sequence numbers, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Do not print segments
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stream = match socket::connect(args.host, args.port) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("connect() error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut sink: Box<dyn SegmentSink + Send> = if args.quiet {
        Box::new(NullSink)
    } else {
        Box::new(StdoutSink)
    };
    sink.announce("Connected to server...");

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let config = Config::default()
        .policy(args.on_violation)
        .recv_timeout(args.timeout_ms.map(Duration::from_millis));
    let transport = match StreamTransport::tcp(stream, &config) {
        Ok(transport) => transport,
        Err(err) => {
            eprintln!("setsockopt() error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let initiator = Initiator::new(Box::new(transport), Box::new(rng), sink, config);
    match initiator.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("run failed: {err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
