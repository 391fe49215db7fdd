//! Listens on all interfaces, serves exactly one simulated connection and exits.

use std::process::ExitCode;
use std::time::Duration;
use clap::Parser;
use handshake_sim::config::{Config, ViolationPolicy};
use handshake_sim::net::socket;
use handshake_sim::tcp::display::{NullSink, SegmentSink, StdoutSink};
use handshake_sim::tcp::{Responder, StreamTransport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "responder", about = "Accept one simulated TCP connection and see it closed")]
struct Args {
    /// Port to listen on
    port: u16,

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

    let listener = match socket::new_listener(args.port) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("listen() error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut sink: Box<dyn SegmentSink + Send> = if args.quiet {
        Box::new(NullSink)
    } else {
        Box::new(StdoutSink)
    };
    sink.announce("Server created successfully, listening...");

    let (stream, peer) = match listener.accept() {
        Ok(accepted) => accepted,
        Err(err) => {
            eprintln!("accept() error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(%peer, "client connected");
    sink.announce("Client connected...");

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

    let responder = Responder::new(Box::new(transport), Box::new(rng), sink, config);
    match responder.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("run failed: {err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
