//! End-to-end runs of both endpoints against each other.
//!
//! Each test runs the responder on a background thread and the initiator on
//! the test thread, over either a Unix socket pair or a real loopback TCP
//! connection.

use std::io::{Read, Write};
use std::net::Ipv4Addr;
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::Duration;

use handshake_sim::config::{Config, ViolationPolicy};
use handshake_sim::net::socket;
use handshake_sim::tcp::display::NullSink;
use handshake_sim::tcp::factory;
use handshake_sim::tcp::{
    Direction, HandshakeError, HandshakeState, Initiator, Responder, Segment, StreamTransport,
    TcpFlags, Transcript, Wrap32, SEGMENT_LEN,
};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

// -- Helpers --

fn run_pair(client: UnixStream, server: UnixStream) -> (Transcript, Transcript) {
    let responder = thread::spawn(move || {
        Responder::new(
            Box::new(StreamTransport::new(server)),
            Box::new(StepRng::new(5000, 1)),
            Box::new(NullSink),
            Config::default(),
        )
        .run()
        .map(|closed| closed.into_transcript())
    });

    let initiator = Initiator::new(
        Box::new(StreamTransport::new(client)),
        Box::new(StepRng::new(1000, 1)),
        Box::new(NullSink),
        Config::default(),
    )
    .run()
    .expect("initiator run failed");

    let responder = responder
        .join()
        .expect("responder thread panicked")
        .expect("responder run failed");
    (initiator.into_transcript(), responder)
}

fn seq_ack(segment: &Segment) -> (u32, u32) {
    (segment.seq_no.value(), segment.ack_no.value())
}

// -- Tests --

#[test]
fn handshake_ack_numbers_agree() {
    let (client, server) = UnixStream::pair().unwrap();
    let (initiator, _) = run_pair(client, server);

    let entries = initiator.entries();
    let (_, syn) = entries[0];
    let (_, syn_ack) = entries[1];
    let (_, ack) = entries[2];

    assert_eq!(syn_ack.ack_no, syn.seq_no + 1);
    assert_eq!(ack.ack_no, syn_ack.seq_no + 1);
    assert_eq!(ack.seq_no, syn.seq_no + 1);
}

#[test]
fn full_run_is_deterministic_with_fixed_sequence_source() {
    let (client, server) = UnixStream::pair().unwrap();
    let (initiator, responder) = run_pair(client, server);

    // The initiator sees every segment of the exchange in protocol order
    assert_eq!(initiator.flags(), vec![0x02, 0x12, 0x10, 0x01, 0x10, 0x01, 0x10]);
    assert_eq!(responder.flags(), initiator.flags());

    let numbers: Vec<(u32, u32)> = initiator.entries().iter().map(|(_, s)| seq_ack(s)).collect();
    assert_eq!(
        numbers,
        vec![
            (1000, 0),    // SYN
            (5000, 1001), // SYN-ACK
            (1001, 5001), // ACK
            (1001, 0),    // FIN
            (5001, 1002), // ACK
            (5001, 1002), // FIN
            (1002, 5002), // ACK
        ]
    );

    let directions: Vec<Direction> = initiator.entries().iter().map(|(d, _)| *d).collect();
    use Direction::{Received, Sent};
    assert_eq!(directions, vec![Sent, Received, Sent, Sent, Received, Received, Sent]);

    // What one side sent is exactly what the other received
    let sent: Vec<Segment> = initiator.sent().copied().collect();
    let received: Vec<Segment> = responder.received().copied().collect();
    assert_eq!(sent, received);
    assert!(initiator.entries().iter().all(|(_, s)| s.has_valid_checksum()));
}

#[test]
fn seeded_runs_repeat() {
    fn run_seeded() -> Vec<(u32, u32)> {
        let (client, server) = UnixStream::pair().unwrap();
        let responder = thread::spawn(move || {
            Responder::new(
                Box::new(StreamTransport::new(server)),
                Box::new(StdRng::seed_from_u64(2)),
                Box::new(NullSink),
                Config::default(),
            )
            .run()
            .map(|_| ())
        });
        let transcript = Initiator::new(
            Box::new(StreamTransport::new(client)),
            Box::new(StdRng::seed_from_u64(1)),
            Box::new(NullSink),
            Config::default(),
        )
        .run()
        .unwrap()
        .into_transcript();
        responder.join().unwrap().unwrap();
        transcript.entries().iter().map(|(_, s)| seq_ack(s)).collect()
    }

    assert_eq!(run_seeded(), run_seeded());
}

#[test]
fn full_run_over_loopback_tcp() {
    let listener = socket::new_listener(0).unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = Config::default().recv_timeout(Some(Duration::from_secs(5)));

    let server_config = config.clone();
    let responder = thread::spawn(move || {
        let (stream, _) = listener.accept()?;
        let transport = StreamTransport::tcp(stream, &server_config)?;
        Responder::new(
            Box::new(transport),
            Box::new(StdRng::seed_from_u64(7)),
            Box::new(NullSink),
            server_config,
        )
        .run()
        .map(|closed| closed.state())
    });

    let stream = socket::connect(Ipv4Addr::LOCALHOST, port).unwrap();
    let transport = StreamTransport::tcp(stream, &config).unwrap();
    let closed = Initiator::new(
        Box::new(transport),
        Box::new(StdRng::seed_from_u64(8)),
        Box::new(NullSink),
        config,
    )
    .run()
    .unwrap();

    assert_eq!(closed.state(), HandshakeState::Closed);
    assert_eq!(responder.join().unwrap().unwrap(), HandshakeState::Closed);
}

#[test]
fn corrupt_syn_never_gets_a_reply() {
    let (mut peer, server) = UnixStream::pair().unwrap();

    let mut syn = factory::build_syn(&mut StepRng::new(1, 1), 4040);
    syn.checksum ^= 0x0100;
    peer.write_all(&syn.encode()).unwrap();

    let result = Responder::new(
        Box::new(StreamTransport::new(server)),
        Box::new(StepRng::new(5000, 1)),
        Box::new(NullSink),
        Config::default().policy(ViolationPolicy::Abort),
    )
    .accept();
    assert!(matches!(
        result,
        Err(HandshakeError::ProtocolViolation { state: HandshakeState::Listening, .. })
    ));
    drop(result);

    // The responder is gone and wrote nothing back
    let mut buf = Vec::new();
    peer.read_to_end(&mut buf).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn stalled_responder_waits_for_a_valid_syn() {
    let (mut peer, server) = UnixStream::pair().unwrap();

    let responder = thread::spawn(move || {
        Responder::new(
            Box::new(StreamTransport::new(server)),
            Box::new(StepRng::new(5000, 1)),
            Box::new(NullSink),
            Config::default().policy(ViolationPolicy::Stall),
        )
        .accept()
        .map(|session| session.seqs().client_isn)
    });

    let syn = factory::build_syn(&mut StepRng::new(42, 1), 4040);
    let wrong_flags = Segment { flags: TcpFlags::FIN, ..syn }.seal();
    let bad_checksum = Segment { checksum: !syn.checksum, ..syn };
    peer.write_all(&wrong_flags.encode()).unwrap();
    peer.write_all(&bad_checksum.encode()).unwrap();
    peer.write_all(&syn.encode()).unwrap();

    // The only reply is the SYN-ACK for the valid SYN
    let mut buf = [0u8; SEGMENT_LEN];
    peer.read_exact(&mut buf).unwrap();
    let syn_ack = Segment::decode(&buf).unwrap();
    assert_eq!(syn_ack.flags, TcpFlags::SYN_ACK);
    assert_eq!(syn_ack.ack_no, Wrap32::new(43));

    assert_eq!(responder.join().unwrap().unwrap(), Wrap32::new(42));
}

#[test]
fn silent_peer_times_out() {
    let listener = socket::new_listener(0).unwrap();
    let port = listener.local_addr().unwrap().port();

    let _client = socket::connect(Ipv4Addr::LOCALHOST, port).unwrap();
    let (stream, _) = listener.accept().unwrap();

    let config = Config::default().recv_timeout(Some(Duration::from_millis(100)));
    let transport = StreamTransport::tcp(stream, &config).unwrap();
    let result = Responder::new(
        Box::new(transport),
        Box::new(StepRng::new(0, 1)),
        Box::new(NullSink),
        config,
    )
    .accept();

    assert!(matches!(result, Err(HandshakeError::Timeout)));
}
