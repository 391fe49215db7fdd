//! Session plumbing shared by both endpoints.
//!
//! An [`Endpoint`] owns the transport, the random source for sequence numbers,
//! the display sink and the run's [`Transcript`]. The typestate wrappers in
//! [`initiator`] and [`responder`] drive it through the protocol steps.

pub mod initiator;
pub mod responder;

use rand::RngCore;
use tracing::{debug, warn};
use crate::config::{Config, ViolationPolicy};
use crate::tcp::display::SegmentSink;
use crate::tcp::errors::HandshakeError;
use crate::tcp::factory;
use crate::tcp::segment::Segment;
use crate::tcp::state::HandshakeState;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::transport::Transport;
use crate::tcp::wrap32::Wrap32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Discarded segments kept in a transcript; later ones are only counted.
pub const MAX_RECORDED_DISCARDS: usize = 16;

/// Every segment an endpoint sent or received, in order.
///
/// Segments thrown away under [`ViolationPolicy::Stall`] are recorded up to
/// [`MAX_RECORDED_DISCARDS`], so a peer sending garbage cannot grow it without bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<(Direction, Segment)>,
    discarded: usize,
}

impl Transcript {
    fn record(&mut self, direction: Direction, segment: Segment) {
        self.entries.push((direction, segment));
    }

    fn record_discard(&mut self, segment: Segment) {
        if self.discarded < MAX_RECORDED_DISCARDS {
            self.record(Direction::Received, segment);
        }
        self.discarded += 1;
    }

    /// Received segments that failed validation, recorded or not.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn entries(&self) -> &[(Direction, Segment)] {
        &self.entries
    }

    /// Flag bytes of all recorded segments, in order.
    pub fn flags(&self) -> Vec<u8> {
        self.entries.iter().map(|(_, segment)| segment.flags.bits()).collect()
    }

    pub fn sent(&self) -> impl Iterator<Item = &Segment> {
        self.filter(Direction::Sent)
    }

    pub fn received(&self) -> impl Iterator<Item = &Segment> {
        self.filter(Direction::Received)
    }

    fn filter(&self, direction: Direction) -> impl Iterator<Item = &Segment> {
        self.entries
            .iter()
            .filter(move |(d, _)| *d == direction)
            .map(|(_, segment)| segment)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Endpoint {
    transport: Box<dyn Transport + Send>,
    rng: Box<dyn RngCore + Send>,
    sink: Box<dyn SegmentSink + Send>,
    config: Config,
    transcript: Transcript,
}

impl Endpoint {
    pub fn new(
        transport: Box<dyn Transport + Send>,
        rng: Box<dyn RngCore + Send>,
        sink: Box<dyn SegmentSink + Send>,
        config: Config,
    ) -> Self {
        Endpoint {
            transport,
            rng,
            sink,
            config,
            transcript: Transcript::default(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn port(&self) -> u16 {
        self.config.sim_port
    }

    fn fresh_seq(&mut self) -> Wrap32 {
        factory::random_seq(&mut *self.rng)
    }

    fn announce(&mut self, message: &str) {
        self.sink.announce(message);
    }

    /// Send one segment and record it.
    fn send(&mut self, announcement: &str, segment: Segment) -> Result<(), HandshakeError> {
        self.sink.announce(announcement);
        self.transport.send(&segment)?;
        debug!(
            flags = %segment.flags.role(),
            seq = %segment.seq_no,
            ack = %segment.ack_no,
            checksum = segment.checksum,
            "sent segment"
        );
        self.transcript.record(Direction::Sent, segment);
        Ok(())
    }

    /// Receive until a segment with exactly `expected` flags and a valid checksum arrives.
    ///
    /// What happens to a segment failing either check depends on the [`ViolationPolicy`].
    fn receive_valid(
        &mut self,
        state: HandshakeState,
        expected: TcpFlags,
    ) -> Result<Segment, HandshakeError> {
        loop {
            let segment = self.transport.receive()?;

            let computed = segment.compute_checksum();
            if segment.flags == expected && segment.checksum == computed {
                debug!(
                    %state,
                    flags = %segment.flags.role(),
                    seq = %segment.seq_no,
                    ack = %segment.ack_no,
                    "received segment"
                );
                self.transcript.record(Direction::Received, segment);
                self.sink.present(&format!("{} packet received", expected.role()), &segment);
                return Ok(segment);
            }

            let violation = HandshakeError::ProtocolViolation {
                state,
                expected,
                got: segment.flags,
                carried: segment.checksum,
                computed,
            };
            match self.config.policy {
                ViolationPolicy::Abort => {
                    warn!(%state, "{violation}; aborting");
                    self.transcript.record(Direction::Received, segment);
                    return Err(violation);
                }
                ViolationPolicy::Stall => {
                    warn!(%state, "{violation}; discarding");
                    self.transcript.record_discard(segment);
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), HandshakeError> {
        self.transport.close()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use crate::tcp::errors::HandshakeError;
    use crate::tcp::segment::Segment;
    use crate::tcp::transport::Transport;

    /// Replays a fixed list of incoming segments and records what is sent.
    /// Once the script runs dry the peer appears to hang up.
    #[derive(Clone, Default)]
    pub struct ScriptedTransport {
        pub incoming: Arc<Mutex<VecDeque<Segment>>>,
        pub outgoing: Arc<Mutex<Vec<Segment>>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl ScriptedTransport {
        pub fn new(incoming: Vec<Segment>) -> Self {
            ScriptedTransport {
                incoming: Arc::new(Mutex::new(incoming.into())),
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<Segment> {
            self.outgoing.lock().unwrap().clone()
        }

        pub fn is_closed(&self) -> bool {
            *self.closed.lock().unwrap()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&mut self, segment: &Segment) -> Result<usize, HandshakeError> {
            self.outgoing.lock().unwrap().push(*segment);
            Ok(crate::tcp::segment::SEGMENT_LEN)
        }

        fn receive(&mut self) -> Result<Segment, HandshakeError> {
            self.incoming
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(HandshakeError::ConnectionClosed)
        }

        fn close(&mut self) -> Result<(), HandshakeError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Same segment, wrong checksum.
    pub fn corrupt(segment: Segment) -> Segment {
        Segment { checksum: segment.checksum ^ 0x5a5a, ..segment }
    }
}

// -- Unit tests --
