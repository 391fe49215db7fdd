use std::marker::PhantomData;
use rand::RngCore;
use tracing::{debug, info};
use crate::config::Config;
use crate::tcp::display::SegmentSink;
use crate::tcp::endpoint::{Endpoint, Transcript};
use crate::tcp::errors::HandshakeError;
use crate::tcp::factory;
use crate::tcp::state::HandshakeState;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::transport::Transport;
use crate::tcp::wrap32::Wrap32;

pub struct Idle;
pub struct SynSent;
pub struct Established;
pub struct FinSent;
pub struct WaitingServerFin;
pub struct Closed;

pub trait InitiatorState {
    const STATE: HandshakeState;
}

impl InitiatorState for Idle {
    const STATE: HandshakeState = HandshakeState::Idle;
}
impl InitiatorState for SynSent {
    const STATE: HandshakeState = HandshakeState::SynSent;
}
impl InitiatorState for Established {
    const STATE: HandshakeState = HandshakeState::Established;
}
impl InitiatorState for FinSent {
    const STATE: HandshakeState = HandshakeState::FinSent;
}
impl InitiatorState for WaitingServerFin {
    const STATE: HandshakeState = HandshakeState::WaitingServerFin;
}
impl InitiatorState for Closed {
    const STATE: HandshakeState = HandshakeState::Closed;
}

/// Sequence numbers the initiator tracks over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitiatorSeqs {
    pub isn: Wrap32,          // Our SYN
    pub peer_isn: Wrap32,     // Responder's SYN-ACK
    pub fin_seq: Wrap32,      // Our FIN
    pub peer_fin_seq: Wrap32, // Responder's FIN
}

/// The connecting side. Each transition consumes the session and returns it in the next state.
pub struct Initiator<State> {
    endpoint: Endpoint,
    seqs: InitiatorSeqs,
    state: PhantomData<State>,
}

impl<S: InitiatorState> Initiator<S> {
    pub fn state(&self) -> HandshakeState {
        S::STATE
    }

    pub fn seqs(&self) -> &InitiatorSeqs {
        &self.seqs
    }

    pub fn transcript(&self) -> &Transcript {
        self.endpoint.transcript()
    }

    fn advance<N: InitiatorState>(self) -> Initiator<N> {
        debug!(from = %S::STATE, to = %N::STATE, "initiator transition");
        Initiator {
            endpoint: self.endpoint,
            seqs: self.seqs,
            state: PhantomData,
        }
    }
}

impl Initiator<Idle> {
    pub fn new(
        transport: Box<dyn Transport + Send>,
        rng: Box<dyn RngCore + Send>,
        sink: Box<dyn SegmentSink + Send>,
        config: Config,
    ) -> Self {
        Initiator {
            endpoint: Endpoint::new(transport, rng, sink, config),
            seqs: InitiatorSeqs::default(),
            state: PhantomData,
        }
    }

    /// Run the whole handshake and teardown.
    pub fn run(self) -> Result<Initiator<Closed>, HandshakeError> {
        self.connect()?.complete()?.close()?.await_ack()?.await_fin()
    }

    /// Send SYN on a fresh initial sequence number.
    pub fn connect(mut self) -> Result<Initiator<SynSent>, HandshakeError> {
        let port = self.endpoint.port();
        let syn = factory::build_syn(&mut *self.endpoint.rng, port);
        self.seqs.isn = syn.seq_no;

        self.endpoint.sink.present("SYN packet initialized", &syn);
        self.endpoint.send("Sending SYN packet...", syn)?;
        Ok(self.advance())
    }
}

impl Initiator<SynSent> {
    /// Wait for SYN-ACK and acknowledge it.
    pub fn complete(mut self) -> Result<Initiator<Established>, HandshakeError> {
        let syn_ack = self.endpoint.receive_valid(HandshakeState::SynSent, TcpFlags::SYN_ACK)?;
        self.seqs.peer_isn = syn_ack.seq_no;

        let ack = factory::build_ack(syn_ack.seq_no, self.seqs.isn, self.endpoint.port());
        self.endpoint.send("Sending ACK packet...", ack)?;

        self.endpoint.announce("TCP HANDSHAKE COMPLETE");
        info!(isn = %self.seqs.isn, peer_isn = %self.seqs.peer_isn, "handshake complete");
        Ok(self.advance())
    }
}

impl Initiator<Established> {
    /// Start the teardown with a FIN on a fresh sequence number.
    pub fn close(mut self) -> Result<Initiator<FinSent>, HandshakeError> {
        self.endpoint.announce("BEGIN CLOSING SEQUENCE");

        let port = self.endpoint.port();
        let fin = factory::build_fin(&mut *self.endpoint.rng, port);
        self.seqs.fin_seq = fin.seq_no;

        self.endpoint.send("Sending FIN packet...", fin)?;
        Ok(self.advance())
    }
}

impl Initiator<FinSent> {
    /// Wait for the responder to acknowledge our FIN.
    pub fn await_ack(mut self) -> Result<Initiator<WaitingServerFin>, HandshakeError> {
        self.endpoint.receive_valid(HandshakeState::FinSent, TcpFlags::ACK)?;
        Ok(self.advance())
    }
}

impl Initiator<WaitingServerFin> {
    /// Wait for the responder's FIN, acknowledge it and close the transport.
    pub fn await_fin(mut self) -> Result<Initiator<Closed>, HandshakeError> {
        let fin = self.endpoint.receive_valid(HandshakeState::WaitingServerFin, TcpFlags::FIN)?;
        self.seqs.peer_fin_seq = fin.seq_no;

        let ack = factory::build_closing_ack(fin.seq_no, self.seqs.fin_seq, self.endpoint.port());
        self.endpoint.send("Sending ACK packet...", ack)?;
        self.endpoint.close()?;

        info!(fin_seq = %self.seqs.fin_seq, peer_fin_seq = %self.seqs.peer_fin_seq, "connection closed");
        Ok(self.advance())
    }
}

impl Initiator<Closed> {
    pub fn into_transcript(self) -> Transcript {
        self.endpoint.transcript
    }
}

// -- Unit tests --
