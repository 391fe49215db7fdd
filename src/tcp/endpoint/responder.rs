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

pub struct Listening;
pub struct SynReceived;
pub struct Established;
pub struct WaitingClientFin;
pub struct Closed;

pub trait ResponderState {
    const STATE: HandshakeState;
}

impl ResponderState for Listening {
    const STATE: HandshakeState = HandshakeState::Listening;
}
impl ResponderState for SynReceived {
    const STATE: HandshakeState = HandshakeState::SynReceived;
}
impl ResponderState for Established {
    const STATE: HandshakeState = HandshakeState::Established;
}
impl ResponderState for WaitingClientFin {
    const STATE: HandshakeState = HandshakeState::WaitingClientFin;
}
impl ResponderState for Closed {
    const STATE: HandshakeState = HandshakeState::Closed;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponderSeqs {
    pub client_isn: Wrap32,
    pub isn: Wrap32,            // Our SYN-ACK
    pub client_fin_seq: Wrap32,
    pub teardown_seq: Wrap32,   // Shared by our teardown ACK and FIN
}

/// The listening side, serving one connection.
pub struct Responder<State> {
    endpoint: Endpoint,
    seqs: ResponderSeqs,
    state: PhantomData<State>,
}

impl<S: ResponderState> Responder<S> {
    pub fn state(&self) -> HandshakeState {
        S::STATE
    }

    pub fn seqs(&self) -> &ResponderSeqs {
        &self.seqs
    }

    pub fn transcript(&self) -> &Transcript {
        self.endpoint.transcript()
    }

    fn advance<N: ResponderState>(self) -> Responder<N> {
        debug!(from = %S::STATE, to = %N::STATE, "responder transition");
        Responder {
            endpoint: self.endpoint,
            seqs: self.seqs,
            state: PhantomData,
        }
    }
}

impl Responder<Listening> {
    pub fn new(
        transport: Box<dyn Transport + Send>,
        rng: Box<dyn RngCore + Send>,
        sink: Box<dyn SegmentSink + Send>,
        config: Config,
    ) -> Self {
        Responder {
            endpoint: Endpoint::new(transport, rng, sink, config),
            seqs: ResponderSeqs::default(),
            state: PhantomData,
        }
    }

    pub fn run(self) -> Result<Responder<Closed>, HandshakeError> {
        self.accept()?.confirm()?.begin_close().finish()
    }

    /// Wait for SYN and answer with SYN-ACK.
    pub fn accept(mut self) -> Result<Responder<SynReceived>, HandshakeError> {
        let syn = self.endpoint.receive_valid(HandshakeState::Listening, TcpFlags::SYN)?;
        self.seqs.client_isn = syn.seq_no;

        let port = self.endpoint.port();
        let syn_ack = factory::build_syn_ack(syn.seq_no, &mut *self.endpoint.rng, port);
        self.seqs.isn = syn_ack.seq_no;

        self.endpoint.send("Sending SYN-ACK...", syn_ack)?;
        Ok(self.advance())
    }
}

impl Responder<SynReceived> {
    /// Wait for the ACK completing the handshake.
    pub fn confirm(mut self) -> Result<Responder<Established>, HandshakeError> {
        self.endpoint.receive_valid(HandshakeState::SynReceived, TcpFlags::ACK)?;

        self.endpoint.announce("TCP HANDSHAKE COMPLETE");
        info!(isn = %self.seqs.isn, client_isn = %self.seqs.client_isn, "handshake complete");
        Ok(self.advance())
    }
}

impl Responder<Established> {
    pub fn begin_close(mut self) -> Responder<WaitingClientFin> {
        self.endpoint.announce("BEGIN CLOSING SEQUENCE");
        self.advance()
    }
}

impl Responder<WaitingClientFin> {
    /// Acknowledge the client's FIN, send our own, wait for the final ACK and close.
    pub fn finish(mut self) -> Result<Responder<Closed>, HandshakeError> {
        let fin = self.endpoint.receive_valid(HandshakeState::WaitingClientFin, TcpFlags::FIN)?;
        self.seqs.client_fin_seq = fin.seq_no;
        self.seqs.teardown_seq = self.endpoint.fresh_seq();

        let port = self.endpoint.port();
        let ack = factory::build_teardown_ack(fin.seq_no, self.seqs.teardown_seq, port);
        self.endpoint.send("Sending ACK packet...", ack)?;

        let own_fin = factory::build_responder_fin(fin.seq_no, self.seqs.teardown_seq, port);
        self.endpoint.send("Sending FIN packet...", own_fin)?;

        self.endpoint.receive_valid(HandshakeState::WaitingClientFin, TcpFlags::ACK)?;
        self.endpoint.close()?;

        info!(teardown_seq = %self.seqs.teardown_seq, client_fin_seq = %self.seqs.client_fin_seq, "connection closed");
        Ok(self.advance())
    }
}

impl Responder<Closed> {
    pub fn into_transcript(self) -> Transcript {
        self.endpoint.transcript
    }
}

// -- Unit tests --
