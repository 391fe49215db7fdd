use std::fmt;

/// Every state either endpoint passes through during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    // -- Opening states --
    Idle,        // Initiator before sending SYN
    Listening,   // Responder waiting for SYN
    SynSent,     // SYN sent, waiting for SYN-ACK
    SynReceived, // SYN-ACK sent, waiting for ACK

    // -- Steady state; opened --
    Established,

    // -- Active close (initiator) --
    FinSent,          // FIN sent, waiting for the responder's ACK
    WaitingServerFin, // FIN acknowledged, waiting for the responder's FIN

    // -- Passive close (responder) --
    WaitingClientFin, // Waiting for the initiator's FIN and the final ACK

    Closed,
}

impl HandshakeState {
    pub fn name(&self) -> &'static str {
        match self {
            HandshakeState::Idle => "IDLE",
            HandshakeState::Listening => "LISTENING",
            HandshakeState::SynSent => "SYN-SENT",
            HandshakeState::SynReceived => "SYN-RECEIVED",
            HandshakeState::Established => "ESTABLISHED",
            HandshakeState::FinSent => "FIN-SENT",
            HandshakeState::WaitingServerFin => "WAITING-SERVER-FIN",
            HandshakeState::WaitingClientFin => "WAITING-CLIENT-FIN",
            HandshakeState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
