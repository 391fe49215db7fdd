use std::io;
use nix::errno::Errno;
use thiserror::Error;
use crate::tcp::state::HandshakeState;
use crate::tcp::tcp_flags::TcpFlags;

#[derive(Debug, PartialEq, Error)]
pub enum SegmentError {
    #[error("Invalid buffer: expected {expected} bytes, actual {actual} bytes")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Invalid flags word: {0:#06x}")]
    InvalidFlags(u16),
}

#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error), // Wrapper around std::io::Error

    #[error("Segment error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Socket error: {0}")]
    Socket(#[from] Errno), // Socket setup through nix

    #[error(
        "Protocol violation in {state}: expected {} with checksum {computed:#06x}, got {} with checksum {carried:#06x}",
        .expected.role(),
        .got.role()
    )]
    ProtocolViolation {
        state: HandshakeState,
        expected: TcpFlags,
        got: TcpFlags,
        carried: u16,
        computed: u16,
    },

    #[error("Timed out waiting for a segment")]
    Timeout, // EAGAIN from SO_RCVTIMEO

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Transport is not connected")]
    NotConnected,
}

impl HandshakeError {
    /// Classify a stream error: timeouts and EOF get their own variants.
    pub fn from_stream(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => HandshakeError::Timeout,
            io::ErrorKind::UnexpectedEof => HandshakeError::ConnectionClosed,
            _ => HandshakeError::Io(err),
        }
    }
}
