use std::io::{Read, Write};
use std::net::TcpStream;
use tracing::trace;
use crate::config::Config;
use crate::net::socket;
use crate::tcp::errors::HandshakeError;
use crate::tcp::segment::{Segment, SEGMENT_LEN};

/// A reliable, ordered channel carrying whole segment records.
pub trait Transport {
    /// Send one segment, returning the number of bytes written.
    fn send(&mut self, segment: &Segment) -> Result<usize, HandshakeError>;

    /// Block until one segment arrives.
    fn receive(&mut self) -> Result<Segment, HandshakeError>;

    fn close(&mut self) -> Result<(), HandshakeError>;
}

/// A [`Transport`] over any connected byte stream, one fixed-size record per segment.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: Option<S>,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(stream: S) -> Self {
        StreamTransport { stream: Some(stream) }
    }

    fn stream(&mut self) -> Result<&mut S, HandshakeError> {
        self.stream.as_mut().ok_or(HandshakeError::NotConnected)
    }
}

impl StreamTransport<TcpStream> {
    /// Wrap a connected TCP stream, applying the configured receive timeout.
    pub fn tcp(stream: TcpStream, config: &Config) -> Result<Self, HandshakeError> {
        if let Some(timeout) = config.recv_timeout {
            socket::set_timeout(&stream, timeout)?;
        }
        Ok(StreamTransport::new(stream))
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send(&mut self, segment: &Segment) -> Result<usize, HandshakeError> {
        let bytes = segment.encode();
        trace!(bytes = %hex::encode(bytes), "write segment");

        let stream = self.stream()?;
        stream.write_all(&bytes).map_err(HandshakeError::from_stream)?;
        stream.flush().map_err(HandshakeError::from_stream)?;
        Ok(bytes.len())
    }

    fn receive(&mut self) -> Result<Segment, HandshakeError> {
        let mut buf = [0u8; SEGMENT_LEN];
        self.stream()?.read_exact(&mut buf).map_err(HandshakeError::from_stream)?;
        trace!(bytes = %hex::encode(buf), "read segment");
        Ok(Segment::decode(&buf)?)
    }

    /// Drop the stream, closing the underlying descriptor. Later calls fail with `NotConnected`.
    fn close(&mut self) -> Result<(), HandshakeError> {
        let mut stream = self.stream.take().ok_or(HandshakeError::NotConnected)?;
        stream.flush()?;
        Ok(())
    }
}

// -- Unit tests --
