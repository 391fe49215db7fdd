pub mod checksum;
pub mod display;
pub mod endpoint;
pub mod errors;
pub mod factory;
pub mod segment;
pub mod state;
pub mod tcp_flags;
pub mod transport;
pub mod wrap32;

// -- Re-export structs for more concise usage

pub use endpoint::initiator::Initiator;
pub use endpoint::responder::Responder;
pub use endpoint::{Direction, Transcript};
pub use errors::{HandshakeError, SegmentError};
pub use segment::{Segment, SEGMENT_LEN};
pub use state::HandshakeState;
pub use tcp_flags::TcpFlags;
pub use transport::{StreamTransport, Transport};
pub use wrap32::Wrap32;
