//! One builder per protocol step.
//!
//! Every builder returns a fully populated, sealed [`Segment`]: both port fields carry
//! the simulation port and the checksum is computed after all other fields are final.
//! Builders that start a new sequence draw it from the supplied random source.

use rand::RngCore;
use crate::tcp::segment::Segment;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::wrap32::Wrap32;

fn segment(port: u16, flags: TcpFlags, seq_no: Wrap32, ack_no: Wrap32) -> Segment {
    Segment {
        src_port: port,
        dst_port: port,
        seq_no,
        ack_no,
        flags,
        ..Default::default()
    }
    .seal()
}

/// Draw a fresh initial sequence number. Uniqueness within a run is not enforced.
pub fn random_seq<R: RngCore + ?Sized>(rng: &mut R) -> Wrap32 {
    Wrap32::new(rng.next_u32())
}

/// Initiator's opening SYN.
pub fn build_syn<R: RngCore + ?Sized>(rng: &mut R, port: u16) -> Segment {
    segment(port, TcpFlags::SYN, random_seq(rng), Wrap32::new(0))
}

/// Responder's SYN-ACK, acknowledging the initiator's ISN.
pub fn build_syn_ack<R: RngCore + ?Sized>(client_seq: Wrap32, rng: &mut R, port: u16) -> Segment {
    segment(port, TcpFlags::SYN_ACK, random_seq(rng), client_seq.next())
}

/// Initiator's ACK completing the handshake.
pub fn build_ack(peer_seq: Wrap32, local_seq: Wrap32, port: u16) -> Segment {
    segment(port, TcpFlags::ACK, local_seq.next(), peer_seq.next())
}

/// Initiator's FIN, opening the teardown on a fresh sequence number.
pub fn build_fin<R: RngCore + ?Sized>(rng: &mut R, port: u16) -> Segment {
    segment(port, TcpFlags::FIN, random_seq(rng), Wrap32::new(0))
}

/// Responder's ACK of the initiator's FIN. `local_seq` is used as is.
pub fn build_teardown_ack(peer_fin_seq: Wrap32, local_seq: Wrap32, port: u16) -> Segment {
    segment(port, TcpFlags::ACK, local_seq, peer_fin_seq.next())
}

/// Responder's FIN, sent right after its teardown ACK with the same numbers.
pub fn build_responder_fin(peer_fin_seq: Wrap32, local_seq: Wrap32, port: u16) -> Segment {
    segment(port, TcpFlags::FIN, local_seq, peer_fin_seq.next())
}

/// Initiator's final ACK of the responder's FIN.
pub fn build_closing_ack(peer_seq: Wrap32, local_seq: Wrap32, port: u16) -> Segment {
    segment(port, TcpFlags::ACK, local_seq.next(), peer_seq.next())
}

// -- Unit tests --
