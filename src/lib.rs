//! A simulated TCP three-way handshake and four-way teardown.
//!
//! Two endpoints exchange fixed-layout [`tcp::Segment`] records over an already
//! connected byte stream and walk through SYN, SYN-ACK, ACK, FIN, ACK, FIN, ACK,
//! checking each segment's checksum and flags before acting on it.

pub mod config;
pub mod net;
pub mod tcp;
