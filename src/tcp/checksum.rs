//! The segment checksum: a one's-complement fold-sum over the first
//! [`CHECKSUM_SPAN`] bytes of an encoded segment.
//!
//! The summed range ends right before the checksum field, so a segment's own
//! checksum never feeds into its computation. This is an integrity check for
//! the simulation only, not a security mechanism.

/// Number of leading segment bytes covered by the checksum (twelve 16-bit words).
pub const CHECKSUM_SPAN: usize = 24;

/// Compute the checksum over the segment prefix.
///
/// Sums the prefix as big-endian 16-bit words into a 32-bit accumulator, folds
/// the carry into the low 16 bits twice and returns the one's complement.
pub fn compute(prefix: &[u8; CHECKSUM_SPAN]) -> u16 {
    let mut sum: u32 = 0;

    for word in prefix.chunks_exact(2) {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
    }

    // The first fold can itself carry, hence the second one
    sum = (sum & 0xffff) + (sum >> 16);
    sum = (sum & 0xffff) + (sum >> 16);

    0xffff ^ (sum as u16)
}

// -- Unit tests --
