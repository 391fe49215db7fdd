use std::fmt;
use crate::tcp::checksum::{self, CHECKSUM_SPAN};
use crate::tcp::errors::SegmentError;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::wrap32::Wrap32;

/// Size of one segment record on the wire.
pub const SEGMENT_LEN: usize = 32;

/// The fixed-layout record exchanged by both endpoints, modelled on a TCP header.
///
/// Wire layout, all fields big-endian:
///
/// ```text
///  0 src port (2)    2 dst port (2)    4 seq (4)       8 ack (4)
/// 12 header len (4) 16 reserved (4)   20 flags (2)    22 window (2)
/// 24 checksum (2)   26 urgent (2)     28 options (4)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_no: Wrap32,
    pub ack_no: Wrap32,
    pub header_length: u32, // Not interpreted
    pub reserved: u32,      // Not interpreted
    pub flags: TcpFlags,
    pub window: u16, // Flow control is not modelled; always 0
    pub checksum: u16,
    pub urgent: u16,
    pub options: u32,
}

impl Default for Segment {
    fn default() -> Self {
        Segment {
            src_port: 0,
            dst_port: 0,
            seq_no: Wrap32::new(0),
            ack_no: Wrap32::new(0),
            header_length: 0,
            reserved: 0,
            flags: TcpFlags::empty(),
            window: 0,
            checksum: 0,
            urgent: 0,
            options: 0,
        }
    }
}

impl Segment {
    /// Convert a `Segment` into its wire record. The checksum field is written as carried.
    pub fn encode(&self) -> [u8; SEGMENT_LEN] {
        let mut buf = [0u8; SEGMENT_LEN];

        buf[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        buf[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        buf[4..8].copy_from_slice(&self.seq_no.value().to_be_bytes());
        buf[8..12].copy_from_slice(&self.ack_no.value().to_be_bytes());
        buf[12..16].copy_from_slice(&self.header_length.to_be_bytes());
        buf[16..20].copy_from_slice(&self.reserved.to_be_bytes());
        buf[20..22].copy_from_slice(&(self.flags.bits() as u16).to_be_bytes());
        buf[22..24].copy_from_slice(&self.window.to_be_bytes());
        buf[24..26].copy_from_slice(&self.checksum.to_be_bytes());
        buf[26..28].copy_from_slice(&self.urgent.to_be_bytes());
        buf[28..32].copy_from_slice(&self.options.to_be_bytes());

        buf
    }

    /// Convert a wire record into a `Segment`.
    ///
    /// The checksum is carried over untouched; judging it is up to the receiver.
    pub fn decode(buf: &[u8]) -> Result<Self, SegmentError> {
        if buf.len() != SEGMENT_LEN {
            return Err(SegmentError::InvalidBuffer { expected: SEGMENT_LEN, actual: buf.len() })
        }

        let flags_word = u16::from_be_bytes([buf[20], buf[21]]);
        if flags_word > u8::MAX as u16 {
            return Err(SegmentError::InvalidFlags(flags_word))
        }

        Ok(Segment {
            src_port: u16::from_be_bytes([buf[0], buf[1]]),
            dst_port: u16::from_be_bytes([buf[2], buf[3]]),
            seq_no: Wrap32::new(u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]])),
            ack_no: Wrap32::new(u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]])),
            header_length: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
            reserved: u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]]),
            flags: TcpFlags::from_bits_retain(flags_word as u8),
            window: u16::from_be_bytes([buf[22], buf[23]]),
            checksum: u16::from_be_bytes([buf[24], buf[25]]),
            urgent: u16::from_be_bytes([buf[26], buf[27]]),
            options: u32::from_be_bytes([buf[28], buf[29], buf[30], buf[31]]),
        })
    }

    /// Compute the checksum this segment should carry. Reads only; `self.checksum` is untouched.
    pub fn compute_checksum(&self) -> u16 {
        let buf = self.encode();
        let mut prefix = [0u8; CHECKSUM_SPAN];
        prefix.copy_from_slice(&buf[..CHECKSUM_SPAN]);
        checksum::compute(&prefix)
    }

    /// Stamp the checksum. Must be the last field written.
    pub fn seal(mut self) -> Self {
        self.checksum = self.compute_checksum();
        self
    }

    pub fn has_valid_checksum(&self) -> bool {
        self.checksum == self.compute_checksum()
    }
}

/// Labelled field table, one zero-padded hex value per line.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>15}        0x{:04X}", "Source:", self.src_port)?;
        writeln!(f, "{:>15}        0x{:04X}", "Destination:", self.dst_port)?;
        writeln!(f, "{:>15}        0x{:04X}", "Seq:", self.seq_no)?;
        writeln!(f, "{:>15}        0x{:04X}", "ACK:", self.ack_no)?;
        writeln!(f, "{:>15}        0x{:04X}", "Header Length:", self.header_length)?;
        writeln!(f, "{:>15}        0x{:04X}", "Flags:", self.flags.bits())?;
        writeln!(f, "{:>15}        0x{:04X}", "Rec:", self.window)?;
        writeln!(f, "{:>15}        0x{:04X}", "Cksum:", self.checksum)?;
        writeln!(f, "{:>15}        0x{:04X}", "Ptr:", self.urgent)?;
        write!(f, "{:>15}        0x{:04X}", "Opt:", self.options)
    }
}

// -- Unit tests --
