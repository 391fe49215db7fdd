use bitflags::bitflags;

bitflags! {
    // Bit positions [ -, -, URG, ACK, PSH, RST, SYN, FIN ]
    // Only SYN, ACK and FIN are produced by the simulation. Other bits survive decoding
    // so a corrupted segment still fails the exact-match check.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TcpFlags: u8 {
        const ACK = 1 << 4;
        const SYN = 1 << 1;
        const FIN = 1 << 0;
    }
}

impl TcpFlags {
    /// The flag byte of the responder's handshake reply.
    pub const SYN_ACK: TcpFlags = TcpFlags::SYN.union(TcpFlags::ACK);

    /// Human readable name of the segment role, e.g. `SYN-ACK`.
    pub fn role(&self) -> String {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() || self.bits() & !TcpFlags::all().bits() != 0 {
            return format!("{:#04x}", self.bits());
        }
        // bitflags iterates in declaration order; handshake notation puts SYN first.
        let mut ordered = names;
        ordered.sort_by_key(|name| match *name {
            "SYN" => 0,
            "FIN" => 1,
            _ => 2,
        });
        ordered.join("-")
    }
}

// -- Unit tests --
