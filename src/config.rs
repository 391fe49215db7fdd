use std::time::Duration;

/// Port stamped into both port fields of every segment. No multiplexing is modelled.
pub const SIM_PORT: u16 = 4040;

/// What an endpoint does with a segment that fails its flag or checksum check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViolationPolicy {
    /// End the run with a protocol violation error.
    #[default]
    Abort,
    /// Discard the segment and keep waiting for a valid one.
    Stall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sim_port: u16,
    pub policy: ViolationPolicy,
    /// `None` blocks forever on every receive.
    pub recv_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sim_port: SIM_PORT,
            policy: ViolationPolicy::default(),
            recv_timeout: None,
        }
    }
}

impl Config {
    pub fn policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }
}
