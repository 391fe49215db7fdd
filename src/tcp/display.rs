use std::io::{self, Write};
use crate::tcp::segment::Segment;

/// Where an endpoint reports its progress for a human to follow.
pub trait SegmentSink {
    /// A one-line progress message, e.g. `Sending SYN packet...`.
    fn announce(&mut self, message: &str);

    /// A segment, rendered under a title.
    fn present(&mut self, title: &str, segment: &Segment);
}

/// Prints to standard output in the layout of [`Segment`]'s `Display` impl.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl SegmentSink for StdoutSink {
    fn announce(&mut self, message: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout is not worth failing a run over
        let _ = writeln!(out, "\n{message}");
    }

    fn present(&mut self, title: &str, segment: &Segment) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\n{title}...\n{segment}");
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl SegmentSink for NullSink {
    fn announce(&mut self, _message: &str) {}

    fn present(&mut self, _title: &str, _segment: &Segment) {}
}
