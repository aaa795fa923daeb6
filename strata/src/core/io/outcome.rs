/// Result of a successful read.
///
/// Reads never signal end-of-stream through a zero byte count. A channel returns
/// [`ReadOutcome::Data`] with zero bytes only when the caller buffer is empty, or when a
/// non-blocking backend has nothing available yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Number of bytes placed at the beginning of the caller buffer.
    Data(usize),
    /// No more bytes will ever be available.
    EndOfStream,
}

impl ReadOutcome {
    /// Number of bytes read, `0` at the end of stream.
    pub fn bytes(&self) -> usize {
        match self {
            ReadOutcome::Data(n) => *n,
            ReadOutcome::EndOfStream => 0,
        }
    }

    /// Returns `true` at the end of stream.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}
