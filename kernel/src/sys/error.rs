/// Errors reported by the OS abstraction layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysError {
    /// Operation on a primitive that is no longer live (invalidated or
    /// destroyed), or a nonsensical argument such as a zero capacity.
    InvalidArgument,
    /// Allocation failed while constructing a primitive.
    OutOfMemory,
    /// A blocking wait exceeded its deadline.
    TimedOut,
    /// Non-blocking post found the queue full.
    Full,
    /// Non-blocking fetch found the queue empty.
    Empty,
}

impl core::fmt::Display for SysError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SysError::InvalidArgument => write!(f, "invalid argument or dead primitive"),
            SysError::OutOfMemory => write!(f, "out of memory"),
            SysError::TimedOut => write!(f, "wait timed out"),
            SysError::Full => write!(f, "mailbox full"),
            SysError::Empty => write!(f, "mailbox empty"),
        }
    }
}
