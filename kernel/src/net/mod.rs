/// Networking: the uhyve virtual NIC driver, its hypercall transport,
/// the frame handoff into the protocol stack, and interface bookkeeping.
pub mod driver;
pub mod frame;
pub mod hypercall;
pub mod mock;
pub mod registry;
pub mod setup;
pub mod stack_port;

#[cfg(not(test))]
pub mod irq;

#[cfg(test)]
mod tests;

pub use driver::{LinkStats, NetifFlags, UhyveNet};
pub use frame::FrameChain;
pub use hypercall::HypercallPort;
pub use registry::{IfaceId, NetifRegistry};
pub use stack_port::{MailboxStackPort, StackPort};

/// PIC line the host raises when receive frames are pending.
pub const UHYVE_IRQ: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// No virtual NIC is attached to this guest.
    NoDevice,
    /// The host's MAC string did not parse.
    BadMacAddress,
    /// Transmit frame larger than the host accepts.
    FrameTooLarge,
    /// The host refused a transmit.
    HostRejected,
    /// No buffer available for a frame.
    OutOfMemory,
}

impl core::fmt::Display for NetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NetError::NoDevice => write!(f, "no virtual NIC attached"),
            NetError::BadMacAddress => write!(f, "malformed MAC address from host"),
            NetError::FrameTooLarge => write!(f, "frame exceeds host transmit limit"),
            NetError::HostRejected => write!(f, "host rejected transmit"),
            NetError::OutOfMemory => write!(f, "no buffer for frame"),
        }
    }
}
