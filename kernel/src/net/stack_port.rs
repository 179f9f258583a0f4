/// Handoff from the driver's receive path into the protocol stack.
///
/// The driver never touches stack internals; it asks a `StackPort` for a
/// frame buffer and hands the filled frame back through it. The production
/// implementation marshals frames into a mailbox drained by the network
/// task, so the interrupt-side call never blocks.
use alloc::sync::Arc;

use super::frame::FrameChain;
use crate::sys::{Mailbox, SysError};

/// Segment size of the receive buffer pool.
pub const POOL_SEG_SIZE: usize = 512;

pub trait StackPort {
    /// Allocate a frame buffer of `len` bytes from the stack's pool.
    /// `None` when the pool is exhausted.
    fn alloc_frame(&mut self, len: usize) -> Option<FrameChain>;

    /// Deliver a filled frame to the stack. On failure the frame comes
    /// back so the caller can account for the drop.
    fn dispatch(&mut self, frame: FrameChain) -> Result<(), FrameChain>;
}

/// Stack port backed by a bounded mailbox. The network task holds the
/// other end and fetches frames out of interrupt context.
pub struct MailboxStackPort {
    frames: Arc<Mailbox<FrameChain>>,
}

impl MailboxStackPort {
    /// Create the port plus the consumer handle to its mailbox.
    pub fn new(capacity: usize) -> Result<(Self, Arc<Mailbox<FrameChain>>), SysError> {
        let frames = Arc::new(Mailbox::new(capacity)?);
        Ok((
            Self {
                frames: frames.clone(),
            },
            frames,
        ))
    }
}

impl StackPort for MailboxStackPort {
    fn alloc_frame(&mut self, len: usize) -> Option<FrameChain> {
        if len == 0 {
            return None;
        }
        Some(FrameChain::chunked(len, POOL_SEG_SIZE))
    }

    fn dispatch(&mut self, frame: FrameChain) -> Result<(), FrameChain> {
        // Interrupt-adjacent context: only the non-blocking post is legal.
        self.frames.try_post(frame)
    }
}
