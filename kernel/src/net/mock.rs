/// Scripted hypercall port and stack ports for driver tests. Compiled
/// unconditionally so integration code can reuse them; only tests do
/// today.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::frame::FrameChain;
use super::hypercall::{HypercallPort, MAC_STR_LEN};
use super::stack_port::StackPort;

/// A hypercall port whose receive queue and MAC string are scripted up
/// front and whose writes are recorded for inspection.
pub struct MockPort {
    pub mac_str: [u8; MAC_STR_LEN],
    pub attached: bool,
    rx: VecDeque<Vec<u8>>,
    pub writes: Vec<Vec<u8>>,
    pub write_ret: i32,
    pub netinfo_calls: usize,
    pub netstat_calls: usize,
    pub netread_calls: usize,
    pub netwrite_calls: usize,
}

impl MockPort {
    pub fn new(mac: &str) -> Self {
        assert_eq!(mac.len(), MAC_STR_LEN - 1);
        let mut mac_str = [0u8; MAC_STR_LEN];
        mac_str[..mac.len()].copy_from_slice(mac.as_bytes());
        Self {
            mac_str,
            attached: true,
            rx: VecDeque::new(),
            writes: Vec::new(),
            write_ret: 0,
            netinfo_calls: 0,
            netstat_calls: 0,
            netread_calls: 0,
            netwrite_calls: 0,
        }
    }

    /// Queue a frame for the next poll to pick up.
    pub fn push_rx(&mut self, frame: &[u8]) {
        self.rx.push_back(frame.to_vec());
    }
}

impl HypercallPort for MockPort {
    fn netinfo(&mut self) -> [u8; MAC_STR_LEN] {
        self.netinfo_calls += 1;
        self.mac_str
    }

    fn netstat(&mut self) -> bool {
        self.netstat_calls += 1;
        self.attached
    }

    fn netwrite(&mut self, data: &[u8]) -> i32 {
        self.netwrite_calls += 1;
        self.writes.push(data.to_vec());
        self.write_ret
    }

    fn netread(&mut self, buf: &mut [u8]) -> Option<usize> {
        self.netread_calls += 1;
        let frame = self.rx.pop_front()?;
        buf[..frame.len()].copy_from_slice(&frame);
        Some(frame.len())
    }
}

/// Stack port that keeps every dispatched frame, with optional limits on
/// how many allocations and deliveries succeed.
pub struct RecordingStack {
    pub seg_size: usize,
    pub frames: Vec<FrameChain>,
    pub alloc_budget: Option<usize>,
    pub dispatch_budget: Option<usize>,
    pub alloc_calls: usize,
}

impl RecordingStack {
    pub fn new(seg_size: usize) -> Self {
        Self {
            seg_size,
            frames: Vec::new(),
            alloc_budget: None,
            dispatch_budget: None,
            alloc_calls: 0,
        }
    }
}

impl StackPort for RecordingStack {
    fn alloc_frame(&mut self, len: usize) -> Option<FrameChain> {
        self.alloc_calls += 1;
        if let Some(budget) = self.alloc_budget.as_mut() {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
        }
        Some(FrameChain::chunked(len, self.seg_size))
    }

    fn dispatch(&mut self, frame: FrameChain) -> Result<(), FrameChain> {
        if let Some(budget) = self.dispatch_budget.as_mut() {
            if *budget == 0 {
                return Err(frame);
            }
            *budget -= 1;
        }
        self.frames.push(frame);
        Ok(())
    }
}
