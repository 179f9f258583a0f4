/// Virtual NIC driver over the hypercall transport.
///
/// One frame per hypercall in both directions: transmit flattens a frame
/// chain into a staging buffer and issues a single NETWRITE; receive
/// drains NETREAD until the host reports empty, pushing each frame into
/// the stack through its port.
use alloc::boxed::Box;
use alloc::vec;
use bitflags::bitflags;
use smoltcp::wire::EthernetAddress;

use super::frame::FrameChain;
use super::hypercall::{HypercallPort, MAC_STR_LEN};
use super::stack_port::StackPort;
use super::NetError;
use crate::serial_println;

/// Largest frame the host accepts in one NETWRITE.
pub const TX_FRAME_MAX: usize = 1792;
/// Receive staging buffer; comfortably above any frame the host sends.
pub const RX_BUF_LEN: usize = 2048;
/// Interface MTU advertised to the stack.
pub const MTU: u16 = 32768;

/// Bytes of link-layer padding the stack prepends to every frame so the
/// IP header lands aligned. Stripped before transmit, reserved on
/// receive.
#[cfg(feature = "eth-pad")]
pub const ETH_PAD_SIZE: usize = 2;
#[cfg(not(feature = "eth-pad"))]
pub const ETH_PAD_SIZE: usize = 0;

bitflags! {
    /// Capability flags the interface reports to the stack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NetifFlags: u8 {
        const BROADCAST = 1 << 0;
        const ETHARP = 1 << 1;
        const IGMP = 1 << 2;
        const LINK_UP = 1 << 3;
        const MLD6 = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfaceState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Link-level counters, readable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub xmit: u64,
    pub recv: u64,
    pub dropped: u64,
    pub memerr: u64,
}

pub struct UhyveNet<P: HypercallPort> {
    port: P,
    state: IfaceState,
    mac: EthernetAddress,
    flags: NetifFlags,
    mtu: u16,
    rx_buf: Box<[u8]>,
    tx_buf: Box<[u8]>,
    stats: LinkStats,
}

impl<P: HypercallPort> UhyveNet<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: IfaceState::Uninitialized,
            mac: EthernetAddress([0; 6]),
            flags: NetifFlags::empty(),
            mtu: 0,
            rx_buf: vec![0u8; RX_BUF_LEN].into_boxed_slice(),
            tx_buf: vec![0u8; TX_FRAME_MAX].into_boxed_slice(),
            stats: LinkStats::default(),
        }
    }

    /// Bring the interface up: query the MAC, publish capabilities, then
    /// drain any frames that arrived before the interrupt line was live.
    pub fn initialize(&mut self, stack: &mut dyn StackPort) -> Result<(), NetError> {
        assert!(
            self.state == IfaceState::Uninitialized,
            "network interface initialized twice"
        );
        self.state = IfaceState::Initializing;

        let mac_str = self.port.netinfo();
        self.mac = parse_mac(&mac_str).ok_or(NetError::BadMacAddress)?;
        self.flags = NetifFlags::BROADCAST
            | NetifFlags::ETHARP
            | NetifFlags::IGMP
            | NetifFlags::LINK_UP
            | NetifFlags::MLD6;
        self.mtu = MTU;

        serial_println!("[net] en0 up, MAC {}", self.mac);
        self.state = IfaceState::Ready;

        // Frames queued by the host before this point would otherwise sit
        // until the first interrupt.
        self.poll(stack);
        Ok(())
    }

    /// Transmit one frame chain. Oversized frames are rejected before any
    /// hypercall is issued.
    pub fn output(&mut self, frame: &FrameChain) -> Result<(), NetError> {
        let total = frame.total_len();
        if total > TX_FRAME_MAX {
            serial_println!("[net] en0: transmit of {} bytes exceeds {}", total, TX_FRAME_MAX);
            return Err(NetError::FrameTooLarge);
        }
        let wire_len = total - ETH_PAD_SIZE;
        frame.copy_to(ETH_PAD_SIZE, &mut self.tx_buf[..wire_len]);

        let ret = self.port.netwrite(&self.tx_buf[..wire_len]);
        if ret != 0 {
            self.stats.dropped += 1;
            return Err(NetError::HostRejected);
        }
        self.stats.xmit += 1;
        Ok(())
    }

    /// Drain all pending frames from the host. Allocation or delivery
    /// failure drops that frame and keeps draining; a stuck queue would
    /// otherwise keep the interrupt line asserted.
    pub fn poll(&mut self, stack: &mut dyn StackPort) {
        if self.state != IfaceState::Ready {
            return;
        }
        while let Some(len) = self.port.netread(&mut self.rx_buf) {
            let mut chain = match stack.alloc_frame(len + ETH_PAD_SIZE) {
                Some(chain) => chain,
                None => {
                    serial_println!("[net] en0: no buffer for {} byte frame", len);
                    self.stats.memerr += 1;
                    self.stats.dropped += 1;
                    continue;
                }
            };
            chain.write_at(ETH_PAD_SIZE, &self.rx_buf[..len]);
            match stack.dispatch(chain) {
                Ok(()) => self.stats.recv += 1,
                Err(_frame) => {
                    self.stats.dropped += 1;
                }
            }
        }
    }

    pub fn state(&self) -> IfaceState {
        self.state
    }

    pub fn mac(&self) -> EthernetAddress {
        self.mac
    }

    pub fn flags(&self) -> NetifFlags {
        self.flags
    }

    pub fn mtu(&self) -> u16 {
        self.mtu
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

fn dehex(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse the host's colon-hex MAC string ("aa:bb:cc:dd:ee:ff").
pub fn parse_mac(s: &[u8; MAC_STR_LEN]) -> Option<EthernetAddress> {
    let mut mac = [0u8; 6];
    for (i, byte) in mac.iter_mut().enumerate() {
        let off = i * 3;
        *byte = (dehex(s[off])? << 4) | dehex(s[off + 1])?;
        if i < 5 && s[off + 2] != b':' {
            return None;
        }
    }
    Some(EthernetAddress(mac))
}
