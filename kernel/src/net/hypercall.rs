/// Hypercall transport to the host-side virtual NIC.
///
/// Each operation writes the guest-physical address of a descriptor to a
/// dedicated I/O port; the hypervisor traps the access, reads or fills the
/// descriptor, and returns. The `HypercallPort` trait is the seam between
/// the driver and the transport so tests can run against a scripted port.
use static_assertions::const_assert_eq;

/// Port the MAC-address query descriptor is issued on.
pub const PORT_NETINFO: u16 = 0x600;
/// Port a transmit descriptor is issued on.
pub const PORT_NETWRITE: u16 = 0x640;
/// Port a receive descriptor is issued on.
pub const PORT_NETREAD: u16 = 0x680;
/// Port the attachment probe is issued on.
pub const PORT_NETSTAT: u16 = 0x700;

/// MAC address as the host reports it: 17 colon-hex characters plus a
/// NUL terminator.
pub const MAC_STR_LEN: usize = 18;

/// Descriptor filled by the host on a NETINFO hypercall.
#[repr(C)]
pub struct NetInfoDesc {
    pub mac_str: [u8; MAC_STR_LEN],
}

/// Descriptor for a NETWRITE hypercall. `data` is the guest-physical
/// address of the frame bytes; the host stores its result in `ret`.
#[repr(C)]
pub struct NetWriteDesc {
    pub data: u64,
    pub len: i32,
    pub ret: i32,
}

/// Descriptor for a NETREAD hypercall. `len` carries the buffer size in
/// and the frame size out; `ret` is zero when a frame was delivered.
#[repr(C)]
pub struct NetReadDesc {
    pub data: u64,
    pub len: i32,
    pub ret: i32,
}

/// Descriptor filled by the host on a NETSTAT hypercall. Non-zero
/// `status` means a virtual NIC is attached.
#[repr(C)]
pub struct NetStatDesc {
    pub status: i32,
}

const_assert_eq!(core::mem::size_of::<NetInfoDesc>(), 18);
const_assert_eq!(core::mem::size_of::<NetWriteDesc>(), 16);
const_assert_eq!(core::mem::size_of::<NetReadDesc>(), 16);
const_assert_eq!(core::mem::size_of::<NetStatDesc>(), 4);

/// Transport operations the driver needs from the hypervisor.
pub trait HypercallPort {
    /// Query the MAC address string of the attached NIC.
    fn netinfo(&mut self) -> [u8; MAC_STR_LEN];

    /// Whether a virtual NIC is attached at all.
    fn netstat(&mut self) -> bool;

    /// Hand one complete frame to the host. Returns the host's status
    /// code (zero on success).
    fn netwrite(&mut self, data: &[u8]) -> i32;

    /// Pull one pending frame into `buf`. `None` when the host has no
    /// frame queued.
    fn netread(&mut self, buf: &mut [u8]) -> Option<usize>;
}

#[cfg(not(test))]
pub use uhyve::UhyvePort;

#[cfg(not(test))]
mod uhyve {
    use core::ptr;

    use super::*;
    use crate::arch::x86_64::outl;
    use crate::mem::virt_to_phys;

    /// The real transport: descriptors on the stack, physical addresses
    /// out the I/O ports.
    pub struct UhyvePort;

    impl UhyvePort {
        pub const fn new() -> Self {
            Self
        }

        fn issue(port: u16, desc_virt: u64) {
            let phys = virt_to_phys(desc_virt);
            unsafe { outl(port, phys as u32) };
        }
    }

    impl HypercallPort for UhyvePort {
        fn netinfo(&mut self) -> [u8; MAC_STR_LEN] {
            let desc = NetInfoDesc {
                mac_str: [0; MAC_STR_LEN],
            };
            Self::issue(PORT_NETINFO, &desc as *const _ as u64);
            // The host wrote into the descriptor behind the compiler's
            // back.
            unsafe { ptr::read_volatile(&desc.mac_str) }
        }

        fn netstat(&mut self) -> bool {
            let desc = NetStatDesc { status: 0 };
            Self::issue(PORT_NETSTAT, &desc as *const _ as u64);
            unsafe { ptr::read_volatile(&desc.status) != 0 }
        }

        fn netwrite(&mut self, data: &[u8]) -> i32 {
            let desc = NetWriteDesc {
                data: virt_to_phys(data.as_ptr() as u64),
                len: data.len() as i32,
                ret: 0,
            };
            Self::issue(PORT_NETWRITE, &desc as *const _ as u64);
            unsafe { ptr::read_volatile(&desc.ret) }
        }

        fn netread(&mut self, buf: &mut [u8]) -> Option<usize> {
            let desc = NetReadDesc {
                data: virt_to_phys(buf.as_mut_ptr() as u64),
                len: buf.len() as i32,
                ret: -1,
            };
            Self::issue(PORT_NETREAD, &desc as *const _ as u64);
            let ret = unsafe { ptr::read_volatile(&desc.ret) };
            if ret != 0 {
                return None;
            }
            let len = unsafe { ptr::read_volatile(&desc.len) };
            Some(len as usize)
        }
    }
}
