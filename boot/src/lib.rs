//! Guest boot header shared between the hypervisor and the kernel.
//!
//! The hypervisor writes a `BootHeader` at the very start of the kernel
//! image before jumping to the entry point. The layout is part of the
//! loader contract and must never change without bumping `version`.
#![no_std]

use static_assertions::const_assert_eq;

/// Magic value the hypervisor writes into `magic_number`.
pub const BOOT_MAGIC: u32 = 0xC0DE_CAFE;

/// Boot header layout version this kernel understands.
pub const BOOT_VERSION: u32 = 1;

/// Boot-time metadata written by the hypervisor.
///
/// Only the network-relevant fields (`hcip`, `hcgateway`, `hcmask`) and the
/// CPU counts are consumed by the kernel today; the rest is kept so the
/// offsets match what the loader writes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct BootHeader {
    pub magic_number: u32,
    pub version: u32,
    /// First guest-physical address backing the kernel image.
    pub base: u64,
    /// One past the last guest-physical address available to the kernel.
    pub limit: u64,
    pub image_size: u64,
    pub current_stack_address: u64,
    pub current_percore_address: u64,
    pub host_logical_addr: u64,
    pub boot_gtod: u64,
    pub mb_info: u64,
    pub cmdline: u64,
    pub cmdsize: u64,
    pub cpu_freq: u32,
    pub boot_processor: u32,
    pub cpu_online: u32,
    pub possible_cpus: u32,
    pub current_boot_id: u32,
    pub uartport: u16,
    pub single_kernel: u8,
    /// Non-zero when running under the port-hypercall hypervisor.
    pub hypervisor: u8,
    /// Guest IPv4 address octets.
    pub hcip: [u8; 4],
    /// Default gateway octets.
    pub hcgateway: [u8; 4],
    /// Network mask octets.
    pub hcmask: [u8; 4],
}

// The loader writes exactly 124 bytes; repr(C) pads the struct to the u64
// alignment boundary.
const_assert_eq!(core::mem::size_of::<BootHeader>(), 128);
const_assert_eq!(core::mem::align_of::<BootHeader>(), 8);

impl BootHeader {
    /// Read the header the hypervisor placed at `addr`.
    ///
    /// # Safety
    /// `addr` must point at a live, properly aligned `BootHeader`. In
    /// practice this is the start of the kernel image.
    pub unsafe fn from_ptr(addr: *const BootHeader) -> &'static BootHeader {
        &*addr
    }

    /// Whether the header passes the magic/version check.
    pub fn is_valid(&self) -> bool {
        self.magic_number == BOOT_MAGIC && self.version == BOOT_VERSION
    }

    /// Guest IPv4 address octets.
    pub fn ip(&self) -> [u8; 4] {
        self.hcip
    }

    /// Default gateway octets.
    pub fn gateway(&self) -> [u8; 4] {
        self.hcgateway
    }

    /// Network mask octets.
    pub fn netmask(&self) -> [u8; 4] {
        self.hcmask
    }

    /// Number of cores the hypervisor brought online.
    pub fn cores(&self) -> u32 {
        if self.cpu_online == 0 { 1 } else { self.cpu_online }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    fn sample() -> BootHeader {
        let mut h: BootHeader = unsafe { core::mem::zeroed() };
        h.magic_number = BOOT_MAGIC;
        h.version = BOOT_VERSION;
        h.cpu_online = 2;
        h.hcip = [10, 0, 5, 2];
        h.hcgateway = [10, 0, 5, 1];
        h.hcmask = [255, 255, 255, 0];
        h
    }

    #[test]
    fn network_field_offsets_are_pinned() {
        // The hypervisor writes these at fixed offsets; catching drift here
        // is cheaper than debugging a guest with a garbage IP.
        assert_eq!(offset_of!(BootHeader, cpu_freq), 88);
        assert_eq!(offset_of!(BootHeader, uartport), 108);
        assert_eq!(offset_of!(BootHeader, hypervisor), 111);
        assert_eq!(offset_of!(BootHeader, hcip), 112);
        assert_eq!(offset_of!(BootHeader, hcgateway), 116);
        assert_eq!(offset_of!(BootHeader, hcmask), 120);
    }

    #[test]
    fn accessors_return_octets() {
        let h = sample();
        assert!(h.is_valid());
        assert_eq!(h.ip(), [10, 0, 5, 2]);
        assert_eq!(h.gateway(), [10, 0, 5, 1]);
        assert_eq!(h.netmask(), [255, 255, 255, 0]);
        assert_eq!(h.cores(), 2);
    }

    #[test]
    fn zero_cpu_online_counts_as_one_core() {
        let mut h = sample();
        h.cpu_online = 0;
        assert_eq!(h.cores(), 1);
    }

    #[test]
    fn bad_magic_is_invalid() {
        let mut h = sample();
        h.magic_number = 0;
        assert!(!h.is_valid());
    }
}
