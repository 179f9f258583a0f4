/// Memory support for an identity-mapped hypervisor guest.
///
/// The hypervisor loads the kernel into one contiguous guest-physical
/// region and maps it 1:1, so virtual-to-physical translation is a fixed
/// offset (zero in the common case). Hypercall descriptors must be passed
/// by guest-physical address, which is where `virt_to_phys` is used.
use core::sync::atomic::{AtomicU64, Ordering};

pub mod heap;

/// Offset subtracted from a virtual address to get the guest-physical one.
/// Zero for identity mapping; set once at boot from the boot header.
static PHYS_OFFSET: AtomicU64 = AtomicU64::new(0);

/// Record the virtual-to-physical offset for this boot.
pub fn set_phys_offset(offset: u64) {
    PHYS_OFFSET.store(offset, Ordering::Release);
}

/// Translate a kernel virtual address to a guest-physical address.
#[inline]
pub fn virt_to_phys(vaddr: u64) -> u64 {
    vaddr - PHYS_OFFSET.load(Ordering::Acquire)
}
