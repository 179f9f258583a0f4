/// Kernel heap allocator — slab classes over a static arena.
///
/// Design:
/// - Fixed-size slab classes: 16, 32, 64, 128, 256, 512, 1024, 2048, 4096 bytes
/// - Larger allocations are carved directly from the arena
/// - Each allocation has a hidden header storing its class so `dealloc`
///   works without consulting the layout
///
/// The arena is a static byte array: this guest has no page allocator, the
/// hypervisor hands us one fixed memory region at boot.
use core::alloc::{GlobalAlloc, Layout};
use core::ptr;
use spin::Mutex;

const ARENA_SIZE: usize = 4 * 1024 * 1024;

const HEADER_SIZE: usize = 16; // keeps payloads 16-byte aligned
const LARGE_ALLOC: u8 = 0xFF;

const SLAB_CLASSES: [usize; 9] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

#[repr(C, align(16))]
struct Arena([u8; ARENA_SIZE]);

static mut ARENA: Arena = Arena([0; ARENA_SIZE]);

/// Allocation header, stored immediately before the returned pointer.
#[repr(C)]
struct AllocHeader {
    /// Usable size of this allocation.
    size: usize,
    /// Slab class index, or LARGE_ALLOC for arena-carved allocations.
    class: u8,
}

struct FreeNode {
    next: *mut FreeNode,
}

struct HeapInner {
    /// Next unused byte in the arena (bump pointer).
    brk: usize,
    /// Per-class free list heads.
    free_lists: [*mut FreeNode; 9],
}

unsafe impl Send for HeapInner {}

pub struct ArenaHeap {
    inner: Mutex<HeapInner>,
}

unsafe impl Sync for ArenaHeap {}

impl ArenaHeap {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(HeapInner {
                brk: 0,
                free_lists: [ptr::null_mut(); 9],
            }),
        }
    }

    /// Find the slab class for a given size.
    fn class_for_size(size: usize) -> Option<usize> {
        SLAB_CLASSES.iter().position(|&s| s >= size)
    }

    /// Carve `bytes` (16-byte aligned) from the arena bump pointer.
    fn carve(inner: &mut HeapInner, bytes: usize) -> *mut u8 {
        let bytes = (bytes + 15) & !15;
        if inner.brk + bytes > ARENA_SIZE {
            return ptr::null_mut();
        }
        let base = unsafe { ptr::addr_of_mut!(ARENA.0).cast::<u8>().add(inner.brk) };
        inner.brk += bytes;
        base
    }
}

unsafe impl GlobalAlloc for ArenaHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let size = layout.size().max(layout.align());
        let mut inner = self.inner.lock();

        match ArenaHeap::class_for_size(size) {
            Some(class) => {
                if inner.free_lists[class].is_null() {
                    // Refill: carve one entry at a time; slab reuse comes
                    // from the free list on dealloc.
                    let entry = ArenaHeap::carve(&mut inner, SLAB_CLASSES[class] + HEADER_SIZE);
                    if entry.is_null() {
                        return ptr::null_mut();
                    }
                    let header = entry as *mut AllocHeader;
                    (*header).size = SLAB_CLASSES[class];
                    (*header).class = class as u8;
                    return entry.add(HEADER_SIZE);
                }

                let node = inner.free_lists[class];
                inner.free_lists[class] = (*node).next;
                node as *mut u8
            }
            None => {
                let total = size + HEADER_SIZE;
                let base = ArenaHeap::carve(&mut inner, total);
                if base.is_null() {
                    return ptr::null_mut();
                }
                let header = base as *mut AllocHeader;
                (*header).size = size;
                (*header).class = LARGE_ALLOC;
                base.add(HEADER_SIZE)
            }
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if ptr.is_null() {
            return;
        }

        let header = &*(ptr.sub(HEADER_SIZE) as *const AllocHeader);
        if header.class == LARGE_ALLOC {
            // Large blocks are never reused; the arena outlives the guest.
            return;
        }

        let class = header.class as usize;
        let mut inner = self.inner.lock();
        let node = ptr as *mut FreeNode;
        (*node).next = inner.free_lists[class];
        inner.free_lists[class] = node;
    }
}

/// Global kernel heap allocator.
#[global_allocator]
pub static HEAP: ArenaHeap = ArenaHeap::new();
