/// Protected region — the critical section in which the stack assumes no
/// concurrent preemption or cross-core mutation of its internals (timer
/// lists, memory pools).
///
/// On a single core, interrupts already serialize everything, so entering
/// is a marker no-op. With more than one core the region must suppress
/// interrupts AND hold a global spinlock for its duration.
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::x86_64 as arch;

/// Opaque token returned by `enter`, consumed by `exit`. Not copyable:
/// each enter is balanced by exactly one exit.
#[must_use]
pub struct ProtectToken {
    restore_interrupts: bool,
    multicore: bool,
}

pub struct ProtectRegion {
    cores: u32,
    // Raw flag rather than spin::Mutex: the guard has to survive across
    // the enter/exit call boundary.
    locked: AtomicBool,
}

impl ProtectRegion {
    pub const fn new(cores: u32) -> Self {
        Self {
            cores,
            locked: AtomicBool::new(false),
        }
    }

    /// Enter the protected region.
    pub fn enter(&self) -> ProtectToken {
        if self.cores <= 1 {
            return ProtectToken {
                restore_interrupts: false,
                multicore: false,
            };
        }

        let were_enabled = arch::interrupts_enabled();
        arch::cli();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        ProtectToken {
            restore_interrupts: were_enabled,
            multicore: true,
        }
    }

    /// Leave the protected region, restoring the interrupt state captured
    /// on entry.
    pub fn exit(&self, token: ProtectToken) {
        if token.multicore {
            self.locked.store(false, Ordering::Release);
            if token.restore_interrupts {
                arch::sti();
            }
        }
    }

    /// Whether the global lock is currently held (diagnostics/tests).
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}
