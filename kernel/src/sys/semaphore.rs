/// Counting semaphore with blocking wait and explicit lifecycle.
///
/// The stack creates semaphores at boot and tears them down explicitly.
/// "Invalidated" is distinct from "destroyed": a pointer to an invalidated
/// semaphore may still exist, and operations on it are a checked error
/// rather than undefined behavior.
use spin::Mutex;

use super::error::SysError;
use super::time;

/// Lifecycle of a semaphore or mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Live,
    Invalidated,
    Destroyed,
}

struct Inner {
    count: u32,
    state: Lifecycle,
}

pub struct Semaphore {
    inner: Mutex<Inner>,
}

impl Semaphore {
    /// Create a semaphore with the given initial count.
    pub const fn new(initial: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                count: initial,
                state: Lifecycle::Live,
            }),
        }
    }

    /// Wait until the count is positive, then decrement it.
    ///
    /// `timeout_ms == 0` means wait forever. Returns `TimedOut` when the
    /// deadline expires first, `InvalidArgument` if the semaphore is no
    /// longer live.
    ///
    /// Blocking is a clock-bounded spin: tasks in this kernel are
    /// cooperative and there is no wait-queue API to park on. Must not be
    /// called from interrupt context.
    pub fn wait(&self, timeout_ms: u64) -> Result<(), SysError> {
        let deadline = if timeout_ms == 0 {
            None
        } else {
            Some(time::now_ms() + timeout_ms)
        };

        loop {
            {
                let mut inner = self.inner.lock();
                if inner.state != Lifecycle::Live {
                    return Err(SysError::InvalidArgument);
                }
                if inner.count > 0 {
                    inner.count -= 1;
                    return Ok(());
                }
            }
            if let Some(deadline) = deadline {
                if time::now_ms() >= deadline {
                    return Err(SysError::TimedOut);
                }
            }
            core::hint::spin_loop();
        }
    }

    /// Increment the count, admitting one waiter. Never fails; callable
    /// from any context that may run concurrently with waiters. A no-op
    /// once the semaphore is invalidated or destroyed.
    pub fn signal(&self) {
        let mut inner = self.inner.lock();
        if inner.state == Lifecycle::Live {
            inner.count += 1;
        }
    }

    /// Mark the semaphore invalid without releasing it. Subsequent waits
    /// fail with `InvalidArgument`.
    pub fn invalidate(&self) {
        self.inner.lock().state = Lifecycle::Invalidated;
    }

    /// Destroy the semaphore. Also invalid afterwards.
    pub fn destroy(&self) {
        let mut inner = self.inner.lock();
        inner.state = Lifecycle::Destroyed;
        inner.count = 0;
    }

    /// Whether the semaphore is live.
    pub fn is_valid(&self) -> bool {
        self.inner.lock().state == Lifecycle::Live
    }
}
