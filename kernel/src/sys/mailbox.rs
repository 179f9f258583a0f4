/// Bounded FIFO mailbox of opaque messages.
///
/// The stack's inter-task queues: blocking and non-blocking post, blocking
/// fetch with timeout-or-forever, non-blocking fetch. `try_post` is the
/// only variant legal from interrupt-adjacent contexts; an
/// interrupt-context post degrades to it rather than going through a
/// deferred-interrupt mechanism.
use alloc::collections::VecDeque;
use spin::Mutex;

use super::error::SysError;
use super::semaphore::Lifecycle;
use super::time;

struct Inner<T> {
    queue: VecDeque<T>,
    capacity: usize,
    state: Lifecycle,
}

pub struct Mailbox<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Mailbox<T> {
    /// Create a mailbox holding at most `capacity` undelivered messages.
    pub fn new(capacity: usize) -> Result<Self, SysError> {
        if capacity == 0 {
            return Err(SysError::InvalidArgument);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                capacity,
                state: Lifecycle::Live,
            }),
        })
    }

    /// Post a message, blocking until there is space. Must not be called
    /// from interrupt context.
    pub fn post(&self, mut msg: T) -> Result<(), SysError> {
        loop {
            match self.try_post(msg) {
                Ok(()) => return Ok(()),
                Err(back) => {
                    if !self.is_valid() {
                        return Err(SysError::InvalidArgument);
                    }
                    msg = back;
                }
            }
            core::hint::spin_loop();
        }
    }

    /// Post without blocking. When the queue is full (or the mailbox is
    /// dead) the message is handed back so the caller can drop or retry.
    pub fn try_post(&self, msg: T) -> Result<(), T> {
        let mut inner = self.inner.lock();
        if inner.state != Lifecycle::Live || inner.queue.len() >= inner.capacity {
            return Err(msg);
        }
        inner.queue.push_back(msg);
        Ok(())
    }

    /// Fetch the oldest message, blocking up to `timeout_ms` (0 = forever).
    pub fn fetch(&self, timeout_ms: u64) -> Result<T, SysError> {
        let deadline = if timeout_ms == 0 {
            None
        } else {
            Some(time::now_ms() + timeout_ms)
        };

        loop {
            match self.try_fetch() {
                Ok(msg) => return Ok(msg),
                Err(SysError::Empty) => {}
                Err(e) => return Err(e),
            }
            if let Some(deadline) = deadline {
                if time::now_ms() >= deadline {
                    return Err(SysError::TimedOut);
                }
            }
            core::hint::spin_loop();
        }
    }

    /// Fetch without blocking. `Empty` when nothing is queued.
    pub fn try_fetch(&self) -> Result<T, SysError> {
        let mut inner = self.inner.lock();
        if inner.state != Lifecycle::Live {
            return Err(SysError::InvalidArgument);
        }
        inner.queue.pop_front().ok_or(SysError::Empty)
    }

    /// Number of undelivered messages.
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the mailbox invalid without releasing it.
    pub fn invalidate(&self) {
        self.inner.lock().state = Lifecycle::Invalidated;
    }

    /// Destroy the mailbox, dropping any queued messages.
    pub fn destroy(&self) {
        let mut inner = self.inner.lock();
        inner.state = Lifecycle::Destroyed;
        inner.queue.clear();
    }

    /// Whether the mailbox is live.
    pub fn is_valid(&self) -> bool {
        self.inner.lock().state == Lifecycle::Live
    }
}
