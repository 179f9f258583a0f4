/// Mutex for the stack — a semaphore with one permit.
///
/// There is no dedicated mutex in this kernel, so lock/unlock map onto
/// semaphore wait/signal. No re-entrancy and no ownership tracking beyond
/// the stack's own discipline.
use super::error::SysError;
use super::semaphore::Semaphore;

pub struct SysMutex {
    sem: Semaphore,
}

impl SysMutex {
    pub const fn new() -> Self {
        Self {
            sem: Semaphore::new(1),
        }
    }

    /// Acquire the mutex, blocking indefinitely.
    pub fn lock(&self) -> Result<(), SysError> {
        self.sem.wait(0)
    }

    /// Release the mutex.
    pub fn unlock(&self) {
        self.sem.signal();
    }

    pub fn is_valid(&self) -> bool {
        self.sem.is_valid()
    }

    pub fn destroy(&self) {
        self.sem.destroy();
    }
}
