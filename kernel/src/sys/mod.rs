/// OS abstraction layer consumed by the TCP/IP stack.
///
/// The stack expects its host environment to provide blocking semaphores
/// and mailboxes, a mutex, a monotonic millisecond clock, a pseudo-random
/// source, thread creation, and a "protected region" in which none of its
/// internal structures are touched concurrently. Everything here is plain
/// kernel-side glue; the stack's protocol logic never runs in this crate.
mod error;
mod semaphore;
mod mailbox;
mod mutex;
mod protect;
mod rand;
pub mod thread;
pub mod time;

pub use error::SysError;
pub use semaphore::Semaphore;
pub use mailbox::Mailbox;
pub use mutex::SysMutex;
pub use protect::{ProtectRegion, ProtectToken};
pub use rand::SeedRng;
pub use thread::{SpawnError, TaskId, TaskSpawner};

#[cfg(test)]
mod tests;

/// Process-wide context owning what used to be hidden globals: the random
/// seed, the protected-region lock, and the kernel's task-spawn hook.
/// Constructed once during boot and passed by reference, which keeps
/// initialization order and test isolation explicit.
pub struct SysContext {
    cores: u32,
    pub rng: SeedRng,
    pub protect: ProtectRegion,
    spawner: Option<&'static dyn TaskSpawner>,
}

impl SysContext {
    pub fn new(cores: u32, seed: u32) -> Self {
        Self {
            cores,
            rng: SeedRng::new(seed),
            protect: ProtectRegion::new(cores),
            spawner: None,
        }
    }

    /// Context seeded from the tick counter, as the boot path does.
    pub fn from_clock(cores: u32) -> Self {
        Self::new(cores, (time::jiffies() % 127) as u32)
    }

    pub fn cores(&self) -> u32 {
        self.cores
    }

    /// Install the kernel's task-creation hook.
    pub fn set_spawner(&mut self, spawner: &'static dyn TaskSpawner) {
        self.spawner = Some(spawner);
    }

    /// Spawn a kernel task for the stack (worker threads, the designated
    /// network-processing task). Thin forwarding; the scheduler is the
    /// kernel's business.
    pub fn spawn(
        &self,
        name: &str,
        entry: fn(usize),
        arg: usize,
        prio: u8,
    ) -> Result<TaskId, SpawnError> {
        match self.spawner {
            Some(s) => s.spawn(name, entry, arg, prio),
            None => Err(SpawnError::NoScheduler),
        }
    }
}
