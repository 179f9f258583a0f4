/// Task creation seam for the stack.
///
/// The stack spawns worker tasks (most importantly its single designated
/// network-processing task) through this trait; the kernel's scheduler
/// implements it. Thin forwarding only — stack task bodies never run in
/// this module.

/// Identifier of a spawned kernel task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// No task-control block or stack memory available.
    OutOfMemory,
    /// No spawner was installed in the context.
    NoScheduler,
}

impl core::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SpawnError::OutOfMemory => write!(f, "out of memory for task"),
            SpawnError::NoScheduler => write!(f, "no task spawner installed"),
        }
    }
}

/// Kernel task creation. `prio` follows the scheduler's numbering; the
/// stack pins its tasks to the boot core.
pub trait TaskSpawner: Sync {
    fn spawn(&self, name: &str, entry: fn(usize), arg: usize, prio: u8)
        -> Result<TaskId, SpawnError>;
}
