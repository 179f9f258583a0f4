/// Millisecond clock for the stack — wraps the calibrated TSC timer.
use smoltcp::time::Instant;

use crate::arch::x86_64::timer;

/// Milliseconds since boot.
pub fn now_ms() -> u64 {
    timer::monotonic_ms()
}

/// The stack's tick query. Same timebase as `now_ms`.
pub fn jiffies() -> u64 {
    timer::monotonic_ms()
}

/// Current time as a wire-stack timestamp.
pub fn instant() -> Instant {
    Instant::from_millis(now_ms() as i64)
}
