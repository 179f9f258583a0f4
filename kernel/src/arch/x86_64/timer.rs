/// Timer subsystem — TSC calibration and monotonic clock.
///
/// Uses PIT Channel 2 (speaker gate) to measure TSC frequency without
/// requiring interrupts. This is the standard "gate calibration" method:
///   1. Program PIT channel 2 for a known delay (~10ms one-shot)
///   2. Read TSC before and after the PIT counts down
///   3. Compute TSC frequency = delta_tsc / known_delay
///
/// After calibration, `monotonic_ms()` converts TSC ticks to milliseconds.
use core::sync::atomic::{AtomicU64, Ordering};
use super::{outb, inb};
use super::cpu::rdtsc;

/// TSC frequency in Hz, set once during calibration.
static TSC_FREQ_HZ: AtomicU64 = AtomicU64::new(0);

/// TSC ticks per millisecond (TSC_FREQ_HZ / 1000), for fast division.
static TSC_PER_MS: AtomicU64 = AtomicU64::new(2_000_000); // default: 2 GHz fallback

/// TSC value at boot (set right after calibration).
static BOOT_TSC: AtomicU64 = AtomicU64::new(0);

// PIT ports
const PIT_CH2_DATA: u16 = 0x42;
const PIT_CMD: u16 = 0x43;
const PIT_GATE: u16 = 0x61;  // NMI Status and Control Register (speaker gate)

/// PIT oscillator frequency: 1,193,182 Hz (standard PC).
const PIT_FREQ: u64 = 1_193_182;

/// Calibrate the TSC using PIT channel 2 in one-shot mode.
///
/// # Safety
/// Must be called during boot, with interrupts disabled.
pub fn calibrate_tsc() {
    // Target: ~10ms calibration window.
    let pit_count: u16 = 11_932;  // 1_193_182 * 0.010
    let expected_us: u64 = (pit_count as u64 * 1_000_000) / PIT_FREQ;

    // Disable speaker, enable gate control
    let gate = inb(PIT_GATE);
    outb(PIT_GATE, (gate & !0x02) | 0x01);

    // Channel 2, mode 0 (one-shot), lobyte/hibyte, binary
    outb(PIT_CMD, 0xB0);
    outb(PIT_CH2_DATA, (pit_count & 0xFF) as u8);
    outb(PIT_CH2_DATA, ((pit_count >> 8) & 0xFF) as u8);

    // Toggle the gate (bit 0 of port 0x61) to start the countdown
    let gate = inb(PIT_GATE);
    outb(PIT_GATE, gate & !0x01);
    outb(PIT_GATE, gate | 0x01);

    let tsc_start = rdtsc();

    // Wait for PIT output to go high (bit 5 of port 0x61)
    loop {
        if inb(PIT_GATE) & 0x20 != 0 {
            break;
        }
        core::hint::spin_loop();
    }

    let tsc_end = rdtsc();

    let delta = tsc_end - tsc_start;
    let freq_hz = (delta * 1_000_000) / expected_us;
    let per_ms = freq_hz / 1000;

    TSC_FREQ_HZ.store(freq_hz, Ordering::Release);
    TSC_PER_MS.store(per_ms, Ordering::Release);
    BOOT_TSC.store(tsc_end, Ordering::Release);
}

/// Get the calibrated TSC frequency in Hz.
pub fn tsc_freq_hz() -> u64 {
    TSC_FREQ_HZ.load(Ordering::Acquire)
}

/// Milliseconds since boot. Uses calibrated TSC.
pub fn monotonic_ms() -> u64 {
    let boot = BOOT_TSC.load(Ordering::Acquire);
    let now = rdtsc();
    let per_ms = TSC_PER_MS.load(Ordering::Acquire);
    if per_ms == 0 {
        return 0;
    }
    (now - boot) / per_ms
}
