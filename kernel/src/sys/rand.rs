/// Pseudo-random generator — the Minimal Standard LCG of Lewis, Goodman,
/// and Miller:
///
///   I[j+1] = a * I[j] (mod m),  a = 16807,  m = 2^31 - 1
///
/// computed with Schrage's factorization so the multiply never overflows
/// 32-bit signed arithmetic:
///
///   a*(s mod q) - r*(s div q)       if >= 0
///   a*(s mod q) - r*(s div q) + m   otherwise
///
/// with q = m div a = 127773 and r = m mod a = 2836. A seed of 0 would fix
/// the sequence at 0, so it is remapped to a nonzero constant first.
use rand_core::{impls, Error, RngCore};
use spin::Mutex;

use crate::arch::x86_64::cpu;

pub const RAND_MAX: i32 = 0x7fff_ffff;

const LCG_A: i64 = 16807;
const LCG_M: i64 = 2_147_483_647;
const LCG_Q: i64 = 127_773;
const LCG_R: i64 = 2_836;

/// Replacement for the unusable seed value 0.
const ZERO_SEED_SUBST: i64 = 0x1234_5987;

/// Seeded pseudo-random source. The seed cell lives behind its own lock,
/// independent of the protected-region lock.
pub struct SeedRng {
    seed: Mutex<u32>,
}

impl SeedRng {
    pub const fn new(seed: u32) -> Self {
        Self {
            seed: Mutex::new(seed),
        }
    }

    /// Advance the LCG once. Always in 0..=RAND_MAX.
    fn step(seed: &mut u32) -> i32 {
        let mut s = *seed as i64;
        if s == 0 {
            s = ZERO_SEED_SUBST;
        }
        let k = s / LCG_Q;
        s = LCG_A * (s - k * LCG_Q) - LCG_R * k;
        if s < 0 {
            s += LCG_M;
        }
        *seed = s as u32;
        (s & RAND_MAX as i64) as i32
    }

    /// Next random value in 0..=RAND_MAX. Uses the hardware RDRAND
    /// instruction when the CPU has it; otherwise the seeded LCG.
    pub fn next(&self) -> i32 {
        if cpu::has_rdrand() {
            return (cpu::rdrand() % RAND_MAX as u64) as i32;
        }
        let mut seed = self.seed.lock();
        Self::step(&mut seed)
    }

    /// Next value from the seeded LCG, never the hardware path. The
    /// deterministic sequence some stack subsystems want for replay.
    pub fn next_seeded(&self) -> i32 {
        let mut seed = self.seed.lock();
        Self::step(&mut seed)
    }
}

impl RngCore for SeedRng {
    fn next_u32(&mut self) -> u32 {
        self.next() as u32
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
