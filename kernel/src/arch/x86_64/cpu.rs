/// CPU feature detection and timestamp/random instructions.

/// CPUID wrapper. Saves/restores rbx since LLVM reserves it.
pub fn cpuid(leaf: u32) -> (u32, u32, u32, u32) {
    let (eax, ebx, ecx, edx): (u32, u32, u32, u32);
    unsafe {
        core::arch::asm!(
            "push rbx",
            "cpuid",
            "mov {ebx_out:e}, ebx",
            "pop rbx",
            inout("eax") leaf => eax,
            ebx_out = out(reg) ebx,
            out("ecx") ecx,
            out("edx") edx,
        );
    }
    (eax, ebx, ecx, edx)
}

/// Check if RDRAND is supported (CPUID.01H:ECX.RDRAND[bit 30]).
pub fn has_rdrand() -> bool {
    let (_, _, ecx, _) = cpuid(1);
    ecx & (1 << 30) != 0
}

/// Check if TSC is invariant (CPUID.80000007H:EDX.TscInvariant[bit 8]).
pub fn has_invariant_tsc() -> bool {
    let (_, _, _, edx) = cpuid(0x80000007);
    edx & (1 << 8) != 0
}

/// Read the Time Stamp Counter.
#[inline(always)]
pub fn rdtsc() -> u64 {
    let (lo, hi): (u32, u32);
    unsafe {
        core::arch::asm!("rdtsc", out("eax") lo, out("edx") hi, options(nostack, preserves_flags));
    }
    ((hi as u64) << 32) | (lo as u64)
}

/// One hardware-random 64-bit value. Retries until the carry flag reports
/// a valid result. Caller must check `has_rdrand()` first.
#[inline]
pub fn rdrand() -> u64 {
    loop {
        let val: u64;
        let ok: u8;
        unsafe {
            core::arch::asm!(
                "rdrand {val}",
                "setc {ok}",
                val = out(reg) val,
                ok = out(reg_byte) ok,
                options(nostack),
            );
        }
        if ok != 0 {
            return val;
        }
        core::hint::spin_loop();
    }
}
