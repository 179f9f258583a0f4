//! NimbusOS kernel library: x86_64 glue, the OS abstraction layer the
//! TCP/IP stack runs on, and the uhyve virtual NIC driver.
//!
//! `sys` and `net` are hardware-independent behind trait seams and build
//! for the host, which is where the test suite runs. The `arch` and `mem`
//! modules only build for the kernel target; tests get a small stub
//! standing in for the clock, CPU feature probes, and the serial console.
#![no_std]
#![cfg_attr(not(test), feature(abi_x86_interrupt))]

extern crate alloc;
#[cfg(test)]
extern crate std;

#[cfg(not(test))]
pub mod arch;
#[cfg(not(test))]
pub mod mem;

pub mod net;
pub mod sys;

/// Host-side stand-ins for the arch layer, mirroring the paths the rest
/// of the crate uses.
#[cfg(test)]
pub mod arch {
    pub mod x86_64 {
        pub fn cli() {}

        pub fn sti() {}

        pub fn interrupts_enabled() -> bool {
            false
        }

        pub mod cpu {
            pub fn has_rdrand() -> bool {
                false
            }

            pub fn rdrand() -> u64 {
                0
            }
        }

        pub mod timer {
            use std::sync::OnceLock;
            use std::time::Instant;

            static EPOCH: OnceLock<Instant> = OnceLock::new();

            pub fn monotonic_ms() -> u64 {
                let epoch = EPOCH.get_or_init(Instant::now);
                epoch.elapsed().as_millis() as u64
            }
        }

        pub mod serial {
            use core::fmt;
            use spin::Mutex;

            pub static SERIAL: Mutex<Serial> = Mutex::new(Serial);

            pub struct Serial;

            impl fmt::Write for Serial {
                fn write_str(&mut self, s: &str) -> fmt::Result {
                    std::print!("{}", s);
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        {
            use core::fmt::Write;
            let mut serial = $crate::arch::x86_64::serial::SERIAL.lock();
            let _ = write!(serial, $($arg)*);
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*))
    };
}
