//! Kernel entry point for the uhyve guest target.
//!
//! The hypervisor loads the image, writes the boot header at its base,
//! and jumps to `kmain` on the boot processor.
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod boot {
    use nimbusos_kernel::arch::x86_64::{self, idt, pic, timer};
    use nimbusos_kernel::net::irq::{self, IrqNet};
    use nimbusos_kernel::net::hypercall::UhyvePort;
    use nimbusos_kernel::net::{setup, MailboxStackPort, NetifRegistry};
    use nimbusos_kernel::sys::{SysContext, SysError};
    use nimbusos_kernel::{serial_print, serial_println};
    use nimbusos_boot::BootHeader;

    extern "C" {
        static kernel_start: u8;
    }

    /// Frames the interrupt path may hold for the network task.
    const RX_MAILBOX_DEPTH: usize = 64;

    #[no_mangle]
    pub extern "C" fn kmain() -> ! {
        x86_64::serial::SERIAL.lock().init();
        serial_println!("NimbusOS booting");

        unsafe {
            pic::init();
            idt::init();
        }
        timer::calibrate_tsc();
        serial_println!("[timer] TSC at {} Hz", timer::tsc_freq_hz());

        let header = unsafe {
            BootHeader::from_ptr(&kernel_start as *const u8 as *const BootHeader)
        };
        if !header.is_valid() {
            panic!("boot header magic/version mismatch");
        }
        nimbusos_kernel::mem::set_phys_offset(0);

        let ctx = SysContext::from_clock(header.cores());
        serial_println!(
            "[sys] {} core(s), rng probe {}",
            ctx.cores(),
            ctx.rng.next()
        );

        let (mut stack, frames) = match MailboxStackPort::new(RX_MAILBOX_DEPTH) {
            Ok(pair) => pair,
            Err(e) => panic!("receive mailbox: {}", e),
        };
        let mut registry = NetifRegistry::new();
        match setup::bring_up(UhyvePort::new(), &mut stack, header, &mut registry) {
            Ok(_id) => {
                irq::install(IrqNet { registry, stack });
                irq::arm();
                // Frames that raced interrupt arming; interrupts are
                // still masked, so this cannot contend with the handler.
                irq::poll_now();
                x86_64::sti();
            }
            Err(e) => {
                serial_println!("[net] disabled: {}", e);
                x86_64::sti();
            }
        }

        // The designated network task: everything the interrupt handler
        // queued is consumed here, outside interrupt context. The mailbox
        // lock is only taken with interrupts masked; the handler posts
        // into the same mailbox.
        loop {
            x86_64::cli();
            let next = frames.try_fetch();
            x86_64::sti();
            match next {
                Ok(frame) => {
                    serial_println!("[net] frame, {} bytes", frame.total_len());
                }
                Err(SysError::Empty) => x86_64::hlt(),
                Err(e) => {
                    serial_println!("[net] receive mailbox gone: {}", e);
                    break;
                }
            }
        }
        loop {
            x86_64::hlt();
        }
    }

    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo) -> ! {
        serial_print!("\nKERNEL PANIC: ");
        serial_println!("{}", info);
        loop {
            x86_64::hlt();
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
