/// Interrupt Descriptor Table — exception reporting plus a registration
/// hook for hardware IRQ lines (the virtual NIC driver installs its
/// receive handler here).
use spin::Mutex;

/// Flat kernel code selector installed by the loader's GDT.
const KERNEL_CS: u16 = 0x08;

/// IDT entry (16 bytes on x86_64).
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct IdtEntry {
    offset_low: u16,
    selector: u16,
    ist: u8,
    type_attr: u8,
    offset_mid: u16,
    offset_high: u32,
    _reserved: u32,
}

impl IdtEntry {
    pub const fn missing() -> Self {
        Self {
            offset_low: 0,
            selector: 0,
            ist: 0,
            type_attr: 0, // NOT present
            offset_mid: 0,
            offset_high: 0,
            _reserved: 0,
        }
    }

    /// Create a present interrupt gate entry (DPL=0).
    pub fn interrupt_gate(handler: u64) -> Self {
        Self {
            offset_low: handler as u16,
            selector: KERNEL_CS,
            ist: 0,
            type_attr: 0x8E, // present | interrupt gate | DPL=0
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            _reserved: 0,
        }
    }
}

/// The IDT — 256 entries.
#[repr(C, align(16))]
pub struct Idt {
    pub entries: [IdtEntry; 256],
}

impl Idt {
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::missing(); 256],
        }
    }
}

#[repr(C, packed)]
struct IdtPointer {
    limit: u16,
    base: u64,
}

/// Global IDT. Lives in a Mutex so IRQ gates can be installed after boot;
/// the CPU reads entries from memory on each interrupt, so updates take
/// effect without reloading.
static IDT: Mutex<Idt> = Mutex::new(Idt::new());

/// Interrupt stack frame pushed by the CPU before our handler runs.
#[repr(C)]
pub struct InterruptFrame {
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// A hardware interrupt handler. The `x86-interrupt` ABI makes the
/// compiler emit the register save/restore and `iretq` — handlers are
/// plain, non-blocking functions.
pub type IrqHandler = extern "x86-interrupt" fn(InterruptFrame);

/// Initialize the IDT with exception handlers and load it.
///
/// # Safety
/// Must be called once during boot, before interrupts are enabled.
pub unsafe fn init() {
    let mut idt = IDT.lock();

    idt.entries[0] = IdtEntry::interrupt_gate(isr_de as *const () as u64);
    idt.entries[3] = IdtEntry::interrupt_gate(isr_bp as *const () as u64);
    idt.entries[6] = IdtEntry::interrupt_gate(isr_ud as *const () as u64);
    idt.entries[8] = IdtEntry::interrupt_gate(isr_df as *const () as u64);
    idt.entries[13] = IdtEntry::interrupt_gate(isr_gp as *const () as u64);
    idt.entries[14] = IdtEntry::interrupt_gate(isr_pf as *const () as u64);

    // PIC IRQs (remapped to 32-47) — spurious stub until a driver
    // registers something better.
    for i in 32..48 {
        idt.entries[i] = IdtEntry::interrupt_gate(isr_irq_stub as *const () as u64);
    }

    let ptr = IdtPointer {
        limit: (core::mem::size_of::<Idt>() - 1) as u16,
        base: &*idt as *const Idt as u64,
    };
    core::arch::asm!("lidt [{}]", in(reg) &ptr, options(nostack));
}

/// Install `handler` on PIC line `irq` (0-15). The caller is responsible
/// for unmasking the line afterwards.
///
/// # Safety
/// Must be called after `init`. The handler must not block.
pub unsafe fn register_irq_handler(irq: u8, handler: IrqHandler) {
    assert!(irq < 16, "PIC has 16 lines");
    let mut idt = IDT.lock();
    idt.entries[32 + irq as usize] = IdtEntry::interrupt_gate(handler as *const () as u64);
}

// ---- Exception handlers ----

extern "x86-interrupt" fn isr_de(frame: InterruptFrame) {
    exception_handler("Division by zero (#DE)", &frame, None);
}

extern "x86-interrupt" fn isr_bp(frame: InterruptFrame) {
    // Breakpoint — don't halt, just log
    crate::serial_println!("[int] Breakpoint at {:#x}", frame.rip);
}

extern "x86-interrupt" fn isr_ud(frame: InterruptFrame) {
    exception_handler("Invalid opcode (#UD)", &frame, None);
}

extern "x86-interrupt" fn isr_df(frame: InterruptFrame, error_code: u64) {
    exception_handler("Double fault (#DF)", &frame, Some(error_code));
}

extern "x86-interrupt" fn isr_gp(frame: InterruptFrame, error_code: u64) {
    exception_handler("General protection fault (#GP)", &frame, Some(error_code));
}

extern "x86-interrupt" fn isr_pf(frame: InterruptFrame, error_code: u64) {
    let cr2: u64;
    unsafe { core::arch::asm!("mov {}, cr2", out(reg) cr2, options(nostack, nomem)); }
    crate::serial_println!("!!! PAGE FAULT at {:#x} !!!", cr2);
    exception_handler("Page fault (#PF)", &frame, Some(error_code));
}

extern "x86-interrupt" fn isr_irq_stub(_frame: InterruptFrame) {
    // Unclaimed line — acknowledge so the PIC doesn't wedge
    super::pic::send_eoi_both();
}

/// Common exception reporting.
fn exception_handler(name: &str, frame: &InterruptFrame, error_code: Option<u64>) -> ! {
    crate::serial_println!("!!! CPU EXCEPTION: {} !!!", name);
    if let Some(code) = error_code {
        crate::serial_println!("  Error code: {:#x}", code);
    }
    crate::serial_println!("  RIP:     {:#x}", frame.rip);
    crate::serial_println!("  RFLAGS:  {:#x}", frame.rflags);
    crate::serial_println!("  RSP:     {:#x}", frame.rsp);
    loop {
        super::hlt();
    }
}
