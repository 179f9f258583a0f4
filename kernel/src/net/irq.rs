/// Interrupt wiring for the virtual NIC.
///
/// The host raises one edge per batch of pending frames; the handler
/// drains the device completely before acknowledging, so a lost edge
/// never strands frames.
use spin::{Mutex, Once};

use super::driver::UhyveNet;
use super::hypercall::UhyvePort;
use super::registry::NetifRegistry;
use super::stack_port::MailboxStackPort;
use super::UHYVE_IRQ;
use crate::arch::x86_64::idt::{self, InterruptFrame};
use crate::arch::x86_64::pic;

/// Everything the interrupt handler needs, installed once at boot.
pub struct IrqNet {
    pub registry: NetifRegistry<UhyvePort>,
    pub stack: MailboxStackPort,
}

static ACTIVE: Once<Mutex<IrqNet>> = Once::new();

/// Install the interrupt-side network state. Later calls return the
/// first installation.
pub fn install(net: IrqNet) -> &'static Mutex<IrqNet> {
    ACTIVE.call_once(|| Mutex::new(net))
}

/// Point the NIC's interrupt vector at the drain handler and unmask the
/// line. Call after `install`.
pub fn arm() {
    unsafe {
        idt::register_irq_handler(UHYVE_IRQ, nic_irq_handler);
    }
    pic::unmask(UHYVE_IRQ);
}

/// Drain the default interface outside interrupt context. Also the
/// catch-up poll for frames that arrived before `arm`.
pub fn poll_now() {
    if let Some(active) = ACTIVE.get() {
        let mut net = active.lock();
        let IrqNet { registry, stack } = &mut *net;
        if let Some(netif) = registry.default_mut() {
            netif.poll(stack);
        }
    }
}

extern "x86-interrupt" fn nic_irq_handler(_frame: InterruptFrame) {
    poll_now();
    pic::send_eoi(UHYVE_IRQ);
}

pub fn default_netif_stats() -> Option<super::driver::LinkStats> {
    let active = ACTIVE.get()?;
    let mut net = active.lock();
    net.registry.default_mut().map(|n| n.stats())
}
