/// Boot-time network bring-up: probe the host for a NIC, initialize the
/// driver, and register the interface with the addressing the hypervisor
/// passed in the boot header.
use smoltcp::wire::{Ipv4Address, Ipv4Cidr};

use super::driver::UhyveNet;
use super::hypercall::HypercallPort;
use super::registry::{IfaceId, NetifRegistry};
use super::stack_port::StackPort;
use super::NetError;
use crate::serial_println;
use nimbusos_boot::BootHeader;

/// Prefix length of a contiguous dotted-quad netmask.
pub fn prefix_from_mask(mask: [u8; 4]) -> u8 {
    u32::from_be_bytes(mask).leading_ones() as u8
}

/// Probe for the host NIC and bring up interface 0. `NoDevice` when the
/// hypervisor has no NIC attached; the kernel runs on without a network.
pub fn bring_up<P: HypercallPort>(
    mut port: P,
    stack: &mut dyn StackPort,
    header: &BootHeader,
    registry: &mut NetifRegistry<P>,
) -> Result<IfaceId, NetError> {
    if !port.netstat() {
        serial_println!("[net] no virtual NIC attached");
        return Err(NetError::NoDevice);
    }

    let mut netif = UhyveNet::new(port);
    netif.initialize(stack)?;

    let ip = header.ip();
    let cidr = Ipv4Cidr::new(
        Ipv4Address::new(ip[0], ip[1], ip[2], ip[3]),
        prefix_from_mask(header.netmask()),
    );
    let gw = header.gateway();
    let gateway = Ipv4Address::new(gw[0], gw[1], gw[2], gw[3]);
    serial_println!("[net] en0 addr {} gw {}", cidr, gateway);

    let id = IfaceId(0);
    registry.add(id, netif, cidr, gateway);
    registry.set_default(id);
    registry.set_up(id);
    Ok(id)
}
