use alloc::vec;
use alloc::vec::Vec;
use smoltcp::wire::{EthernetAddress, Ipv4Address, Ipv4Cidr};

use super::driver::{parse_mac, IfaceState, UhyveNet, ETH_PAD_SIZE, MTU, TX_FRAME_MAX};
use super::frame::FrameChain;
use super::hypercall::MAC_STR_LEN;
use super::mock::{MockPort, RecordingStack};
use super::registry::{IfaceId, NetifRegistry};
use super::setup::{bring_up, prefix_from_mask};
use super::NetError;
use nimbusos_boot::{BootHeader, BOOT_MAGIC, BOOT_VERSION};

const MAC: &str = "52:54:00:12:34:56";

fn ready_netif(port: MockPort) -> UhyveNet<MockPort> {
    let mut netif = UhyveNet::new(port);
    let mut stack = RecordingStack::new(512);
    netif.initialize(&mut stack).unwrap();
    netif
}

fn flatten(frame: &FrameChain) -> Vec<u8> {
    let mut out = vec![0u8; frame.total_len()];
    frame.copy_to(0, &mut out);
    out
}

fn header() -> BootHeader {
    let mut h: BootHeader = unsafe { core::mem::zeroed() };
    h.magic_number = BOOT_MAGIC;
    h.version = BOOT_VERSION;
    h.cpu_online = 1;
    h.hcip = [10, 0, 5, 2];
    h.hcgateway = [10, 0, 5, 1];
    h.hcmask = [255, 255, 255, 0];
    h
}

#[test]
fn initialize_parses_mac_and_publishes_capabilities() {
    let netif = ready_netif(MockPort::new(MAC));
    assert_eq!(netif.state(), IfaceState::Ready);
    assert_eq!(
        netif.mac(),
        EthernetAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0x56])
    );
    assert_eq!(netif.mtu(), MTU);
    let flags = netif.flags();
    assert!(flags.contains(super::NetifFlags::BROADCAST));
    assert!(flags.contains(super::NetifFlags::ETHARP));
    assert!(flags.contains(super::NetifFlags::LINK_UP));
}

#[test]
fn initialize_rejects_garbage_mac() {
    let mut port = MockPort::new(MAC);
    port.mac_str = [b'x'; MAC_STR_LEN];
    let mut netif = UhyveNet::new(port);
    let mut stack = RecordingStack::new(512);
    assert_eq!(netif.initialize(&mut stack), Err(NetError::BadMacAddress));
}

#[test]
#[should_panic(expected = "initialized twice")]
fn initialize_twice_panics() {
    let mut netif = ready_netif(MockPort::new(MAC));
    let mut stack = RecordingStack::new(512);
    let _ = netif.initialize(&mut stack);
}

#[test]
fn initialize_drains_frames_queued_before_interrupts() {
    let mut port = MockPort::new(MAC);
    port.push_rx(&[1, 2, 3]);
    port.push_rx(&[4, 5, 6, 7]);
    let mut netif = UhyveNet::new(port);
    let mut stack = RecordingStack::new(512);
    netif.initialize(&mut stack).unwrap();
    assert_eq!(stack.frames.len(), 2);
    assert_eq!(netif.stats().recv, 2);
}

#[test]
fn idle_poll_is_one_probe_and_nothing_else() {
    let mut netif = ready_netif(MockPort::new(MAC));
    let mut stack = RecordingStack::new(512);
    netif.poll(&mut stack);
    assert_eq!(stack.alloc_calls, 0);
    assert!(stack.frames.is_empty());
    // One probe during this poll on top of the one from initialize.
    assert_eq!(netif.port().netread_calls, 2);
}

#[test]
fn poll_before_ready_touches_nothing() {
    let mut netif = UhyveNet::new(MockPort::new(MAC));
    let mut stack = RecordingStack::new(512);
    netif.poll(&mut stack);
    assert_eq!(netif.port().netread_calls, 0);
}

#[test]
fn poll_preserves_arrival_order() {
    let mut netif = ready_netif(MockPort::new(MAC));
    netif.port_mut().push_rx(&[0xaa; 10]);
    netif.port_mut().push_rx(&[0xbb; 600]);
    netif.port_mut().push_rx(&[0xcc; 20]);
    let mut stack = RecordingStack::new(512);
    netif.poll(&mut stack);

    assert_eq!(stack.frames.len(), 3);
    assert_eq!(flatten(&stack.frames[0])[ETH_PAD_SIZE..], [0xaa; 10]);
    assert_eq!(flatten(&stack.frames[1])[ETH_PAD_SIZE..], [0xbb; 600]);
    assert_eq!(flatten(&stack.frames[2])[ETH_PAD_SIZE..], [0xcc; 20]);
    // The 600-byte frame spans two pool segments.
    assert!(stack.frames[1].segment_count() >= 2);
}

#[test]
fn poll_survives_allocation_failure_mid_drain() {
    let mut netif = ready_netif(MockPort::new(MAC));
    netif.port_mut().push_rx(&[1; 64]);
    netif.port_mut().push_rx(&[2; 64]);
    netif.port_mut().push_rx(&[3; 64]);
    let mut stack = RecordingStack::new(512);
    stack.alloc_budget = Some(1);
    netif.poll(&mut stack);

    // First frame delivered, the rest dropped, device fully drained.
    assert_eq!(stack.frames.len(), 1);
    assert_eq!(netif.stats().recv, 1);
    assert_eq!(netif.stats().dropped, 2);
    assert_eq!(netif.stats().memerr, 2);
    netif.port_mut().push_rx(&[4; 64]);
    let mut fresh = RecordingStack::new(512);
    netif.poll(&mut fresh);
    assert_eq!(fresh.frames.len(), 1);
}

#[test]
fn poll_counts_dispatch_refusals_as_drops() {
    let mut netif = ready_netif(MockPort::new(MAC));
    netif.port_mut().push_rx(&[1; 32]);
    netif.port_mut().push_rx(&[2; 32]);
    let mut stack = RecordingStack::new(512);
    stack.dispatch_budget = Some(1);
    netif.poll(&mut stack);
    assert_eq!(stack.frames.len(), 1);
    assert_eq!(netif.stats().recv, 1);
    assert_eq!(netif.stats().dropped, 1);
    assert_eq!(netif.stats().memerr, 0);
}

#[test]
fn output_flattens_chain_into_one_hypercall() {
    let mut netif = ready_netif(MockPort::new(MAC));
    let mut frame = FrameChain::with_segments(&[700, 700, 392]);
    let payload: Vec<u8> = (0..TX_FRAME_MAX - ETH_PAD_SIZE)
        .map(|i| (i % 251) as u8)
        .collect();
    frame.write_at(ETH_PAD_SIZE, &payload);

    netif.output(&frame).unwrap();
    assert_eq!(netif.port().writes.len(), 1);
    assert_eq!(netif.port().writes[0], payload);
    assert_eq!(netif.stats().xmit, 1);
}

#[test]
fn output_rejects_oversized_frame_before_any_hypercall() {
    let mut netif = ready_netif(MockPort::new(MAC));
    let frame = FrameChain::chunked(TX_FRAME_MAX + 1, 512);
    assert_eq!(netif.output(&frame), Err(NetError::FrameTooLarge));
    assert!(netif.port().writes.is_empty());
    assert_eq!(netif.stats().xmit, 0);
}

#[test]
fn output_reports_host_refusal() {
    let mut netif = ready_netif(MockPort::new(MAC));
    netif.port_mut().write_ret = -1;
    let frame = FrameChain::from_bytes(&[0u8; 64]);
    assert_eq!(netif.output(&frame), Err(NetError::HostRejected));
    assert_eq!(netif.stats().dropped, 1);
}

#[test]
fn mac_parser_accepts_upper_and_lower_hex() {
    let mut s = [0u8; MAC_STR_LEN];
    s[..17].copy_from_slice(b"aA:bB:0c:1D:ee:FF");
    assert_eq!(
        parse_mac(&s),
        Some(EthernetAddress([0xaa, 0xbb, 0x0c, 0x1d, 0xee, 0xff]))
    );
}

#[test]
fn mac_parser_rejects_bad_separator() {
    let mut s = [0u8; MAC_STR_LEN];
    s[..17].copy_from_slice(b"52-54-00-12-34-56");
    assert_eq!(parse_mac(&s), None);
}

#[test]
fn netmask_prefix_lengths() {
    assert_eq!(prefix_from_mask([255, 255, 255, 0]), 24);
    assert_eq!(prefix_from_mask([255, 255, 0, 0]), 16);
    assert_eq!(prefix_from_mask([255, 255, 255, 255]), 32);
    assert_eq!(prefix_from_mask([0, 0, 0, 0]), 0);
}

#[test]
fn registry_tracks_default_and_admin_state() {
    let mut registry = NetifRegistry::new();
    let netif = ready_netif(MockPort::new(MAC));
    let cidr = Ipv4Cidr::new(Ipv4Address::new(10, 0, 5, 2), 24);
    let gw = Ipv4Address::new(10, 0, 5, 1);
    registry.add(IfaceId(0), netif, cidr, gw);

    assert!(!registry.is_up(IfaceId(0)));
    assert!(registry.default_mut().is_none());

    registry.set_default(IfaceId(0));
    registry.set_up(IfaceId(0));
    assert!(registry.is_up(IfaceId(0)));
    assert_eq!(registry.ipv4(IfaceId(0)), Some(cidr));
    assert_eq!(registry.gateway(IfaceId(0)), Some(gw));
    assert!(registry.default_mut().is_some());
}

#[test]
#[should_panic(expected = "registered twice")]
fn registry_rejects_duplicate_ids() {
    let mut registry = NetifRegistry::new();
    let cidr = Ipv4Cidr::new(Ipv4Address::new(10, 0, 5, 2), 24);
    let gw = Ipv4Address::new(10, 0, 5, 1);
    registry.add(IfaceId(0), ready_netif(MockPort::new(MAC)), cidr, gw);
    registry.add(IfaceId(0), ready_netif(MockPort::new(MAC)), cidr, gw);
}

#[test]
fn bring_up_without_device_registers_nothing() {
    let mut port = MockPort::new(MAC);
    port.attached = false;
    let mut stack = RecordingStack::new(512);
    let mut registry = NetifRegistry::new();
    let err = bring_up(port, &mut stack, &header(), &mut registry);
    assert_eq!(err, Err(NetError::NoDevice));
    assert!(registry.is_empty());
}

#[test]
fn bring_up_registers_default_interface_from_header() {
    let port = MockPort::new(MAC);
    let mut stack = RecordingStack::new(512);
    let mut registry = NetifRegistry::new();
    let id = bring_up(port, &mut stack, &header(), &mut registry).unwrap();

    assert_eq!(id, IfaceId(0));
    assert_eq!(registry.default_id(), Some(id));
    assert!(registry.is_up(id));
    assert_eq!(
        registry.ipv4(id),
        Some(Ipv4Cidr::new(Ipv4Address::new(10, 0, 5, 2), 24))
    );
    assert_eq!(registry.gateway(id), Some(Ipv4Address::new(10, 0, 5, 1)));
}

#[test]
fn frames_flow_from_port_to_mailbox_consumer() {
    let (mut stack, frames) = super::MailboxStackPort::new(8).unwrap();
    let mut port = MockPort::new(MAC);
    port.push_rx(&[9; 100]);
    let mut registry = NetifRegistry::new();
    let id = bring_up(port, &mut stack, &header(), &mut registry).unwrap();

    let first = frames.try_fetch().unwrap();
    assert_eq!(flatten(&first)[ETH_PAD_SIZE..], [9; 100]);

    let netif = registry.get_mut(id).unwrap();
    netif.port_mut().push_rx(&[7; 40]);
    netif.poll(&mut stack);
    let second = frames.fetch(50).unwrap();
    assert_eq!(flatten(&second)[ETH_PAD_SIZE..], [7; 40]);
    assert!(matches!(
        frames.fetch(5),
        Err(crate::sys::SysError::TimedOut)
    ));
}
