/// Interface registry — addressing and admin state for every registered
/// interface, keyed by a small integer id.
use alloc::vec::Vec;
use smoltcp::wire::{Ipv4Address, Ipv4Cidr};

use super::driver::UhyveNet;
use super::hypercall::HypercallPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfaceId(pub u8);

struct Entry<P: HypercallPort> {
    id: IfaceId,
    netif: UhyveNet<P>,
    ipv4: Ipv4Cidr,
    gateway: Ipv4Address,
    up: bool,
}

pub struct NetifRegistry<P: HypercallPort> {
    entries: Vec<Entry<P>>,
    default_id: Option<IfaceId>,
}

impl<P: HypercallPort> NetifRegistry<P> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            default_id: None,
        }
    }

    /// Register an interface under `id`. Ids are assigned by the caller
    /// and must be unique.
    pub fn add(&mut self, id: IfaceId, netif: UhyveNet<P>, ipv4: Ipv4Cidr, gateway: Ipv4Address) {
        assert!(
            self.entries.iter().all(|e| e.id != id),
            "interface id registered twice"
        );
        self.entries.push(Entry {
            id,
            netif,
            ipv4,
            gateway,
            up: false,
        });
    }

    /// Route traffic with no more specific match through `id`.
    pub fn set_default(&mut self, id: IfaceId) {
        assert!(self.entries.iter().any(|e| e.id == id), "unknown interface id");
        self.default_id = Some(id);
    }

    /// Mark `id` administratively up.
    pub fn set_up(&mut self, id: IfaceId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.up = true;
        }
    }

    pub fn is_up(&self, id: IfaceId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.up)
    }

    pub fn default_id(&self) -> Option<IfaceId> {
        self.default_id
    }

    /// The default interface's driver, if one was designated.
    pub fn default_mut(&mut self) -> Option<&mut UhyveNet<P>> {
        let id = self.default_id?;
        self.entry_mut(id).map(|e| &mut e.netif)
    }

    pub fn get_mut(&mut self, id: IfaceId) -> Option<&mut UhyveNet<P>> {
        self.entry_mut(id).map(|e| &mut e.netif)
    }

    pub fn ipv4(&self, id: IfaceId) -> Option<Ipv4Cidr> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.ipv4)
    }

    pub fn gateway(&self, id: IfaceId) -> Option<Ipv4Address> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.gateway)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: IfaceId) -> Option<&mut Entry<P>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}
