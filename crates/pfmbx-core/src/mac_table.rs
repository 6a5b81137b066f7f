//! Per-vport unicast/multicast address lists.
//!
//! The lists record intent; the service task later reconciles them with the hardware MAC table.
//! A node starts as `ToAdd`, becomes `Active` once programmed and `ToDel` when the VF asks for its
//! removal. The table is shared with administrative paths and lives behind the vport's mutex.

use pfmbx_proto::ETH_ALEN;

use crate::error::MbxError;

pub type MacAddr = [u8; ETH_ALEN];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacAddrType {
    Unicast,
    Multicast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacNodeState {
    ToAdd,
    ToDel,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacNode {
    pub addr: MacAddr,
    pub state: MacNodeState,
}

/// Requested change to one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacUpdate {
    Add,
    Remove,
}

/// How bulk removal treats the address lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalMode {
    /// Hardware entries go away but the lists keep the addresses so they are restored once the
    /// VF comes back (function level reset).
    Deferred,
    /// Hardware entries and list nodes are both dropped (VF driver unload).
    Immediate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacTable {
    uc: Vec<MacNode>,
    mc: Vec<MacNode>,
}

pub fn is_zero_ether_addr(addr: &MacAddr) -> bool {
    addr.iter().all(|b| *b == 0)
}

pub fn is_multicast_ether_addr(addr: &MacAddr) -> bool {
    addr[0] & 0x01 != 0
}

/// Non-zero and not multicast (broadcast included).
pub fn is_valid_ether_addr(addr: &MacAddr) -> bool {
    !is_zero_ether_addr(addr) && !is_multicast_ether_addr(addr)
}

impl MacTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, addr_type: MacAddrType) -> &[MacNode] {
        match addr_type {
            MacAddrType::Unicast => &self.uc,
            MacAddrType::Multicast => &self.mc,
        }
    }

    fn list_mut(&mut self, addr_type: MacAddrType) -> &mut Vec<MacNode> {
        match addr_type {
            MacAddrType::Unicast => &mut self.uc,
            MacAddrType::Multicast => &mut self.mc,
        }
    }

    pub fn find(&self, addr_type: MacAddrType, addr: &MacAddr) -> Option<&MacNode> {
        self.list(addr_type).iter().find(|node| node.addr == *addr)
    }

    /// Record a VF add/remove request for `addr`.
    ///
    /// Removing an address that is not in the list fails with [`MbxError::NotFound`].
    pub fn update(
        &mut self,
        addr_type: MacAddrType,
        update: MacUpdate,
        addr: &MacAddr,
    ) -> Result<(), MbxError> {
        let list = self.list_mut(addr_type);
        if let Some(pos) = list.iter().position(|node| node.addr == *addr) {
            match (update, list[pos].state) {
                (MacUpdate::Add, MacNodeState::ToDel) => list[pos].state = MacNodeState::Active,
                (MacUpdate::Remove, MacNodeState::ToAdd) => {
                    // Never reached hardware; forget it.
                    list.remove(pos);
                }
                (MacUpdate::Remove, _) => list[pos].state = MacNodeState::ToDel,
                (MacUpdate::Add, _) => {}
            }
            return Ok(());
        }

        match update {
            MacUpdate::Remove => {
                tracing::warn!(
                    ?addr_type,
                    addr = %format_mac(addr),
                    "failed to delete address, not in mac list"
                );
                Err(MbxError::NotFound)
            }
            MacUpdate::Add => {
                list.try_reserve(1).map_err(|_| MbxError::OutOfMemory)?;
                list.push(MacNode {
                    addr: *addr,
                    state: MacNodeState::ToAdd,
                });
                Ok(())
            }
        }
    }

    /// Replace the device address `old` with `new` in the unicast list.
    ///
    /// `new` is queued for programming (or revived if it was pending deletion) and moved to the
    /// front of the list; `old` is dropped if it never reached hardware, else marked for deletion.
    pub fn replace_dev_addr(&mut self, old: &MacAddr, new: &MacAddr) -> Result<(), MbxError> {
        let list = &mut self.uc;
        match list.iter().position(|node| node.addr == *new) {
            Some(pos) => {
                let mut node = list.remove(pos);
                if node.state == MacNodeState::ToDel {
                    node.state = MacNodeState::Active;
                }
                list.insert(0, node);
            }
            None => {
                list.try_reserve(1).map_err(|_| MbxError::OutOfMemory)?;
                list.insert(
                    0,
                    MacNode {
                        addr: *new,
                        state: MacNodeState::ToAdd,
                    },
                );
            }
        }

        if !is_zero_ether_addr(old) && old != new {
            if let Some(pos) = list.iter().position(|node| node.addr == *old) {
                if list[pos].state == MacNodeState::ToAdd {
                    list.remove(pos);
                } else {
                    list[pos].state = MacNodeState::ToDel;
                }
            }
        }
        Ok(())
    }

    /// Drop every address of `addr_type` according to `mode`.
    ///
    /// Returns the addresses currently programmed in hardware, which the caller must remove.
    pub fn remove_all(&mut self, addr_type: MacAddrType, mode: RemovalMode) -> Vec<MacAddr> {
        let list = self.list_mut(addr_type);
        let in_hw: Vec<MacAddr> = list
            .iter()
            .filter(|node| node.state != MacNodeState::ToAdd)
            .map(|node| node.addr)
            .collect();

        match mode {
            RemovalMode::Immediate => list.clear(),
            RemovalMode::Deferred => {
                list.retain(|node| node.state != MacNodeState::ToDel);
                for node in list.iter_mut() {
                    node.state = MacNodeState::ToAdd;
                }
            }
        }
        in_hw
    }

    /// Mark every pending node of `addr_type` as programmed.
    ///
    /// The mailbox only queues list changes; the service task scheduled through
    /// [`DeviceOps::schedule_service_task`](crate::DeviceOps::schedule_service_task) programs
    /// the hardware and then calls this through [`Vport::lock_mac_table`](crate::Vport::lock_mac_table).
    pub fn mark_synced(&mut self, addr_type: MacAddrType) {
        let list = self.list_mut(addr_type);
        list.retain(|node| node.state != MacNodeState::ToDel);
        for node in list.iter_mut() {
            node.state = MacNodeState::Active;
        }
    }
}

pub(crate) fn format_mac(addr: &MacAddr) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        addr[0], addr[1], addr[2], addr[3], addr[4], addr[5]
    )
}
