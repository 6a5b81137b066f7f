//! PF-side state of one virtual port.
//!
//! Vport 0 is the PF itself; VF `n` owns vport `n`, which is also the `mbx_src_vfid` its
//! messages carry. Vports are created when the device is enumerated and afterwards mutated only
//! by handlers running on behalf of their own VF.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use bitflags::bitflags;
use pfmbx_proto::PortBaseVlanState;

use crate::error::MbxError;
use crate::mac_table::{MacAddr, MacTable};

/// First vport id owned by a VF.
pub const VF_VPORT_START_NUM: u16 = 1;

/// Administrative link state override for a VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Follow the physical link.
    #[default]
    Auto,
    Enable,
    Disable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VfInfo {
    /// MAC assigned by the host administrator. All-zero when unset.
    pub mac: MacAddr,
    pub request_uc_en: bool,
    pub request_mc_en: bool,
    pub request_bc_en: bool,
    pub link_state: LinkState,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct VportState: u32 {
        const ALIVE = 1 << 0;
        /// Requested promiscuous flags changed; the service task must reapply them.
        const PROMISC_CHANGE = 1 << 1;
        /// The MAC lists changed; the service task must sync the hardware table.
        const MAC_TBL_CHANGE = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct PrivFlags: u32 {
        const LIMIT_PROMISC = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortBaseVlanCfg {
    pub state: PortBaseVlanState,
    pub vlan_proto: u16,
    pub vlan_tag: u16,
    pub qos: u16,
}

#[derive(Debug)]
pub struct Vport {
    pub vport_id: u16,
    pub alloc_tqps: u16,
    pub rss_size: u16,
    pub num_tc: u8,
    /// Global queue id of each VF-local queue.
    tqp_global_ids: Vec<u16>,
    pub vf_info: VfInfo,
    pub priv_flags: PrivFlags,
    pub state: VportState,
    pub last_active: Option<Instant>,
    pub port_base_vlan: PortBaseVlanCfg,
    mac_table: Arc<Mutex<MacTable>>,
}

impl Vport {
    /// A vport owning the global queues `tqp_global_ids`, of which the first `rss_size` take part
    /// in RSS. `rss_size` is clamped to the number of queues.
    pub fn new(vport_id: u16, tqp_global_ids: Vec<u16>, rss_size: u16) -> Self {
        let alloc_tqps = u16::try_from(tqp_global_ids.len()).unwrap_or(u16::MAX);
        Self {
            vport_id,
            alloc_tqps,
            rss_size: rss_size.min(alloc_tqps),
            num_tc: 1,
            tqp_global_ids,
            vf_info: VfInfo::default(),
            priv_flags: PrivFlags::empty(),
            state: VportState::empty(),
            last_active: None,
            port_base_vlan: PortBaseVlanCfg::default(),
            mac_table: Arc::new(Mutex::new(MacTable::new())),
        }
    }

    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.vf_info.mac = mac;
        self
    }

    pub fn with_num_tc(mut self, num_tc: u8) -> Self {
        self.num_tc = num_tc;
        self
    }

    pub fn num_tqps(&self) -> u16 {
        self.alloc_tqps
    }

    /// Translate a VF-local queue index to the global queue id.
    pub fn global_queue_id(&self, local: u16) -> Option<u16> {
        self.tqp_global_ids.get(usize::from(local)).copied()
    }

    /// VF number as seen by the administrator (vport id minus the PF's own vport).
    pub fn vf_index(&self) -> u16 {
        self.vport_id.saturating_sub(VF_VPORT_START_NUM)
    }

    /// Shared handle for administrative paths.
    pub fn mac_table(&self) -> Arc<Mutex<MacTable>> {
        Arc::clone(&self.mac_table)
    }

    pub fn lock_mac_table(&self) -> Result<MutexGuard<'_, MacTable>, MbxError> {
        self.mac_table.lock().map_err(|_| MbxError::Io)
    }

    /// Link state reported to the VF given the physical link, honoring the override.
    pub fn effective_link(&self, mac_link_up: bool) -> bool {
        match self.vf_info.link_state {
            LinkState::Enable => true,
            LinkState::Disable => false,
            LinkState::Auto => mac_link_up,
        }
    }
}
