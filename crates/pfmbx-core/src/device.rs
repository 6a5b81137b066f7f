//! Seams to the collaborators the mailbox engine drives: the command queue transport and the
//! device-wide configuration operations.

use pfmbx_proto::payload::RSS_KEY_SIZE;
use pfmbx_proto::{CmdDesc, CmdStatus, ResetType};

use crate::caps::DeviceCaps;
use crate::config::MailboxConfig;
use crate::error::MbxError;
use crate::mac_table::{MacAddr, MacAddrType, RemovalMode};
use crate::ring_chain::RingChain;

/// Command queue transport.
///
/// The receive side (CRQ) holds VF→PF mailbox messages posted by firmware. The send side carries
/// PF→VF messages and device queries; [`CommandQueue::send`] completes synchronously.
pub trait CommandQueue {
    /// Whether every posted receive descriptor has been consumed.
    fn crq_empty(&self) -> bool;

    /// Receive descriptor at the software cursor.
    fn crq_current(&self) -> CmdDesc;

    /// Clear the flag of the descriptor at the cursor and move the cursor past it.
    fn crq_advance(&mut self);

    fn crq_cursor(&self) -> u32;

    /// Publish the cursor to the receive-queue head register.
    fn write_crq_head(&mut self, cursor: u32);

    /// Submit one descriptor. On success firmware may have written a completion into `desc`.
    fn send(&mut self, desc: &mut CmdDesc) -> Result<(), CmdStatus>;
}

/// Device-wide operations invoked by handlers. Errors are negative errnos reported verbatim to
/// the VF via [`MbxError::Device`] unless stated otherwise.
pub trait DeviceOps {
    fn vport_start(&mut self, vport_id: u16) -> Result<(), MbxError>;

    fn vport_stop(&mut self, vport_id: u16);

    /// Bind (`enable`) or unbind every ring of `chain` to/from `vector_id`.
    fn bind_ring_with_vector(
        &mut self,
        vport_id: u16,
        vector_id: u8,
        enable: bool,
        chain: &RingChain,
    ) -> Result<(), MbxError>;

    /// Remove programmed MAC entries from the hardware table.
    fn remove_mac_entries(
        &mut self,
        vport_id: u16,
        addr_type: MacAddrType,
        addrs: &[MacAddr],
    ) -> Result<(), MbxError>;

    fn remove_all_vlan_entries(&mut self, vport_id: u16, mode: RemovalMode);

    fn set_vport_mtu(&mut self, vport_id: u16, mtu: u32) -> Result<(), MbxError>;

    /// Reset every queue of the vport.
    fn reset_tqp(&mut self, vport_id: u16) -> Result<(), MbxError>;

    fn func_reset(&mut self, vport_id: u16) -> Result<(), MbxError>;

    /// Request an adapter-level reset. Fire and forget.
    fn request_reset(&mut self, reset: ResetType);

    fn set_vlan_filter(
        &mut self,
        vport_id: u16,
        proto: u16,
        vlan: u16,
        is_kill: bool,
    ) -> Result<(), MbxError>;

    fn en_hw_strip_rxvtag(&mut self, vport_id: u16, enable: bool) -> Result<(), MbxError>;

    fn enable_vport_vlan_filter(&mut self, vport_id: u16, enable: bool) -> Result<(), MbxError>;

    /// Ask the periodic service task to run soon. Never waited on.
    fn schedule_service_task(&mut self);
}

/// Read-mostly device facts reported to VFs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub caps: DeviceCaps,
    pub rx_buf_len: u16,
    pub num_tx_desc: u16,
    pub num_rx_desc: u16,
    pub media_type: u8,
    pub module_type: u8,
    pub link_up: bool,
    pub speed: u32,
    pub duplex: u16,
    pub supported: u64,
    pub advertising: u64,
    pub rss_key: [u8; RSS_KEY_SIZE],
    /// Reset currently being performed by the PF.
    pub reset_type: ResetType,
}

impl DeviceState {
    pub fn from_config(config: &MailboxConfig) -> Self {
        Self {
            caps: config.hw_generation.caps(),
            rx_buf_len: config.rx_buf_len,
            num_tx_desc: config.num_tx_desc,
            num_rx_desc: config.num_rx_desc,
            media_type: 0,
            module_type: 0,
            link_up: false,
            speed: 0,
            duplex: 0,
            supported: 0,
            advertising: 0,
            rss_key: [0; RSS_KEY_SIZE],
            reset_type: ResetType::None,
        }
    }
}
