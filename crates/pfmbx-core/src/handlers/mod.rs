//! One handler per mailbox opcode.
//!
//! A handler validates the request, applies its effect through the device collaborators or the
//! vport state, and may fill the response buffer. Whether a response is actually sent is decided
//! by the pump, not by the handler.

pub mod control;
pub mod lifecycle;
pub mod mac;
pub mod query;
pub mod ring;
pub mod vlan;

use pfmbx_proto::{RespMsg, VfToPfRequest};

use crate::device::{DeviceOps, DeviceState};
use crate::error::MbxError;
use crate::mac_table::{MacAddrType, RemovalMode};
use crate::vport::Vport;

/// Everything a handler may touch while processing one request.
pub struct MbxContext<'a, Q, D> {
    pub vport: &'a mut Vport,
    pub req: &'a VfToPfRequest,
    pub resp: &'a mut RespMsg,
    pub queue: &'a mut Q,
    pub device: &'a mut D,
    pub dev: &'a DeviceState,
}

pub type HandlerFn<Q, D> = fn(&mut MbxContext<'_, Q, D>) -> Result<(), MbxError>;

/// Read a little-endian u16 from the start of the request data.
pub(crate) fn data_u16(req: &VfToPfRequest) -> u16 {
    let data = req.data();
    u16::from_le_bytes([data[0], data[1]])
}

pub(crate) fn data_u32(req: &VfToPfRequest) -> u32 {
    let data = req.data();
    u32::from_le_bytes([data[0], data[1], data[2], data[3]])
}

/// Drop every UC/MC address and VLAN entry of the vport.
pub(crate) fn remove_all_tables<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
    mode: RemovalMode,
) {
    let vport_id = ctx.vport.vport_id;
    for addr_type in [MacAddrType::Unicast, MacAddrType::Multicast] {
        let addrs = match ctx.vport.lock_mac_table() {
            Ok(mut table) => table.remove_all(addr_type, mode),
            Err(err) => {
                tracing::error!(vport_id, ?addr_type, %err, "mac table unavailable");
                continue;
            }
        };
        if addrs.is_empty() {
            continue;
        }
        if let Err(err) = ctx.device.remove_mac_entries(vport_id, addr_type, &addrs) {
            tracing::warn!(
                vport_id,
                ?addr_type,
                errno = err.errno(),
                "failed to remove mac entries from hardware"
            );
        }
    }
    ctx.device.remove_all_vlan_entries(vport_id, mode);
}
