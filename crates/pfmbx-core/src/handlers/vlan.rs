use pfmbx_proto::{PortBaseVlanState, TableSubcode, VlanSubcode};

use super::{remove_all_tables, MbxContext};
use crate::caps::DeviceCaps;
use crate::device::DeviceOps;
use crate::error::MbxError;
use crate::mac_table::RemovalMode;

/// VLAN configuration. Subcodes without a PF-side effect succeed without doing anything.
pub fn set_vlan<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let cfg = ctx.req.vlan_cfg();
    let vport_id = ctx.vport.vport_id;
    match VlanSubcode::from_u8(cfg.subcode) {
        Some(VlanSubcode::Filter) => {
            ctx.device
                .set_vlan_filter(vport_id, cfg.proto, cfg.vlan, cfg.is_kill)
        }
        Some(VlanSubcode::RxOffCfg) => ctx.device.en_hw_strip_rxvtag(vport_id, cfg.enable),
        Some(VlanSubcode::GetPortBaseVlanState) => {
            let state = if ctx.dev.caps.contains(DeviceCaps::HIDE_PORT_VLAN_STATE) {
                PortBaseVlanState::Disable
            } else {
                ctx.vport.port_base_vlan.state
            };
            ctx.resp.put_u8(state.as_u16() as u8);
            Ok(())
        }
        Some(VlanSubcode::EnableVlanFilter) => {
            ctx.device.enable_vport_vlan_filter(vport_id, cfg.enable)
        }
        Some(VlanSubcode::TxOffCfg) | Some(VlanSubcode::PortBaseVlanCfg) | None => Ok(()),
    }
}

pub fn handle_vf_tbl<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    match TableSubcode::from_u8(ctx.req.subcode()) {
        Some(TableSubcode::VportListClear) => remove_all_tables(ctx, RemovalMode::Immediate),
        None => {
            tracing::warn!(subcode = ctx.req.subcode(), "invalid VF table command");
        }
    }
    Ok(())
}
