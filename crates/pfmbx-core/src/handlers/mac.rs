use pfmbx_proto::payload::unicast_addrs;
use pfmbx_proto::{MulticastSubcode, UnicastSubcode, ETH_ALEN};

use super::MbxContext;
use crate::device::DeviceOps;
use crate::error::MbxError;
use crate::mac_table::{
    format_mac, is_valid_ether_addr, is_zero_ether_addr, MacAddr, MacAddrType, MacUpdate,
};
use crate::vport::{PrivFlags, VportState};

fn update_mac_list<Q, D>(
    ctx: &mut MbxContext<'_, Q, D>,
    addr_type: MacAddrType,
    update: MacUpdate,
    addr: &MacAddr,
) -> Result<(), MbxError> {
    ctx.vport
        .lock_mac_table()?
        .update(addr_type, update, addr)?;
    ctx.vport.state |= VportState::MAC_TBL_CHANGE;
    Ok(())
}

pub fn set_unicast<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let (new, old) = unicast_addrs(ctx.req.data());
    match UnicastSubcode::from_u8(ctx.req.subcode()) {
        Some(UnicastSubcode::Modify) => {
            // A host-assigned MAC cannot be overridden from inside the VM.
            let host_mac = ctx.vport.vf_info.mac;
            if !is_zero_ether_addr(&host_mac) && new != host_mac {
                return Err(MbxError::PermissionDenied);
            }
            if !is_valid_ether_addr(&new) {
                return Err(MbxError::InvalidArgument);
            }

            ctx.vport.lock_mac_table()?.replace_dev_addr(&old, &new)?;
            ctx.vport.state |= VportState::MAC_TBL_CHANGE;
            ctx.device.schedule_service_task();
            tracing::debug!(
                vport_id = ctx.vport.vport_id,
                old = %format_mac(&old),
                new = %format_mac(&new),
                "VF changed its device address"
            );
            Ok(())
        }
        Some(UnicastSubcode::Add) => {
            update_mac_list(ctx, MacAddrType::Unicast, MacUpdate::Add, &new)
        }
        Some(UnicastSubcode::Remove) => {
            update_mac_list(ctx, MacAddrType::Unicast, MacUpdate::Remove, &new)
        }
        None => {
            tracing::error!(
                subcode = ctx.req.subcode(),
                "failed to set unicast mac addr, unknown subcode"
            );
            Err(MbxError::Io)
        }
    }
}

/// Multicast list updates always report success to the VF; list errors are only logged.
pub fn set_multicast<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let mut addr = [0u8; ETH_ALEN];
    addr.copy_from_slice(&ctx.req.data()[..ETH_ALEN]);
    let update = match MulticastSubcode::from_u8(ctx.req.subcode()) {
        Some(MulticastSubcode::Add) => MacUpdate::Add,
        Some(MulticastSubcode::Remove) => MacUpdate::Remove,
        None => {
            tracing::error!(
                subcode = ctx.req.subcode(),
                "failed to set mcast mac addr, unknown subcode"
            );
            return Err(MbxError::Io);
        }
    };
    if let Err(err) = update_mac_list(ctx, MacAddrType::Multicast, update, &addr) {
        tracing::debug!(%err, addr = %format_mac(&addr), "multicast list update ignored");
    }
    Ok(())
}

pub fn set_promisc_mode<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    let promisc = ctx.req.promisc();
    let vport = &mut *ctx.vport;
    vport.vf_info.request_uc_en = promisc.en_uc;
    vport.vf_info.request_mc_en = promisc.en_mc;
    vport.vf_info.request_bc_en = promisc.en_bc;
    vport
        .priv_flags
        .set(PrivFlags::LIMIT_PROMISC, promisc.en_limit_promisc);
    vport.state |= VportState::PROMISC_CHANGE;
    ctx.device.schedule_service_task();
    Ok(())
}
