use std::time::Instant;

use pfmbx_proto::payload::QUEUE_RESET_ALL_DONE;

use super::{data_u16, data_u32, remove_all_tables, MbxContext};
use crate::device::DeviceOps;
use crate::error::MbxError;
use crate::mac_table::RemovalMode;
use crate::vport::VportState;

pub fn reset<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    tracing::warn!(vf = ctx.vport.vf_index(), "PF received VF reset request");
    ctx.device.func_reset(ctx.vport.vport_id)
}

/// All of a VF's queues are reset together when it asks for queue 0; requests for other queues
/// are acknowledged without touching the hardware.
pub fn queue_reset<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let queue_id = data_u16(ctx.req);
    ctx.resp.put_u8(QUEUE_RESET_ALL_DONE);
    if queue_id > 0 {
        return Ok(());
    }
    ctx.device.reset_tqp(ctx.vport.vport_id).map_err(|err| {
        tracing::error!(vf = ctx.vport.vf_index(), %err, "failed to reset vf queues");
        err
    })
}

pub fn keep_alive<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    ctx.vport.last_active = Some(Instant::now());
    Ok(())
}

/// Start or stop the VF data path.
///
/// The device call is made on every request; `ALIVE` only records the last outcome, since a VF
/// reset leaves it stale.
pub fn set_alive<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let alive = ctx.req.data()[0] != 0;
    let vport = &mut *ctx.vport;
    if alive {
        ctx.device.vport_start(vport.vport_id)?;
        vport.state.insert(VportState::ALIVE);
        vport.last_active = Some(Instant::now());
    } else {
        ctx.device.vport_stop(vport.vport_id);
        vport.state.remove(VportState::ALIVE);
    }
    Ok(())
}

pub fn set_mtu<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let mtu = data_u32(ctx.req);
    ctx.device.set_vport_mtu(ctx.vport.vport_id, mtu)
}

/// Firmware reports a finished FLR: hardware entries go, the lists stay for restore.
pub fn flr_status<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    remove_all_tables(ctx, RemovalMode::Deferred);
    Ok(())
}

/// The VF driver is unloading: hardware entries and lists are both dropped.
pub fn uninit<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    remove_all_tables(ctx, RemovalMode::Immediate);
    Ok(())
}
