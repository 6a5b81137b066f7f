//! Notifications posted by the management firmware.

use pfmbx_proto::{LinkFailCode, ResetType};

use super::MbxContext;
use crate::device::DeviceOps;
use crate::error::MbxError;

pub fn push_link_status<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    ctx.device.schedule_service_task();
    if ctx.req.subcode() == 0 {
        log_link_fail(ctx.req.data()[0]);
    }
    Ok(())
}

fn log_link_fail(code: u8) {
    match LinkFailCode::from_u8(code) {
        Some(LinkFailCode::RefClockLost) => tracing::warn!("reference clock lost"),
        Some(LinkFailCode::XsfpTxDisable) => tracing::warn!("SFP tx is disabled"),
        Some(LinkFailCode::XsfpAbsent) => tracing::warn!("SFP is absent"),
        Some(LinkFailCode::Normal) | None => {}
    }
}

pub fn ncsi_error<Q, D: DeviceOps>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    tracing::warn!("requesting reset due to NCSI error");
    ctx.device.request_reset(ResetType::Global);
    Ok(())
}
