//! Response emitter and PF-initiated messages.

use pfmbx_proto::payload::{LinkStatus, PortBaseVlan, PUSH_LINK_STATUS_EN};
use pfmbx_proto::{
    encode_resp_status, CmdStatus, Opcode, PfToVfCmd, PortBaseVlanState, RespMsg, RespStatus,
    VfToPfRequest, MBX_MAX_RESP_DATA_SIZE,
};

use crate::device::{CommandQueue, DeviceState};
use crate::error::SendError;
use crate::vport::{PortBaseVlanCfg, Vport};

/// Send the synchronous response to `req`.
///
/// Oversized payloads are clamped and out-of-bound statuses replaced by `EIO`, both with a log
/// line. Send failures are logged and returned; the caller must not treat them as fatal.
pub fn gen_resp_to_vf<Q: CommandQueue>(
    queue: &mut Q,
    req: &VfToPfRequest,
    status: i32,
    resp: &RespMsg,
) -> Result<(), CmdStatus> {
    if resp.is_oversized() {
        tracing::error!(
            len = resp.len(),
            max = MBX_MAX_RESP_DATA_SIZE,
            "response to VF exceeds max len, truncating"
        );
    }

    let resp_status = encode_resp_status(status);
    if let RespStatus::OutOfBound(value) = resp_status {
        tracing::warn!(
            status = value,
            "response status to VF is out-of-bound, sending EIO"
        );
    }

    let cmd = PfToVfCmd::response(req, resp_status, resp.wire_payload());
    tracing::trace!(
        vfid = cmd.dest_vfid,
        code = req.code,
        subcode = req.subcode(),
        status = resp_status.wire(),
        len = resp.wire_payload().len(),
        "sending mailbox response"
    );

    let mut desc = cmd.to_desc();
    queue.send(&mut desc).map_err(|err| {
        tracing::error!(
            %err,
            vfid = req.src_vfid,
            code = req.code,
            subcode = req.subcode(),
            "failed to send response to VF"
        );
        err
    })
}

/// Send a PF-initiated message to `dest_vfid`.
pub fn send_mbx_msg<Q: CommandQueue>(
    queue: &mut Q,
    dest_vfid: u8,
    code: Opcode,
    msg: &[u8],
) -> Result<(), SendError> {
    let cmd = PfToVfCmd::message(dest_vfid, code, msg).map_err(|err| {
        tracing::error!(len = err.len, max = err.max, "msg data length exceeds maximum");
        err
    })?;
    tracing::trace!(vfid = dest_vfid, ?code, len = msg.len(), "sending mailbox message");

    let mut desc = cmd.to_desc();
    queue.send(&mut desc).map_err(|err| {
        tracing::error!(%err, vfid = dest_vfid, ?code, "failed to send mailbox to VF");
        SendError::Cmd(err)
    })
}

fn dest_vfid(vport: &Vport) -> Result<u8, SendError> {
    u8::try_from(vport.vport_id).map_err(|_| SendError::UnknownVport(vport.vport_id))
}

/// Tell the VF that the PF is resetting, translated to the reset kind the VF observes.
pub fn inform_reset_assert<Q: CommandQueue>(
    queue: &mut Q,
    vport: &Vport,
    dev: &DeviceState,
) -> Result<(), SendError> {
    let reset = dev.reset_type.vf_visible();
    send_mbx_msg(
        queue,
        dest_vfid(vport)?,
        Opcode::AssertingReset,
        &reset.encode(),
    )
}

/// Push the current link state, honoring the vport's administrative override.
pub fn push_link_status<Q: CommandQueue>(
    queue: &mut Q,
    vport: &Vport,
    dev: &DeviceState,
) -> Result<(), SendError> {
    let info = LinkStatus {
        link_status: u16::from(vport.effective_link(dev.link_up)),
        speed: dev.speed,
        duplex: dev.duplex,
        flag: PUSH_LINK_STATUS_EN,
    };
    send_mbx_msg(
        queue,
        dest_vfid(vport)?,
        Opcode::LinkStatChange,
        &info.encode(),
    )
}

/// Push a port based VLAN change to the VF.
pub fn push_port_base_vlan_info<Q: CommandQueue>(
    queue: &mut Q,
    vfid: u8,
    state: PortBaseVlanState,
    vlan: &PortBaseVlanCfg,
) -> Result<(), SendError> {
    let msg = PortBaseVlan {
        state: state.as_u16(),
        vlan_proto: vlan.vlan_proto,
        qos: vlan.qos,
        vlan_tag: vlan.vlan_tag,
    };
    send_mbx_msg(queue, vfid, Opcode::PushVlanInfo, &msg.encode())
}
