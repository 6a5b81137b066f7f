//! Read-only queries. Apart from the two link queries, which answer with a PF-initiated message,
//! these only fill the response buffer.

use pfmbx_proto::payload::{
    BasicInfo, LinkMode, MediaType, QueueDepth, QueueInfo, LINK_MODE_SUPPORTED,
    PF_CAP_VLAN_FLTR_MDF, RSS_KEY_SIZE, RSS_KEY_SLICE_LEN,
};
use pfmbx_proto::Opcode;

use super::{data_u16, MbxContext};
use crate::caps::DeviceCaps;
use crate::device::CommandQueue;
use crate::error::MbxError;
use crate::respond::{push_link_status, send_mbx_msg};

pub fn get_basic_info<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let mut info = BasicInfo::default();
    for tc in 0..ctx.vport.num_tc.min(8) {
        info.hw_tc_map |= 1 << tc;
    }
    if ctx.dev.caps.contains(DeviceCaps::VLAN_FLTR_MDF) {
        info.pf_caps |= PF_CAP_VLAN_FLTR_MDF;
    }
    ctx.resp.put(&info.encode());
    Ok(())
}

pub fn get_queue_info<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let info = QueueInfo {
        alloc_tqps: ctx.vport.alloc_tqps,
        rss_size: ctx.vport.rss_size,
        rx_buf_len: ctx.dev.rx_buf_len,
    };
    ctx.resp.put(&info.encode());
    Ok(())
}

pub fn get_queue_depth<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let depth = QueueDepth {
        num_tx_desc: ctx.dev.num_tx_desc,
        num_rx_desc: ctx.dev.num_rx_desc,
    };
    ctx.resp.put(&depth.encode());
    Ok(())
}

pub fn get_mac_addr<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    ctx.resp.put(&ctx.vport.vf_info.mac);
    Ok(())
}

pub fn get_media_type<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let media = MediaType {
        media_type: ctx.dev.media_type,
        module_type: ctx.dev.module_type,
    };
    ctx.resp.put(&media.encode());
    Ok(())
}

/// One 8-byte slice of the RSS hash key, selected by `data[0]`.
pub fn get_rss_key<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let index = usize::from(ctx.req.data()[0]);
    let start = index * RSS_KEY_SLICE_LEN;
    if start + RSS_KEY_SLICE_LEN > RSS_KEY_SIZE {
        tracing::warn!(index, "failed to get the rss hash key, invalid index");
        return Err(MbxError::InvalidArgument);
    }
    ctx.resp
        .put(&ctx.dev.rss_key[start..start + RSS_KEY_SLICE_LEN]);
    Ok(())
}

/// Translate a VF-local queue id to the PF's global numbering.
pub fn get_qid_in_pf<Q, D>(ctx: &mut MbxContext<'_, Q, D>) -> Result<(), MbxError> {
    let queue_id = data_u16(ctx.req);
    let global = if queue_id < ctx.vport.num_tqps() {
        ctx.vport.global_queue_id(queue_id)
    } else {
        None
    };
    let Some(global) = global else {
        tracing::error!(queue_id, vfid = ctx.req.src_vfid, "invalid queue id from VF");
        return Err(MbxError::InvalidArgument);
    };
    ctx.resp.put_u16(global);
    Ok(())
}

pub fn get_link_status<Q: CommandQueue, D>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    push_link_status(ctx.queue, ctx.vport, ctx.dev).map_err(|err| {
        tracing::error!(%err, vport_id = ctx.vport.vport_id, "failed to inform link stat to VF");
        MbxError::from(err)
    })
}

/// Answered with an unsolicited `LinkStatMode` message rather than in the response. Send
/// failures are logged by the sender and do not fail the request.
pub fn get_link_mode<Q: CommandQueue, D>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    let idx = u16::from(ctx.req.data()[0]);
    let link_mode = if idx == LINK_MODE_SUPPORTED {
        ctx.dev.supported
    } else {
        ctx.dev.advertising
    };
    let msg = LinkMode { idx, link_mode };
    if let Err(err) = send_mbx_msg(
        ctx.queue,
        ctx.req.src_vfid,
        Opcode::LinkStatMode,
        &msg.encode(),
    ) {
        tracing::debug!(vf = ctx.vport.vf_index(), %err, "link mode push not delivered");
    }
    Ok(())
}
