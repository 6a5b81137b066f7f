use pfmbx_proto::desc::vector_chain;
use pfmbx_proto::payload::RingVectorMapInfo;

use super::MbxContext;
use crate::device::{CommandQueue, DeviceOps};
use crate::error::MbxError;
use crate::ring_chain::RingChain;

fn map_unmap<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
    enable: bool,
) -> Result<(), MbxError> {
    let req = ctx.req.ring_map();
    let chain = RingChain::from_request(&req, ctx.vport)?;
    ctx.device
        .bind_ring_with_vector(ctx.vport.vport_id, req.vector_id, enable, &chain)
}

pub fn map_ring_to_vector<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    map_unmap(ctx, true)
}

pub fn unmap_ring_to_vector<Q, D: DeviceOps>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    map_unmap(ctx, false)
}

/// Report the vector and coalesce index bound to the first ring of the request.
pub fn get_ring_vector_map<Q: CommandQueue, D>(
    ctx: &mut MbxContext<'_, Q, D>,
) -> Result<(), MbxError> {
    let mut req = ctx.req.ring_map();
    req.ring_num = 1;
    let chain = RingChain::from_request(&req, ctx.vport)?;
    let node = chain.first().ok_or(MbxError::InvalidArgument)?;

    let vfid = u8::try_from(ctx.vport.vport_id).map_err(|_| MbxError::InvalidArgument)?;
    let mut desc = vector_chain::query(node.ring_type.as_u8(), node.tqp_index, vfid);
    ctx.queue.send(&mut desc).map_err(|err| {
        tracing::error!(%err, vfid, "get VF ring vector map info failed");
        MbxError::Cmd(err)
    })?;

    let info = RingVectorMapInfo {
        ring_type: req.params[0].ring_type,
        tqp_index: req.params[0].tqp_index,
        int_gl_index: vector_chain::int_gl_index(&desc),
        vector_id: vector_chain::vector_id_l(&desc),
    };
    ctx.resp.put(&info.encode());
    Ok(())
}
