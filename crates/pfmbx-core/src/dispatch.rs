//! Opcode → handler table.

use pfmbx_proto::Opcode;

use crate::device::{CommandQueue, DeviceOps};
use crate::handlers::{control, lifecycle, mac, query, ring, vlan, HandlerFn};

/// Handler for `opcode`, or `None` when the PF does not serve it (PF→VF opcodes and requests
/// that are reserved or no longer used).
pub fn handler_for<Q: CommandQueue, D: DeviceOps>(opcode: Opcode) -> Option<HandlerFn<Q, D>> {
    let handler: HandlerFn<Q, D> = match opcode {
        Opcode::Reset => lifecycle::reset,
        Opcode::SetUnicast => mac::set_unicast,
        Opcode::SetMulticast => mac::set_multicast,
        Opcode::SetVlan => vlan::set_vlan,
        Opcode::MapRingToVector => ring::map_ring_to_vector,
        Opcode::UnmapRingToVector => ring::unmap_ring_to_vector,
        Opcode::SetPromiscMode => mac::set_promisc_mode,
        Opcode::GetQinfo => query::get_queue_info,
        Opcode::GetQdepth => query::get_queue_depth,
        Opcode::GetBasicInfo => query::get_basic_info,
        Opcode::GetRssKey => query::get_rss_key,
        Opcode::GetMacAddr => query::get_mac_addr,
        Opcode::GetLinkStatus => query::get_link_status,
        Opcode::QueueReset => lifecycle::queue_reset,
        Opcode::KeepAlive => lifecycle::keep_alive,
        Opcode::SetAlive => lifecycle::set_alive,
        Opcode::SetMtu => lifecycle::set_mtu,
        Opcode::GetQidInPf => query::get_qid_in_pf,
        Opcode::GetLinkMode => query::get_link_mode,
        Opcode::GetMediaType => query::get_media_type,
        Opcode::VfUninit => lifecycle::uninit,
        Opcode::HandleVfTbl => vlan::handle_vf_tbl,
        Opcode::GetRingVectorMap => ring::get_ring_vector_map,
        Opcode::GetVfFlrStatus => lifecycle::flr_status,
        Opcode::PushLinkStatus => control::push_link_status,
        Opcode::NcsiError => control::ncsi_error,

        Opcode::AssertingReset
        | Opcode::SetMacVlan
        | Opcode::ApiNegotiate
        | Opcode::GetReta
        | Opcode::PfVfResp
        | Opcode::GetBdNum
        | Opcode::GetBufSize
        | Opcode::GetStreamId
        | Opcode::SetAeStart
        | Opcode::SetTsoStats
        | Opcode::LinkStatChange
        | Opcode::GetBaseConfig
        | Opcode::BindFuncQueue
        | Opcode::LinkStatMode
        | Opcode::PushVlanInfo
        | Opcode::PushPromiscInfo => return None,
    };
    Some(handler)
}
