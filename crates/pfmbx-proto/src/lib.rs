//! Wire format of the PF/VF mailbox.
//!
//! Every mailbox message travels inside a single fixed-size command descriptor
//! ([`CmdDesc`]). VF→PF requests and PF→VF responses/notifications overlay the descriptor's
//! 24-byte data area; the layouts here are the interoperability contract with the VF driver and
//! the adapter firmware, so all multi-byte fields are little-endian and every offset is fixed.
//!
//! This crate only encodes and decodes. Validation that depends on device state (queue ranges,
//! MAC ownership, ...) lives in `pfmbx-core`.
#![forbid(unsafe_code)]

pub mod desc;
pub mod errno;
pub mod opcode;
pub mod payload;
pub mod request;
pub mod response;

pub use desc::{CmdDesc, CmdStatus, DecodeError};
pub use opcode::{
    LinkFailCode, MulticastSubcode, Opcode, TableSubcode, UnicastSubcode, VlanSubcode,
};
pub use payload::{PortBaseVlanState, ResetType};
pub use request::{
    PromiscRequest, RingChainParam, RingMapRequest, VfToPfRequest, VlanCfg, RING_TYPE_RX,
    RING_TYPE_TX,
};
pub use response::{
    encode_resp_status, MessageTooLong, PfToVfBody, PfToVfCmd, RespMsg, RespStatus,
};

/// Maximum payload carried by one mailbox message, in bytes.
pub const MBX_MAX_MSG_SIZE: usize = 14;

/// Maximum payload of a synchronous PF→VF response, in bytes.
pub const MBX_MAX_RESP_DATA_SIZE: usize = 8;

/// Maximum number of ring entries a single map/unmap request may carry.
pub const MBX_MAX_RING_CHAIN_PARAM_NUM: usize = 4;

/// Response status values at or above this are reserved (`SHRT_MAX`).
pub const RESP_STATUS_SENTINEL: u16 = i16::MAX as u16;

/// Length of an Ethernet MAC address.
pub const ETH_ALEN: usize = 6;
