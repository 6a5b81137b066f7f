//! VF→PF request envelope.
//!
//! Layout of the descriptor data area:
//!
//! | offset | field                                  |
//! |--------|----------------------------------------|
//! | 0      | reserved                               |
//! | 1      | `mbx_src_vfid` (filled by firmware)    |
//! | 2      | `mbx_need_resp` (bit 0)                |
//! | 3      | reserved                               |
//! | 4      | `msg_len`                              |
//! | 5      | reserved                               |
//! | 6..8   | `match_id` (u16)                       |
//! | 8      | `msg.code`                             |
//! | 9..24  | opcode-dependent body (15 bytes)       |
//!
//! The body is a union: `subcode | data[14]` for most opcodes, the promiscuous-mode flags for
//! [`Opcode::SetPromiscMode`], or `vector_id | ring_num | param[4]` for ring mapping requests.
//! The typed views below read the union without copying it.

use crate::desc::{CmdDesc, DecodeError, CMDQ_RX_OUTVLD, CMD_DESC_DATA_LEN, OPC_MBX_VF_TO_PF};
use crate::opcode::Opcode;
use crate::{MBX_MAX_MSG_SIZE, MBX_MAX_RING_CHAIN_PARAM_NUM};

const OFF_SRC_VFID: usize = 1;
const OFF_NEED_RESP: usize = 2;
const OFF_MSG_LEN: usize = 4;
const OFF_MATCH_ID: usize = 6;
const OFF_CODE: usize = 8;
const OFF_BODY: usize = 9;

/// Size of the opcode-dependent body.
pub const VF_TO_PF_BODY_LEN: usize = CMD_DESC_DATA_LEN - OFF_BODY;

/// Bit in `mbx_need_resp` requesting a synchronous response.
pub const MBX_NEED_RESP: u8 = 1 << 0;

/// Ring type bit values used in [`RingChainParam::ring_type`].
pub const RING_TYPE_TX: u8 = 0;
pub const RING_TYPE_RX: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingChainParam {
    pub ring_type: u8,
    pub tqp_index: u8,
    pub int_gl_index: u8,
}

/// View of a map/unmap/query ring-to-vector request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingMapRequest {
    pub vector_id: u8,
    pub ring_num: u8,
    pub params: [RingChainParam; MBX_MAX_RING_CHAIN_PARAM_NUM],
}

/// View of a [`Opcode::SetPromiscMode`] request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromiscRequest {
    pub en_bc: bool,
    pub en_uc: bool,
    pub en_mc: bool,
    pub en_limit_promisc: bool,
}

/// View of a [`Opcode::SetVlan`] / [`Opcode::HandleVfTbl`] request body.
///
/// `is_kill` and `enable` alias the same byte; which one is meaningful depends on the subcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanCfg {
    pub subcode: u8,
    pub is_kill: bool,
    pub enable: bool,
    pub vlan: u16,
    pub proto: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfToPfRequest {
    pub src_vfid: u8,
    pub need_resp: bool,
    pub msg_len: u8,
    pub match_id: u16,
    pub code: u8,
    pub body: [u8; VF_TO_PF_BODY_LEN],
}

impl VfToPfRequest {
    /// An empty request for `code` (VF side / tests). `msg_len` defaults to the maximum.
    pub fn new(code: Opcode) -> Self {
        Self {
            src_vfid: 0,
            need_resp: false,
            msg_len: MBX_MAX_MSG_SIZE as u8,
            match_id: 0,
            code: code.as_u8(),
            body: [0; VF_TO_PF_BODY_LEN],
        }
    }

    pub fn with_src_vfid(mut self, vfid: u8) -> Self {
        self.src_vfid = vfid;
        self
    }

    pub fn with_need_resp(mut self, need_resp: bool) -> Self {
        self.need_resp = need_resp;
        self
    }

    pub fn with_match_id(mut self, match_id: u16) -> Self {
        self.match_id = match_id;
        self
    }

    pub fn with_subcode(mut self, subcode: u8) -> Self {
        self.body[0] = subcode;
        self
    }

    /// Copy `data` into the body after the subcode byte. Excess bytes are ignored.
    pub fn with_data(mut self, data: &[u8]) -> Self {
        let len = data.len().min(VF_TO_PF_BODY_LEN - 1);
        self.body[1..1 + len].copy_from_slice(&data[..len]);
        self
    }

    pub fn with_promisc(mut self, promisc: PromiscRequest) -> Self {
        self.body[0] = promisc.en_bc as u8;
        self.body[1] = promisc.en_uc as u8;
        self.body[2] = promisc.en_mc as u8;
        self.body[3] = promisc.en_limit_promisc as u8;
        self
    }

    /// Fill the ring-mapping union. `ring_num` is taken from `params.len()`, so callers that want
    /// to exercise oversized counts should follow up with [`VfToPfRequest::with_ring_num`].
    pub fn with_ring_map(mut self, vector_id: u8, params: &[RingChainParam]) -> Self {
        self.body[0] = vector_id;
        self.body[1] = params.len() as u8;
        for (i, param) in params.iter().take(MBX_MAX_RING_CHAIN_PARAM_NUM).enumerate() {
            let at = 2 + i * 3;
            self.body[at] = param.ring_type;
            self.body[at + 1] = param.tqp_index;
            self.body[at + 2] = param.int_gl_index;
        }
        self
    }

    pub fn with_ring_num(mut self, ring_num: u8) -> Self {
        self.body[1] = ring_num;
        self
    }

    pub fn with_vlan_cfg(mut self, cfg: VlanCfg) -> Self {
        self.body[0] = cfg.subcode;
        self.body[1] = (cfg.is_kill || cfg.enable) as u8;
        self.body[2..4].copy_from_slice(&cfg.vlan.to_le_bytes());
        self.body[4..6].copy_from_slice(&cfg.proto.to_le_bytes());
        self
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.code)
    }

    pub fn subcode(&self) -> u8 {
        self.body[0]
    }

    /// Payload following the subcode byte.
    /// Body bytes after the subcode.
    pub fn data(&self) -> &[u8; MBX_MAX_MSG_SIZE] {
        let [_, data @ ..] = &self.body;
        data
    }

    pub fn promisc(&self) -> PromiscRequest {
        PromiscRequest {
            en_bc: self.body[0] != 0,
            en_uc: self.body[1] != 0,
            en_mc: self.body[2] != 0,
            en_limit_promisc: self.body[3] != 0,
        }
    }

    pub fn ring_map(&self) -> RingMapRequest {
        let mut params = [RingChainParam::default(); MBX_MAX_RING_CHAIN_PARAM_NUM];
        for (i, param) in params.iter_mut().enumerate() {
            let at = 2 + i * 3;
            *param = RingChainParam {
                ring_type: self.body[at],
                tqp_index: self.body[at + 1],
                int_gl_index: self.body[at + 2],
            };
        }
        RingMapRequest {
            vector_id: self.body[0],
            ring_num: self.body[1],
            params,
        }
    }

    pub fn vlan_cfg(&self) -> VlanCfg {
        VlanCfg {
            subcode: self.body[0],
            is_kill: self.body[1] != 0,
            enable: self.body[1] != 0,
            vlan: u16::from_le_bytes([self.body[2], self.body[3]]),
            proto: u16::from_le_bytes([self.body[4], self.body[5]]),
        }
    }

    /// Decode the descriptor data area of a received mailbox message.
    ///
    /// Messages whose declared length exceeds [`MBX_MAX_MSG_SIZE`] are rejected here, before any
    /// dispatch happens.
    pub fn decode(data: &[u8; CMD_DESC_DATA_LEN]) -> Result<Self, DecodeError> {
        let msg_len = data[OFF_MSG_LEN];
        if usize::from(msg_len) > MBX_MAX_MSG_SIZE {
            return Err(DecodeError::LengthExceeded {
                len: msg_len.into(),
                max: MBX_MAX_MSG_SIZE,
            });
        }
        let mut body = [0u8; VF_TO_PF_BODY_LEN];
        body.copy_from_slice(&data[OFF_BODY..]);
        Ok(Self {
            src_vfid: data[OFF_SRC_VFID],
            need_resp: data[OFF_NEED_RESP] & MBX_NEED_RESP != 0,
            msg_len,
            match_id: u16::from_le_bytes([data[OFF_MATCH_ID], data[OFF_MATCH_ID + 1]]),
            code: data[OFF_CODE],
            body,
        })
    }

    pub fn decode_desc(desc: &CmdDesc) -> Result<Self, DecodeError> {
        if desc.opcode != OPC_MBX_VF_TO_PF {
            return Err(DecodeError::UnexpectedOpcode {
                opcode: desc.opcode,
            });
        }
        Self::decode(&desc.data)
    }

    pub fn encode(&self) -> [u8; CMD_DESC_DATA_LEN] {
        let mut out = [0u8; CMD_DESC_DATA_LEN];
        out[OFF_SRC_VFID] = self.src_vfid;
        out[OFF_NEED_RESP] = if self.need_resp { MBX_NEED_RESP } else { 0 };
        out[OFF_MSG_LEN] = self.msg_len;
        out[OFF_MATCH_ID..OFF_MATCH_ID + 2].copy_from_slice(&self.match_id.to_le_bytes());
        out[OFF_CODE] = self.code;
        out[OFF_BODY..].copy_from_slice(&self.body);
        out
    }

    /// Wrap the request in a receive-queue descriptor as firmware would post it.
    pub fn to_desc(&self) -> CmdDesc {
        CmdDesc {
            opcode: OPC_MBX_VF_TO_PF,
            flag: CMDQ_RX_OUTVLD,
            retval: 0,
            rsv: 0,
            data: self.encode(),
        }
    }
}
