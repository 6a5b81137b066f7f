//! PF→VF messages: synchronous responses and PF-initiated notifications.
//!
//! Layout of the descriptor data area:
//!
//! | offset | field                                             |
//! |--------|---------------------------------------------------|
//! | 0      | `dest_vfid`                                       |
//! | 1..4   | reserved                                          |
//! | 4      | `msg_len`                                         |
//! | 5      | reserved                                          |
//! | 6..8   | `match_id` (u16)                                  |
//! | 8..10  | `msg.code` (u16)                                  |
//! | 10..24 | response arm or message arm (see [`PfToVfBody`])  |
//!
//! Response arm: `vf_code:u16 | vf_subcode:u16 | resp_status:u16 | resp_data[8]`.
//! Message arm: `msg_data[14]`. Both arms fill the data area exactly; reserved bytes are sent
//! as zero and ignored on decode.

use thiserror::Error;

use crate::desc::{CmdDesc, DecodeError, CMD_DESC_DATA_LEN, OPC_MBX_PF_TO_VF};
use crate::errno;
use crate::opcode::Opcode;
use crate::request::VfToPfRequest;
use crate::{MBX_MAX_MSG_SIZE, MBX_MAX_RESP_DATA_SIZE, RESP_STATUS_SENTINEL};

const OFF_DEST_VFID: usize = 0;
const OFF_MSG_LEN: usize = 4;
const OFF_MATCH_ID: usize = 6;
const OFF_CODE: usize = 8;
const OFF_VF_CODE: usize = 10;
const OFF_VF_SUBCODE: usize = 12;
const OFF_RESP_STATUS: usize = 14;
const OFF_RESP_DATA: usize = 16;
const OFF_MSG_DATA: usize = 10;

const _: () = assert!(OFF_RESP_DATA + MBX_MAX_RESP_DATA_SIZE == CMD_DESC_DATA_LEN);
const _: () = assert!(OFF_MSG_DATA + MBX_MAX_MSG_SIZE == CMD_DESC_DATA_LEN);

/// Response buffer a handler fills while processing one request.
///
/// The buffer accepts more than [`MBX_MAX_RESP_DATA_SIZE`] bytes; the emitter clamps the length
/// when the response is put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RespMsg {
    data: Vec<u8>,
}

impl RespMsg {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MBX_MAX_RESP_DATA_SIZE),
        }
    }

    /// Drop any payload left over from the previous request.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn put(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn put_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Payload as it will be sent: at most [`MBX_MAX_RESP_DATA_SIZE`] bytes.
    pub fn wire_payload(&self) -> &[u8] {
        &self.data[..self.data.len().min(MBX_MAX_RESP_DATA_SIZE)]
    }

    pub fn is_oversized(&self) -> bool {
        self.data.len() > MBX_MAX_RESP_DATA_SIZE
    }
}

/// Result of encoding a handler status for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespStatus {
    /// `abs(errno)` fits below [`RESP_STATUS_SENTINEL`].
    Encoded(u16),
    /// `abs(errno)` hit the reserved range; the wire carries `EIO` instead.
    OutOfBound(u32),
}

impl RespStatus {
    pub fn wire(self) -> u16 {
        match self {
            RespStatus::Encoded(value) => value,
            RespStatus::OutOfBound(_) => errno::EIO as u16,
        }
    }
}

/// Encode a handler status (0 or a negative errno) as the u16 response status.
pub fn encode_resp_status(status: i32) -> RespStatus {
    let resp = status.unsigned_abs();
    if resp < u32::from(RESP_STATUS_SENTINEL) {
        RespStatus::Encoded(resp as u16)
    } else {
        RespStatus::OutOfBound(resp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mailbox message payload of {len} bytes exceeds maximum {max}")]
pub struct MessageTooLong {
    pub len: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PfToVfBody {
    Response {
        vf_code: u16,
        vf_subcode: u16,
        resp_status: u16,
        resp_data: [u8; MBX_MAX_RESP_DATA_SIZE],
    },
    Message {
        data: [u8; MBX_MAX_MSG_SIZE],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PfToVfCmd {
    pub dest_vfid: u8,
    pub msg_len: u8,
    pub match_id: u16,
    pub code: u16,
    pub body: PfToVfBody,
}

impl PfToVfCmd {
    /// Synchronous response to `req`, echoing its code, subcode, match id and length.
    ///
    /// `payload` is clamped to [`MBX_MAX_RESP_DATA_SIZE`]; callers that care about the clamp check
    /// [`RespMsg::is_oversized`] first.
    pub fn response(req: &VfToPfRequest, status: RespStatus, payload: &[u8]) -> Self {
        let mut resp_data = [0u8; MBX_MAX_RESP_DATA_SIZE];
        let len = payload.len().min(MBX_MAX_RESP_DATA_SIZE);
        resp_data[..len].copy_from_slice(&payload[..len]);
        Self {
            dest_vfid: req.src_vfid,
            msg_len: req.msg_len,
            match_id: req.match_id,
            code: u16::from(Opcode::PfVfResp.as_u8()),
            body: PfToVfBody::Response {
                vf_code: u16::from(req.code),
                vf_subcode: u16::from(req.subcode()),
                resp_status: status.wire(),
                resp_data,
            },
        }
    }

    /// PF-initiated message carrying `payload` verbatim.
    pub fn message(dest_vfid: u8, code: Opcode, payload: &[u8]) -> Result<Self, MessageTooLong> {
        if payload.len() > MBX_MAX_MSG_SIZE {
            return Err(MessageTooLong {
                len: payload.len(),
                max: MBX_MAX_MSG_SIZE,
            });
        }
        let mut data = [0u8; MBX_MAX_MSG_SIZE];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            dest_vfid,
            msg_len: payload.len() as u8,
            match_id: 0,
            code: u16::from(code.as_u8()),
            body: PfToVfBody::Message { data },
        })
    }

    pub fn opcode(&self) -> Option<Opcode> {
        u8::try_from(self.code).ok().and_then(Opcode::from_u8)
    }

    /// Response status, or `None` for a PF-initiated message.
    pub fn resp_status(&self) -> Option<u16> {
        match self.body {
            PfToVfBody::Response { resp_status, .. } => Some(resp_status),
            PfToVfBody::Message { .. } => None,
        }
    }

    /// Message payload trimmed to `msg_len`, or `None` for a response.
    pub fn msg_data(&self) -> Option<&[u8]> {
        match &self.body {
            PfToVfBody::Message { data } => {
                Some(&data[..usize::from(self.msg_len).min(MBX_MAX_MSG_SIZE)])
            }
            PfToVfBody::Response { .. } => None,
        }
    }

    pub fn encode(&self) -> [u8; CMD_DESC_DATA_LEN] {
        let mut out = [0u8; CMD_DESC_DATA_LEN];
        out[OFF_DEST_VFID] = self.dest_vfid;
        out[OFF_MSG_LEN] = self.msg_len;
        put_u16(&mut out, OFF_MATCH_ID, self.match_id);
        put_u16(&mut out, OFF_CODE, self.code);
        match &self.body {
            PfToVfBody::Response {
                vf_code,
                vf_subcode,
                resp_status,
                resp_data,
            } => {
                put_u16(&mut out, OFF_VF_CODE, *vf_code);
                put_u16(&mut out, OFF_VF_SUBCODE, *vf_subcode);
                put_u16(&mut out, OFF_RESP_STATUS, *resp_status);
                out[OFF_RESP_DATA..OFF_RESP_DATA + MBX_MAX_RESP_DATA_SIZE]
                    .copy_from_slice(resp_data);
            }
            PfToVfBody::Message { data } => {
                out[OFF_MSG_DATA..OFF_MSG_DATA + MBX_MAX_MSG_SIZE].copy_from_slice(data);
            }
        }
        out
    }

    /// Decode a PF→VF data area. The arm is selected by `msg.code`.
    pub fn decode(data: &[u8; CMD_DESC_DATA_LEN]) -> Self {
        let code = get_u16(data, OFF_CODE);
        let body = if code == u16::from(Opcode::PfVfResp.as_u8()) {
            let mut resp_data = [0u8; MBX_MAX_RESP_DATA_SIZE];
            resp_data.copy_from_slice(&data[OFF_RESP_DATA..OFF_RESP_DATA + MBX_MAX_RESP_DATA_SIZE]);
            PfToVfBody::Response {
                vf_code: get_u16(data, OFF_VF_CODE),
                vf_subcode: get_u16(data, OFF_VF_SUBCODE),
                resp_status: get_u16(data, OFF_RESP_STATUS),
                resp_data,
            }
        } else {
            let mut msg = [0u8; MBX_MAX_MSG_SIZE];
            msg.copy_from_slice(&data[OFF_MSG_DATA..OFF_MSG_DATA + MBX_MAX_MSG_SIZE]);
            PfToVfBody::Message { data: msg }
        };
        Self {
            dest_vfid: data[OFF_DEST_VFID],
            msg_len: data[OFF_MSG_LEN],
            match_id: get_u16(data, OFF_MATCH_ID),
            code,
            body,
        }
    }

    pub fn decode_desc(desc: &CmdDesc) -> Result<Self, DecodeError> {
        if desc.opcode != OPC_MBX_PF_TO_VF {
            return Err(DecodeError::UnexpectedOpcode {
                opcode: desc.opcode,
            });
        }
        Ok(Self::decode(&desc.data))
    }

    /// Descriptor ready for submission on the command send queue.
    pub fn to_desc(&self) -> CmdDesc {
        let mut desc = CmdDesc::new(OPC_MBX_PF_TO_VF, false);
        desc.data = self.encode();
        desc
    }
}

fn put_u16(out: &mut [u8; CMD_DESC_DATA_LEN], offset: usize, value: u16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn get_u16(data: &[u8; CMD_DESC_DATA_LEN], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}
