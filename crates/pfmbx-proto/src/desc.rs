//! Fixed-size command descriptors shared by the command send queue and the mailbox receive queue.

use thiserror::Error;

use crate::errno;

/// Size of the descriptor data area in bytes.
pub const CMD_DESC_DATA_LEN: usize = 24;

/// Size of a full descriptor (8-byte header + data) in bytes.
pub const CMD_DESC_LEN: usize = 8 + CMD_DESC_DATA_LEN;

/// Descriptor opcode of a VF→PF mailbox message delivered on the receive queue.
pub const OPC_MBX_VF_TO_PF: u16 = 0x2000;
/// Descriptor opcode of a PF→VF mailbox message.
pub const OPC_MBX_PF_TO_VF: u16 = 0x2001;
/// Descriptor opcode used to query (read) the ring-to-vector binding of a queue.
pub const OPC_ADD_RING_TO_VECTOR: u16 = 0x1503;

pub const CMD_FLAG_IN: u16 = 1 << 0;
pub const CMD_FLAG_OUT: u16 = 1 << 1;
pub const CMD_FLAG_NEXT: u16 = 1 << 2;
pub const CMD_FLAG_WR: u16 = 1 << 3;
pub const CMD_FLAG_NO_INTR: u16 = 1 << 4;

/// Set by firmware on receive-queue descriptors that carry a valid message.
pub const CMDQ_RX_OUTVLD: u16 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("descriptor truncated: {len} bytes, expected {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("mailbox message length {len} exceeds maximum {max}")]
    LengthExceeded { len: usize, max: usize },

    #[error("unexpected descriptor opcode {opcode:#06x}")]
    UnexpectedOpcode { opcode: u16 },
}

/// Completion status of a descriptor submitted to the command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CmdStatus {
    #[error("command queue timed out waiting for firmware")]
    Timeout,

    #[error("command queue is disabled")]
    Disabled,

    #[error("command queue is full")]
    QueueFull,

    #[error("firmware rejected the command (retval {0})")]
    Rejected(u16),
}

impl CmdStatus {
    /// Negative errno equivalent, as reported to callers that speak errno.
    pub fn errno(self) -> i32 {
        match self {
            CmdStatus::Timeout => -errno::ETIMEDOUT,
            CmdStatus::Disabled | CmdStatus::QueueFull => -errno::EBUSY,
            CmdStatus::Rejected(_) => -errno::EIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CmdDesc {
    pub opcode: u16,
    pub flag: u16,
    pub retval: u16,
    pub rsv: u16,
    pub data: [u8; CMD_DESC_DATA_LEN],
}

impl CmdDesc {
    /// A zeroed descriptor for `opcode`, flagged for synchronous submission.
    pub fn new(opcode: u16, is_read: bool) -> Self {
        let mut flag = CMD_FLAG_NO_INTR | CMD_FLAG_IN;
        if is_read {
            flag |= CMD_FLAG_WR;
        }
        Self {
            opcode,
            flag,
            ..Self::default()
        }
    }

    pub fn is_out_valid(&self) -> bool {
        self.flag & CMDQ_RX_OUTVLD != 0
    }

    pub fn to_bytes(&self) -> [u8; CMD_DESC_LEN] {
        let mut out = [0u8; CMD_DESC_LEN];
        out[0..2].copy_from_slice(&self.opcode.to_le_bytes());
        out[2..4].copy_from_slice(&self.flag.to_le_bytes());
        out[4..6].copy_from_slice(&self.retval.to_le_bytes());
        out[6..8].copy_from_slice(&self.rsv.to_le_bytes());
        out[8..].copy_from_slice(&self.data);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < CMD_DESC_LEN {
            return Err(DecodeError::Truncated {
                len: bytes.len(),
                expected: CMD_DESC_LEN,
            });
        }
        let mut data = [0u8; CMD_DESC_DATA_LEN];
        data.copy_from_slice(&bytes[8..CMD_DESC_LEN]);
        Ok(Self {
            opcode: u16::from_le_bytes([bytes[0], bytes[1]]),
            flag: u16::from_le_bytes([bytes[2], bytes[3]]),
            retval: u16::from_le_bytes([bytes[4], bytes[5]]),
            rsv: u16::from_le_bytes([bytes[6], bytes[7]]),
            data,
        })
    }

    pub(crate) fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    pub(crate) fn write_u16(&mut self, offset: usize, value: u16) {
        self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }
}

/// Ring-to-vector query descriptor layout (`OPC_ADD_RING_TO_VECTOR`, read direction).
///
/// `int_vector_id_l | int_cause_num | tqp_type_and_id[10] (u16) | vfid | int_vector_id_h`
pub mod vector_chain {
    use super::CmdDesc;

    pub const INT_VECTOR_ID_L: usize = 0;
    pub const INT_CAUSE_NUM: usize = 1;
    pub const TQP_TYPE_AND_ID: usize = 2;
    pub const VFID: usize = 22;
    pub const INT_VECTOR_ID_H: usize = 23;

    pub const INT_TYPE_SHIFT: u16 = 0;
    pub const INT_TYPE_MASK: u16 = 0x3;
    pub const TQP_ID_SHIFT: u16 = 2;
    pub const TQP_ID_MASK: u16 = 0x7ff << TQP_ID_SHIFT;
    pub const INT_GL_IDX_SHIFT: u16 = 13;
    pub const INT_GL_IDX_MASK: u16 = 0x7 << INT_GL_IDX_SHIFT;

    /// Build a query for the vector bound to one ring of `vfid`.
    pub fn query(ring_type: u8, tqp_id: u16, vfid: u8) -> CmdDesc {
        let mut desc = CmdDesc::new(super::OPC_ADD_RING_TO_VECTOR, true);
        let mut type_and_id = (u16::from(ring_type) << INT_TYPE_SHIFT) & INT_TYPE_MASK;
        type_and_id |= (tqp_id << TQP_ID_SHIFT) & TQP_ID_MASK;
        desc.write_u16(TQP_TYPE_AND_ID, type_and_id);
        desc.data[VFID] = vfid;
        desc
    }

    /// Interrupt-coalesce index reported for the first ring of a completed query.
    pub fn int_gl_index(desc: &CmdDesc) -> u8 {
        ((desc.read_u16(TQP_TYPE_AND_ID) & INT_GL_IDX_MASK) >> INT_GL_IDX_SHIFT) as u8
    }

    /// Low byte of the bound vector id.
    pub fn vector_id_l(desc: &CmdDesc) -> u8 {
        desc.data[INT_VECTOR_ID_L]
    }

    /// Store a completion for `query` (used by firmware models and tests).
    pub fn complete(desc: &mut CmdDesc, vector_id: u16, int_gl_index: u8) {
        desc.data[INT_VECTOR_ID_L] = vector_id as u8;
        desc.data[INT_VECTOR_ID_H] = (vector_id >> 8) as u8;
        let mut type_and_id = desc.read_u16(TQP_TYPE_AND_ID) & !INT_GL_IDX_MASK;
        type_and_id |= (u16::from(int_gl_index) << INT_GL_IDX_SHIFT) & INT_GL_IDX_MASK;
        desc.write_u16(TQP_TYPE_AND_ID, type_and_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_bytes_are_little_endian() {
        let mut desc = CmdDesc::new(OPC_MBX_PF_TO_VF, false);
        desc.retval = 0x0102;
        desc.data[0] = 0xaa;
        desc.data[23] = 0xbb;

        let bytes = desc.to_bytes();
        assert_eq!(&bytes[0..2], &[0x01, 0x20]);
        assert_eq!(&bytes[2..4], &(CMD_FLAG_NO_INTR | CMD_FLAG_IN).to_le_bytes());
        assert_eq!(&bytes[4..6], &[0x02, 0x01]);
        assert_eq!(bytes[8], 0xaa);
        assert_eq!(bytes[31], 0xbb);
        assert_eq!(CmdDesc::from_bytes(&bytes), Ok(desc));
    }

    #[test]
    fn read_descriptors_carry_the_wr_flag() {
        let desc = CmdDesc::new(OPC_ADD_RING_TO_VECTOR, true);
        assert_ne!(desc.flag & CMD_FLAG_WR, 0);
        assert!(!desc.is_out_valid());
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert_eq!(
            CmdDesc::from_bytes(&[0u8; 10]),
            Err(DecodeError::Truncated {
                len: 10,
                expected: CMD_DESC_LEN
            })
        );
    }

    #[test]
    fn vector_chain_query_packs_type_and_queue_id() {
        let mut desc = vector_chain::query(1, 0x155, 3);
        assert_eq!(desc.read_u16(vector_chain::TQP_TYPE_AND_ID), 1 | (0x155 << 2));
        assert_eq!(desc.data[vector_chain::VFID], 3);

        vector_chain::complete(&mut desc, 0x0142, 2);
        assert_eq!(vector_chain::int_gl_index(&desc), 2);
        assert_eq!(vector_chain::vector_id_l(&desc), 0x42);
        assert_eq!(desc.data[vector_chain::INT_VECTOR_ID_H], 0x01);
        // Completion must not disturb the queue id bits.
        assert_eq!(
            desc.read_u16(vector_chain::TQP_TYPE_AND_ID) & vector_chain::TQP_ID_MASK,
            0x155 << 2
        );
    }

    #[test]
    fn cmd_status_maps_to_negative_errno() {
        assert_eq!(CmdStatus::Timeout.errno(), -errno::ETIMEDOUT);
        assert_eq!(CmdStatus::Rejected(7).errno(), -errno::EIO);
        assert_eq!(CmdStatus::Disabled.errno(), -errno::EBUSY);
    }
}
