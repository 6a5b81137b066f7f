//! Ring-to-vector binding chains built from map/unmap/query requests.

use pfmbx_proto::{RingMapRequest, MBX_MAX_RING_CHAIN_PARAM_NUM};

use crate::error::MbxError;
use crate::vport::Vport;

/// Width of the interrupt-coalesce index field.
pub const RING_GL_IDX_MASK: u8 = 0x3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingType {
    Tx,
    Rx,
}

impl RingType {
    pub fn from_wire(value: u8) -> Self {
        if value & 1 != 0 {
            RingType::Rx
        } else {
            RingType::Tx
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            RingType::Tx => 0,
            RingType::Rx => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingChainNode {
    pub ring_type: RingType,
    /// Global queue id.
    pub tqp_index: u16,
    pub int_gl_idx: u8,
}

/// Queues bound to (or unbound from) one interrupt vector, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingChain(Vec<RingChainNode>);

impl RingChain {
    /// Validate `req` against `vport` and translate it into a chain.
    ///
    /// Either every entry is valid and the full chain is returned, or nothing is built.
    pub fn from_request(req: &RingMapRequest, vport: &Vport) -> Result<Self, MbxError> {
        let ring_num = usize::from(req.ring_num);
        if ring_num > MBX_MAX_RING_CHAIN_PARAM_NUM {
            tracing::error!(
                ring_num,
                max = MBX_MAX_RING_CHAIN_PARAM_NUM,
                "too many rings in ring chain request"
            );
            return Err(MbxError::InvalidArgument);
        }

        let params = &req.params[..ring_num];
        for param in params {
            if u16::from(param.tqp_index) >= vport.rss_size {
                tracing::error!(
                    tqp_index = param.tqp_index,
                    rss_size = vport.rss_size,
                    "tqp index is out of range"
                );
                return Err(MbxError::InvalidArgument);
            }
        }

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(ring_num)
            .map_err(|_| MbxError::OutOfMemory)?;
        for param in params {
            let tqp_index = vport
                .global_queue_id(u16::from(param.tqp_index))
                .ok_or(MbxError::InvalidArgument)?;
            nodes.push(RingChainNode {
                ring_type: RingType::from_wire(param.ring_type),
                tqp_index,
                int_gl_idx: param.int_gl_index & RING_GL_IDX_MASK,
            });
        }
        Ok(Self(nodes))
    }

    pub fn nodes(&self) -> &[RingChainNode] {
        &self.0
    }

    pub fn first(&self) -> Option<&RingChainNode> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RingChainNode> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RingChain {
    type Item = &'a RingChainNode;
    type IntoIter = std::slice::Iter<'a, RingChainNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
