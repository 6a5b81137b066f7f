//! Fixed payload layouts carried in response data and PF-initiated messages.
//!
//! All fields are little-endian and packed. `encode` produces the exact on-wire bytes; `decode`
//! is the VF-side view and is used by firmware models and tests.

use crate::desc::DecodeError;
use crate::{ETH_ALEN, MBX_MAX_MSG_SIZE};

/// `pf_caps` bit: the PF supports VLAN filter modification by the VF.
pub const PF_CAP_VLAN_FLTR_MDF: u32 = 1 << 0;

/// Response byte of a queue reset: the PF resets all of the VF's queues at once.
pub const QUEUE_RESET_ALL_DONE: u8 = 1;

/// `flag` value of a pushed link status.
pub const PUSH_LINK_STATUS_EN: u8 = 1 << 0;

/// `idx` value selecting the supported link-mode mask; any other value selects advertising.
pub const LINK_MODE_SUPPORTED: u16 = 1;

/// RSS hash key length held by the PF.
pub const RSS_KEY_SIZE: usize = 40;

/// Size of one RSS key slice returned per request.
pub const RSS_KEY_SLICE_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicInfo {
    pub hw_tc_map: u8,
    pub mbx_api_version: u16,
    pub pf_caps: u32,
}

impl BasicInfo {
    pub const LEN: usize = 8;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0] = self.hw_tc_map;
        out[2..4].copy_from_slice(&self.mbx_api_version.to_le_bytes());
        out[4..8].copy_from_slice(&self.pf_caps.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        let hw_tc_map = r.u8();
        r.skip(1);
        Ok(Self {
            hw_tc_map,
            mbx_api_version: r.u16(),
            pf_caps: r.u32(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueInfo {
    pub alloc_tqps: u16,
    pub rss_size: u16,
    pub rx_buf_len: u16,
}

impl QueueInfo {
    pub const LEN: usize = 6;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.alloc_tqps.to_le_bytes());
        out[2..4].copy_from_slice(&self.rss_size.to_le_bytes());
        out[4..6].copy_from_slice(&self.rx_buf_len.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            alloc_tqps: r.u16(),
            rss_size: r.u16(),
            rx_buf_len: r.u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueDepth {
    pub num_tx_desc: u16,
    pub num_rx_desc: u16,
}

impl QueueDepth {
    pub const LEN: usize = 4;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.num_tx_desc.to_le_bytes());
        out[2..4].copy_from_slice(&self.num_rx_desc.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            num_tx_desc: r.u16(),
            num_rx_desc: r.u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaType {
    pub media_type: u8,
    pub module_type: u8,
}

impl MediaType {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        [self.media_type, self.module_type]
    }
}

/// Reply to a ring-vector map query. `tqp_index` is echoed in the VF's own numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingVectorMapInfo {
    pub ring_type: u8,
    pub tqp_index: u8,
    pub int_gl_index: u8,
    pub vector_id: u8,
}

impl RingVectorMapInfo {
    pub const LEN: usize = 4;

    pub fn encode(&self) -> [u8; Self::LEN] {
        [
            self.ring_type,
            self.tqp_index,
            self.int_gl_index,
            self.vector_id,
        ]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            ring_type: r.u8(),
            tqp_index: r.u8(),
            int_gl_index: r.u8(),
            vector_id: r.u8(),
        })
    }
}

/// Reset kinds known to the adapter. The `Vf*` kinds are the ones a VF is told about.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetType {
    VfReset = 0,
    VfFunc = 1,
    VfPfFunc = 2,
    VfFull = 3,
    Flr = 4,
    Func = 5,
    Global = 6,
    Imp = 7,
    None = 8,
}

impl ResetType {
    /// The reset a VF observes while the PF performs `self`.
    pub fn vf_visible(self) -> ResetType {
        match self {
            ResetType::Func => ResetType::VfPfFunc,
            ResetType::Flr => ResetType::VfFull,
            _ => ResetType::VfFunc,
        }
    }

    pub fn encode(self) -> [u8; 2] {
        (self as u16).to_le_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStatus {
    pub link_status: u16,
    pub speed: u32,
    pub duplex: u16,
    pub flag: u8,
}

impl LinkStatus {
    pub const LEN: usize = 9;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.link_status.to_le_bytes());
        out[2..6].copy_from_slice(&self.speed.to_le_bytes());
        out[6..8].copy_from_slice(&self.duplex.to_le_bytes());
        out[8] = self.flag;
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            link_status: r.u16(),
            speed: r.u32(),
            duplex: r.u16(),
            flag: r.u8(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkMode {
    pub idx: u16,
    pub link_mode: u64,
}

impl LinkMode {
    pub const LEN: usize = 10;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.idx.to_le_bytes());
        out[2..10].copy_from_slice(&self.link_mode.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            idx: r.u16(),
            link_mode: r.u64(),
        })
    }
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortBaseVlanState {
    #[default]
    Disable = 0,
    Enable = 1,
    Modify = 2,
    NoChange = 3,
}

impl PortBaseVlanState {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortBaseVlan {
    pub state: u16,
    pub vlan_proto: u16,
    pub qos: u16,
    pub vlan_tag: u16,
}

impl PortBaseVlan {
    pub const LEN: usize = 8;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.state.to_le_bytes());
        out[2..4].copy_from_slice(&self.vlan_proto.to_le_bytes());
        out[4..6].copy_from_slice(&self.qos.to_le_bytes());
        out[6..8].copy_from_slice(&self.vlan_tag.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes, Self::LEN)?;
        Ok(Self {
            state: r.u16(),
            vlan_proto: r.u16(),
            qos: r.u16(),
            vlan_tag: r.u16(),
        })
    }
}

/// Unicast MAC request data: new address followed by the address it replaces.
pub fn unicast_addrs(data: &[u8; MBX_MAX_MSG_SIZE]) -> ([u8; ETH_ALEN], [u8; ETH_ALEN]) {
    let mut new = [0u8; ETH_ALEN];
    let mut old = [0u8; ETH_ALEN];
    new.copy_from_slice(&data[..ETH_ALEN]);
    old.copy_from_slice(&data[ETH_ALEN..2 * ETH_ALEN]);
    (new, old)
}

/// Little-endian cursor over a buffer whose minimum length was checked up front.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], expected: usize) -> Result<Self, DecodeError> {
        if bytes.len() < expected {
            return Err(DecodeError::Truncated {
                len: bytes.len(),
                expected,
            });
        }
        Ok(Self { bytes, pos: 0 })
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_info_fills_the_response_capacity() {
        let info = BasicInfo {
            hw_tc_map: 0x0f,
            mbx_api_version: 0,
            pf_caps: PF_CAP_VLAN_FLTR_MDF,
        };
        let bytes = info.encode();
        assert_eq!(bytes.len(), crate::MBX_MAX_RESP_DATA_SIZE);
        assert_eq!(bytes, [0x0f, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(BasicInfo::decode(&bytes), Ok(info));
    }

    #[test]
    fn queue_info_offsets() {
        let bytes = QueueInfo {
            alloc_tqps: 4,
            rss_size: 2,
            rx_buf_len: 2048,
        }
        .encode();
        assert_eq!(bytes, [4, 0, 2, 0, 0x00, 0x08]);
    }

    #[test]
    fn pushed_payloads_fit_in_one_message() {
        assert!(LinkStatus::LEN <= crate::MBX_MAX_MSG_SIZE);
        assert!(LinkMode::LEN <= crate::MBX_MAX_MSG_SIZE);
        assert!(PortBaseVlan::LEN <= crate::MBX_MAX_MSG_SIZE);
    }

    #[test]
    fn link_status_layout_is_packed() {
        let status = LinkStatus {
            link_status: 1,
            speed: 25_000,
            duplex: 1,
            flag: PUSH_LINK_STATUS_EN,
        };
        let bytes = status.encode();
        assert_eq!(bytes, [1, 0, 0xa8, 0x61, 0, 0, 1, 0, 1]);
        assert_eq!(LinkStatus::decode(&bytes), Ok(status));
    }

    #[test]
    fn vf_visible_reset_types() {
        assert_eq!(ResetType::Func.vf_visible(), ResetType::VfPfFunc);
        assert_eq!(ResetType::Flr.vf_visible(), ResetType::VfFull);
        assert_eq!(ResetType::Global.vf_visible(), ResetType::VfFunc);
        assert_eq!(ResetType::Imp.vf_visible().encode(), [1, 0]);
    }

    #[test]
    fn truncated_payloads_are_rejected() {
        assert_eq!(
            LinkMode::decode(&[0u8; 9]),
            Err(DecodeError::Truncated {
                len: 9,
                expected: LinkMode::LEN
            })
        );
    }

    #[test]
    fn unicast_addrs_split_new_and_old() {
        let mut data = [0u8; 12];
        data[..6].copy_from_slice(&[0x02, 0, 0, 0, 0, 1]);
        data[6..].copy_from_slice(&[0x02, 0, 0, 0, 0, 2]);
        let req = crate::VfToPfRequest::new(crate::Opcode::SetUnicast).with_data(&data);
        let (new, old) = unicast_addrs(req.data());
        assert_eq!(new, [0x02, 0, 0, 0, 0, 1]);
        assert_eq!(old, [0x02, 0, 0, 0, 0, 2]);

        // A request carrying only part of the addresses reads the rest as zero.
        let req = crate::VfToPfRequest::new(crate::Opcode::SetUnicast).with_data(&data[..8]);
        let (new, old) = unicast_addrs(req.data());
        assert_eq!(new[5], 1);
        assert_eq!(old, [0x02, 0, 0, 0, 0, 0]);
    }
}
