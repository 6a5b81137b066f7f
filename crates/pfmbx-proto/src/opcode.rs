//! Mailbox opcodes and their subcodes.

/// Mailbox message opcode (`msg.code`).
///
/// Direction is noted per variant. Opcodes `>= GetVfFlrStatus` are posted by the adapter's
/// management firmware rather than by a VF and are never answered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    /// VF → PF: request a function-level reset of the VF.
    Reset = 0x01,
    /// PF → VF: the PF is asserting a reset.
    AssertingReset = 0x02,
    /// VF → PF: modify/add/remove a unicast MAC address.
    SetUnicast = 0x03,
    /// VF → PF: add/remove a multicast MAC address.
    SetMulticast = 0x04,
    /// VF → PF: VLAN configuration.
    SetVlan = 0x05,
    MapRingToVector = 0x06,
    UnmapRingToVector = 0x07,
    SetPromiscMode = 0x08,
    SetMacVlan = 0x09,
    ApiNegotiate = 0x0a,
    GetQinfo = 0x0b,
    GetQdepth = 0x0c,
    GetBasicInfo = 0x0d,
    GetReta = 0x0e,
    GetRssKey = 0x0f,
    GetMacAddr = 0x10,
    /// PF → VF: synchronous response to a VF request.
    PfVfResp = 0x11,
    GetBdNum = 0x12,
    GetBufSize = 0x13,
    GetStreamId = 0x14,
    SetAeStart = 0x15,
    SetTsoStats = 0x16,
    /// PF → VF: link status changed.
    LinkStatChange = 0x17,
    GetBaseConfig = 0x18,
    BindFuncQueue = 0x19,
    GetLinkStatus = 0x1a,
    QueueReset = 0x1b,
    KeepAlive = 0x1c,
    SetAlive = 0x1d,
    SetMtu = 0x1e,
    GetQidInPf = 0x1f,
    /// PF → VF: link mode report.
    LinkStatMode = 0x20,
    GetLinkMode = 0x21,
    /// PF → VF: port based VLAN configuration.
    PushVlanInfo = 0x22,
    GetMediaType = 0x23,
    /// PF → VF: promiscuous mode state.
    PushPromiscInfo = 0x24,
    /// VF → PF: the VF driver is unloading.
    VfUninit = 0x25,
    /// VF → PF: store/clear hardware tables.
    HandleVfTbl = 0x26,
    GetRingVectorMap = 0x27,

    /// Firmware → PF: FLR status of a VF.
    GetVfFlrStatus = 200,
    /// Firmware → PF: port link status changed.
    PushLinkStatus = 201,
    /// Firmware → PF: NCSI error.
    NcsiError = 202,
}

impl Opcode {
    pub const ALL: [Opcode; 42] = [
        Opcode::Reset,
        Opcode::AssertingReset,
        Opcode::SetUnicast,
        Opcode::SetMulticast,
        Opcode::SetVlan,
        Opcode::MapRingToVector,
        Opcode::UnmapRingToVector,
        Opcode::SetPromiscMode,
        Opcode::SetMacVlan,
        Opcode::ApiNegotiate,
        Opcode::GetQinfo,
        Opcode::GetQdepth,
        Opcode::GetBasicInfo,
        Opcode::GetReta,
        Opcode::GetRssKey,
        Opcode::GetMacAddr,
        Opcode::PfVfResp,
        Opcode::GetBdNum,
        Opcode::GetBufSize,
        Opcode::GetStreamId,
        Opcode::SetAeStart,
        Opcode::SetTsoStats,
        Opcode::LinkStatChange,
        Opcode::GetBaseConfig,
        Opcode::BindFuncQueue,
        Opcode::GetLinkStatus,
        Opcode::QueueReset,
        Opcode::KeepAlive,
        Opcode::SetAlive,
        Opcode::SetMtu,
        Opcode::GetQidInPf,
        Opcode::LinkStatMode,
        Opcode::GetLinkMode,
        Opcode::PushVlanInfo,
        Opcode::GetMediaType,
        Opcode::PushPromiscInfo,
        Opcode::VfUninit,
        Opcode::HandleVfTbl,
        Opcode::GetRingVectorMap,
        Opcode::GetVfFlrStatus,
        Opcode::PushLinkStatus,
        Opcode::NcsiError,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| *op as u8 == value)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Firmware-originated notifications. The PF must never reply to these, whatever the
    /// request's need-response bit says.
    pub fn is_pf_internal(self) -> bool {
        self >= Opcode::GetVfFlrStatus
    }
}

/// Subcodes of [`Opcode::SetUnicast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicastSubcode {
    Modify,
    Add,
    Remove,
}

impl UnicastSubcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => UnicastSubcode::Modify,
            1 => UnicastSubcode::Add,
            2 => UnicastSubcode::Remove,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            UnicastSubcode::Modify => 0,
            UnicastSubcode::Add => 1,
            UnicastSubcode::Remove => 2,
        }
    }
}

/// Subcodes of [`Opcode::SetMulticast`]. They share the MAC/VLAN subcode space with
/// [`UnicastSubcode`], so the values start at 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulticastSubcode {
    Add,
    Remove,
}

impl MulticastSubcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            4 => MulticastSubcode::Add,
            5 => MulticastSubcode::Remove,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            MulticastSubcode::Add => 4,
            MulticastSubcode::Remove => 5,
        }
    }
}

/// Subcodes of [`Opcode::SetVlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlanSubcode {
    Filter,
    TxOffCfg,
    RxOffCfg,
    PortBaseVlanCfg,
    GetPortBaseVlanState,
    EnableVlanFilter,
}

impl VlanSubcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => VlanSubcode::Filter,
            1 => VlanSubcode::TxOffCfg,
            2 => VlanSubcode::RxOffCfg,
            3 => VlanSubcode::PortBaseVlanCfg,
            4 => VlanSubcode::GetPortBaseVlanState,
            5 => VlanSubcode::EnableVlanFilter,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            VlanSubcode::Filter => 0,
            VlanSubcode::TxOffCfg => 1,
            VlanSubcode::RxOffCfg => 2,
            VlanSubcode::PortBaseVlanCfg => 3,
            VlanSubcode::GetPortBaseVlanState => 4,
            VlanSubcode::EnableVlanFilter => 5,
        }
    }
}

/// Subcodes of [`Opcode::HandleVfTbl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSubcode {
    VportListClear,
}

impl TableSubcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TableSubcode::VportListClear),
            _ => None,
        }
    }
}

/// Link failure reason carried by [`Opcode::PushLinkStatus`] when its subcode is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFailCode {
    Normal,
    RefClockLost,
    XsfpTxDisable,
    XsfpAbsent,
}

impl LinkFailCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => LinkFailCode::Normal,
            1 => LinkFailCode::RefClockLost,
            2 => LinkFailCode::XsfpTxDisable,
            3 => LinkFailCode::XsfpAbsent,
            _ => return None,
        })
    }
}
