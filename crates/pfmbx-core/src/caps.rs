//! Hardware generations and the capability policy derived from them.

use bitflags::bitflags;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HwGeneration {
    #[default]
    V2,
    V3,
}

impl HwGeneration {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v2" => Some(HwGeneration::V2),
            "v3" => Some(HwGeneration::V3),
            _ => None,
        }
    }

    pub fn caps(self) -> DeviceCaps {
        GENERATION_CAPS
            .iter()
            .find(|(generation, _)| *generation == self)
            .map(|(_, caps)| *caps)
            .unwrap_or(DeviceCaps::empty())
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct DeviceCaps: u32 {
        /// VFs may modify their VLAN filter configuration.
        const VLAN_FLTR_MDF = 1 << 0;
        /// Port based VLAN state is managed by the PF and reported to VFs as disabled.
        const HIDE_PORT_VLAN_STATE = 1 << 1;
    }
}

const GENERATION_CAPS: &[(HwGeneration, DeviceCaps)] = &[
    (HwGeneration::V2, DeviceCaps::empty()),
    (
        HwGeneration::V3,
        DeviceCaps::VLAN_FLTR_MDF.union(DeviceCaps::HIDE_PORT_VLAN_STATE),
    ),
];
