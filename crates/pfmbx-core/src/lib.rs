//! PF-side engine of the PF/VF mailbox.
//!
//! VFs cannot touch adapter registers, so they ask the PF through fixed-size mailbox messages
//! delivered on the command receive queue. [`PfMailbox`] drains that queue, validates each
//! message, dispatches it to the handler for its opcode and, when asked to, answers with a
//! synchronous response. The transport and the device-wide configuration are collaborators
//! behind the [`CommandQueue`] and [`DeviceOps`] traits.
#![forbid(unsafe_code)]

pub mod caps;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod mac_table;
pub mod pump;
pub mod respond;
pub mod ring_chain;
pub mod vport;

pub use caps::{DeviceCaps, HwGeneration};
pub use config::{ConfigError, MailboxConfig};
pub use device::{CommandQueue, DeviceOps, DeviceState};
pub use error::{MbxError, SendError};
pub use handlers::{HandlerFn, MbxContext};
pub use mac_table::{MacAddr, MacAddrType, MacNode, MacNodeState, MacTable, MacUpdate, RemovalMode};
pub use pump::{PfMailbox, PumpStats};
pub use ring_chain::{RingChain, RingChainNode, RingType};
pub use vport::{LinkState, PortBaseVlanCfg, PrivFlags, VfInfo, Vport, VportState};
