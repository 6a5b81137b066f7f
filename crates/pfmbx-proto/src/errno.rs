//! Standard error numbers carried in mailbox response statuses.
//!
//! The VF driver interprets `resp_status` as the absolute value of a Linux errno, so these values
//! are part of the wire contract.

pub const EPERM: i32 = 1;
pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const ENOMEM: i32 = 12;
pub const EBUSY: i32 = 16;
pub const EINVAL: i32 = 22;
pub const EMSGSIZE: i32 = 90;
pub const ETIMEDOUT: i32 = 110;
