//! PF/VF mailbox protocol engine.
//!
//! The wire format lives in [`proto`]; the request pump, handlers and response emitter are
//! re-exported from `pfmbx-core`.
#![forbid(unsafe_code)]

pub use pfmbx_core::*;
pub use pfmbx_proto as proto;
