use pfmbx_proto::{errno, CmdStatus, MessageTooLong};
use thiserror::Error;

/// Failure of a mailbox handler. The VF sees it as `abs(errno())` in the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MbxError {
    #[error("invalid argument")]
    InvalidArgument,

    #[error("operation not permitted")]
    PermissionDenied,

    #[error("out of memory")]
    OutOfMemory,

    #[error("I/O error")]
    Io,

    #[error("no such entry")]
    NotFound,

    #[error(transparent)]
    MessageTooLong(#[from] MessageTooLong),

    /// Error reported by a device collaborator, as a negative errno. Passed through verbatim.
    #[error("device error {0}")]
    Device(i32),

    #[error("command queue: {0}")]
    Cmd(#[from] CmdStatus),
}

impl MbxError {
    /// Negative errno equivalent.
    pub fn errno(self) -> i32 {
        match self {
            MbxError::InvalidArgument => -errno::EINVAL,
            MbxError::PermissionDenied => -errno::EPERM,
            MbxError::OutOfMemory => -errno::ENOMEM,
            MbxError::Io => -errno::EIO,
            MbxError::NotFound => -errno::ENOENT,
            MbxError::MessageTooLong(_) => -errno::EMSGSIZE,
            MbxError::Device(code) => code,
            MbxError::Cmd(status) => status.errno(),
        }
    }
}

/// Failure of a PF-initiated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error(transparent)]
    TooLong(#[from] MessageTooLong),

    #[error("failed to send mailbox message: {0}")]
    Cmd(#[from] CmdStatus),

    #[error("no vport with id {0}")]
    UnknownVport(u16),
}

impl SendError {
    pub fn errno(self) -> i32 {
        MbxError::from(self).errno()
    }
}

impl From<SendError> for MbxError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::TooLong(err) => MbxError::MessageTooLong(err),
            SendError::Cmd(status) => MbxError::Cmd(status),
            SendError::UnknownVport(_) => MbxError::InvalidArgument,
        }
    }
}
