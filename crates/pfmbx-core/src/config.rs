//! Engine configuration.
//!
//! Loaded from JSON ([`MailboxConfig::from_json`]) or from `PFMBX_*` environment variables
//! ([`MailboxConfig::from_env`]). Every field has a default, so an empty object or an empty
//! environment yields a usable PF-only configuration.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::caps::HwGeneration;

pub const DEFAULT_MBX_SCHED_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_RX_BUF_LEN: u16 = 2048;
pub const DEFAULT_DESC_NUM: u16 = 1024;

/// Highest VF count addressable by the 8-bit `mbx_src_vfid` (vport 0 is the PF).
pub const MAX_REQ_VFS: u16 = u8::MAX as u16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailboxConfig {
    /// Number of enabled VFs. Messages claiming a higher source id are dropped.
    pub num_req_vfs: u16,
    /// Grace period after the mailbox task was scheduled before a response counts as late.
    pub mbx_sched_timeout_ms: u64,
    pub hw_generation: HwGeneration,
    pub rx_buf_len: u16,
    pub num_tx_desc: u16,
    pub num_rx_desc: u16,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            num_req_vfs: 0,
            mbx_sched_timeout_ms: DEFAULT_MBX_SCHED_TIMEOUT_MS,
            hw_generation: HwGeneration::default(),
            rx_buf_len: DEFAULT_RX_BUF_LEN,
            num_tx_desc: DEFAULT_DESC_NUM,
            num_rx_desc: DEFAULT_DESC_NUM,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for env var {0}")]
    InvalidEnv(&'static str),

    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("num_req_vfs {0} exceeds the maximum of {max}", max = MAX_REQ_VFS)]
    TooManyVfs(u16),

    #[error("{expected} vports required (PF + {num_req_vfs} VFs), got {actual}")]
    MissingVports {
        expected: usize,
        actual: usize,
        num_req_vfs: u16,
    },
}

impl MailboxConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`MailboxConfig::from_env`], with an explicit variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "PFMBX_NUM_REQ_VFS")? {
            config.num_req_vfs = v;
        }
        if let Some(v) = parse_var(&lookup, "PFMBX_SCHED_TIMEOUT_MS")? {
            config.mbx_sched_timeout_ms = v;
        }
        if let Some(raw) = lookup("PFMBX_HW_GENERATION") {
            config.hw_generation = HwGeneration::parse(&raw)
                .ok_or(ConfigError::InvalidEnv("PFMBX_HW_GENERATION"))?;
        }
        if let Some(v) = parse_var(&lookup, "PFMBX_RX_BUF_LEN")? {
            config.rx_buf_len = v;
        }
        if let Some(v) = parse_var(&lookup, "PFMBX_NUM_TX_DESC")? {
            config.num_tx_desc = v;
        }
        if let Some(v) = parse_var(&lookup, "PFMBX_NUM_RX_DESC")? {
            config.num_rx_desc = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_req_vfs > MAX_REQ_VFS {
            return Err(ConfigError::TooManyVfs(self.num_req_vfs));
        }
        if self.mbx_sched_timeout_ms == 0 {
            return Err(ConfigError::Zero("mbx_sched_timeout_ms"));
        }
        if self.rx_buf_len == 0 {
            return Err(ConfigError::Zero("rx_buf_len"));
        }
        if self.num_tx_desc == 0 {
            return Err(ConfigError::Zero("num_tx_desc"));
        }
        if self.num_rx_desc == 0 {
            return Err(ConfigError::Zero("num_rx_desc"));
        }
        Ok(())
    }

    pub fn sched_timeout(&self) -> Duration {
        Duration::from_millis(self.mbx_sched_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = MailboxConfig::from_json("{}").unwrap();
        assert_eq!(config, MailboxConfig::default());
        assert_eq!(config.sched_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn json_fields_override_defaults() {
        let config =
            MailboxConfig::from_json(r#"{"num_req_vfs": 8, "hw_generation": "v3"}"#).unwrap();
        assert_eq!(config.num_req_vfs, 8);
        assert_eq!(config.hw_generation, HwGeneration::V3);
        assert_eq!(config.rx_buf_len, DEFAULT_RX_BUF_LEN);
    }

    #[test]
    fn unknown_json_fields_are_rejected() {
        assert!(matches!(
            MailboxConfig::from_json(r#"{"num_vfs": 8}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn validation_rejects_zero_and_oversized_values() {
        assert!(matches!(
            MailboxConfig::from_json(r#"{"mbx_sched_timeout_ms": 0}"#),
            Err(ConfigError::Zero("mbx_sched_timeout_ms"))
        ));
        assert!(matches!(
            MailboxConfig::from_json(r#"{"num_req_vfs": 256}"#),
            Err(ConfigError::TooManyVfs(256))
        ));
    }

    #[test]
    fn env_vars_are_parsed() {
        let config = MailboxConfig::from_vars(vars(&[
            ("PFMBX_NUM_REQ_VFS", "4"),
            ("PFMBX_SCHED_TIMEOUT_MS", " 250 "),
            ("PFMBX_HW_GENERATION", "V3"),
        ]))
        .unwrap();
        assert_eq!(config.num_req_vfs, 4);
        assert_eq!(config.mbx_sched_timeout_ms, 250);
        assert_eq!(config.hw_generation, HwGeneration::V3);
    }

    #[test]
    fn malformed_env_var_names_the_variable() {
        let err = MailboxConfig::from_vars(vars(&[("PFMBX_NUM_RX_DESC", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv("PFMBX_NUM_RX_DESC")));
        assert_eq!(err.to_string(), "invalid value for env var PFMBX_NUM_RX_DESC");
    }
}
