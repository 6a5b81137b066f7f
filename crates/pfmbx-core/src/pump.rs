//! The PF mailbox request pump.
//!
//! [`PfMailbox::handle_mailbox`] drains the command receive queue in one pass:
//! 1. Abort (without touching the head register) if the command interface is disabled.
//! 2. Drop descriptors without the valid-output flag, from an unknown VF, or with a malformed
//!    envelope.
//! 3. Dispatch the request to its handler with a cleared response buffer.
//! 4. Reply if the VF asked for it and the opcode is not a firmware notification.
//! 5. Advance the cursor, whatever happened to the message.
//!
//! Finally the cursor is written to the receive-queue head register.

use std::time::Instant;

use pfmbx_proto::{PortBaseVlanState, RespMsg, VfToPfRequest};

use crate::config::{ConfigError, MailboxConfig};
use crate::device::{CommandQueue, DeviceOps, DeviceState};
use crate::dispatch::handler_for;
use crate::error::SendError;
use crate::handlers::MbxContext;
use crate::respond;
use crate::vport::{PortBaseVlanCfg, Vport};

/// Outcome of one [`PfMailbox::handle_mailbox`] pass.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpStats {
    /// Messages handed to dispatch.
    pub processed: usize,
    /// Messages dropped before dispatch.
    pub dropped: usize,
    /// Responses successfully submitted.
    pub responses: usize,
    /// Responses that failed to send.
    pub send_failures: usize,
    /// Messages with an opcode the PF does not serve.
    pub unsupported: usize,
    /// Responses sent after the scheduling grace period.
    pub late: usize,
    /// The pass stopped because the command interface was disabled.
    pub aborted: bool,
}

pub struct PfMailbox<Q, D> {
    queue: Q,
    device: D,
    dev: DeviceState,
    vports: Vec<Vport>,
    config: MailboxConfig,
    cmd_disabled: bool,
    last_mbx_scheduled: Instant,
    resp: RespMsg,
}

impl<Q: CommandQueue, D: DeviceOps> PfMailbox<Q, D> {
    /// `vports[0]` is the PF; `vports[n]` serves VF `n`, so at least `num_req_vfs + 1` vports are
    /// required.
    pub fn new(
        queue: Q,
        device: D,
        dev: DeviceState,
        vports: Vec<Vport>,
        config: MailboxConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let expected = usize::from(config.num_req_vfs) + 1;
        if vports.len() < expected {
            return Err(ConfigError::MissingVports {
                expected,
                actual: vports.len(),
                num_req_vfs: config.num_req_vfs,
            });
        }
        Ok(Self {
            queue,
            device,
            dev,
            vports,
            config,
            cmd_disabled: false,
            last_mbx_scheduled: Instant::now(),
            resp: RespMsg::new(),
        })
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn device_state(&self) -> &DeviceState {
        &self.dev
    }

    pub fn device_state_mut(&mut self) -> &mut DeviceState {
        &mut self.dev
    }

    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    pub fn vport(&self, vport_id: u16) -> Option<&Vport> {
        self.vports.get(usize::from(vport_id))
    }

    pub fn vport_mut(&mut self, vport_id: u16) -> Option<&mut Vport> {
        self.vports.get_mut(usize::from(vport_id))
    }

    /// Mark the command interface as needing re-initialization (or clear that mark).
    pub fn set_cmd_disabled(&mut self, disabled: bool) {
        self.cmd_disabled = disabled;
    }

    pub fn is_cmd_disabled(&self) -> bool {
        self.cmd_disabled
    }

    /// Record that the mailbox task was just scheduled.
    pub fn mark_mailbox_scheduled(&mut self) {
        self.mark_mailbox_scheduled_at(Instant::now());
    }

    pub fn mark_mailbox_scheduled_at(&mut self, at: Instant) {
        self.last_mbx_scheduled = at;
    }

    fn is_late(&self, now: Instant) -> bool {
        match self.last_mbx_scheduled.checked_add(self.config.sched_timeout()) {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

    /// Drain the receive queue.
    pub fn handle_mailbox(&mut self) -> PumpStats {
        let mut stats = PumpStats::default();

        while !self.queue.crq_empty() {
            if self.cmd_disabled {
                tracing::warn!("command queue needs re-initializing");
                stats.aborted = true;
                return stats;
            }

            let desc = self.queue.crq_current();
            let src_vfid = desc.data[1];
            let code = desc.data[8];
            if !desc.is_out_valid() || u16::from(src_vfid) > self.config.num_req_vfs {
                tracing::warn!(code, vfid = src_vfid, "dropped invalid mailbox message");
                stats.dropped += 1;
                self.queue.crq_advance();
                continue;
            }

            let req = match VfToPfRequest::decode(&desc.data) {
                Ok(req) => req,
                Err(err) => {
                    tracing::warn!(
                        %err,
                        code,
                        vfid = src_vfid,
                        "dropped malformed mailbox message"
                    );
                    stats.dropped += 1;
                    self.queue.crq_advance();
                    continue;
                }
            };

            tracing::debug!(
                vfid = req.src_vfid,
                code = req.code,
                subcode = req.subcode(),
                match_id = req.match_id,
                "received mailbox message"
            );

            self.resp.reset();
            stats.processed += 1;
            self.request_handling(&req, &mut stats);

            self.queue.crq_advance();
        }

        // Firmware needs the head pointer to reuse the consumed descriptors.
        let cursor = self.queue.crq_cursor();
        self.queue.write_crq_head(cursor);
        stats
    }

    fn request_handling(&mut self, req: &VfToPfRequest, stats: &mut PumpStats) {
        let Some((opcode, handler)) = req
            .opcode()
            .and_then(|op| handler_for::<Q, D>(op).map(|handler| (op, handler)))
        else {
            tracing::error!(code = req.code, "unsupported mailbox message");
            stats.unsupported += 1;
            return;
        };

        let Some(vport) = self.vports.get_mut(usize::from(req.src_vfid)) else {
            tracing::warn!(vfid = req.src_vfid, "no vport for mailbox message");
            return;
        };

        let mut ctx = MbxContext {
            vport,
            req,
            resp: &mut self.resp,
            queue: &mut self.queue,
            device: &mut self.device,
            dev: &self.dev,
        };
        let result = handler(&mut ctx);
        if let Err(err) = &result {
            tracing::error!(
                vfid = req.src_vfid,
                ?opcode,
                subcode = req.subcode(),
                errno = err.errno(),
                "PF failed to handle mailbox request: {err}"
            );
        }

        // Firmware notifications are never answered.
        if !req.need_resp || opcode.is_pf_internal() {
            return;
        }

        if self.is_late(Instant::now()) {
            tracing::warn!(
                vfid = req.src_vfid,
                code = req.code,
                subcode = req.subcode(),
                "mailbox response is late"
            );
            stats.late += 1;
        }

        let status = result.map_or_else(|err| err.errno(), |()| 0);
        match respond::gen_resp_to_vf(&mut self.queue, req, status, &self.resp) {
            Ok(()) => stats.responses += 1,
            Err(_) => stats.send_failures += 1,
        }
    }

    /// Notify VF `vport_id` that the PF is resetting.
    pub fn inform_reset_assert(&mut self, vport_id: u16) -> Result<(), SendError> {
        let vport = self
            .vports
            .get(usize::from(vport_id))
            .ok_or(SendError::UnknownVport(vport_id))?;
        respond::inform_reset_assert(&mut self.queue, vport, &self.dev)
    }

    pub fn push_link_status(&mut self, vport_id: u16) -> Result<(), SendError> {
        let vport = self
            .vports
            .get(usize::from(vport_id))
            .ok_or(SendError::UnknownVport(vport_id))?;
        respond::push_link_status(&mut self.queue, vport, &self.dev)
    }

    /// Store `vlan` as the vport's port based VLAN configuration and push it to the VF.
    /// `state` is the transition reported to the VF.
    pub fn push_port_base_vlan_info(
        &mut self,
        vport_id: u16,
        state: PortBaseVlanState,
        vlan: PortBaseVlanCfg,
    ) -> Result<(), SendError> {
        let vport = self
            .vports
            .get_mut(usize::from(vport_id))
            .ok_or(SendError::UnknownVport(vport_id))?;
        vport.port_base_vlan = vlan;
        let vfid = u8::try_from(vport_id).map_err(|_| SendError::UnknownVport(vport_id))?;
        respond::push_port_base_vlan_info(&mut self.queue, vfid, state, &vlan)
    }

    pub fn into_parts(self) -> (Q, D) {
        (self.queue, self.device)
    }
}
