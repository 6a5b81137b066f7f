//! Shared helpers for `pfmbx-core` integration tests: an in-memory command queue, a device that
//! records every call, and a ready-made mailbox fixture.
#![allow(dead_code)]

use std::collections::HashMap;

use pfmbx_core::{
    CommandQueue, DeviceOps, DeviceState, MacAddr, MacAddrType, MailboxConfig, MbxError,
    PfMailbox, RemovalMode, RingChain, RingChainNode, Vport,
};
use pfmbx_proto::desc::{vector_chain, OPC_ADD_RING_TO_VECTOR, OPC_MBX_PF_TO_VF};
use pfmbx_proto::{CmdDesc, CmdStatus, PfToVfBody, PfToVfCmd, ResetType, VfToPfRequest};

pub const QUEUES_PER_VPORT: u16 = 4;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Receive queue backed by a `Vec`; the tail is the number of posted descriptors.
#[derive(Debug, Default)]
pub struct MockQueue {
    pub crq: Vec<CmdDesc>,
    pub next_to_use: usize,
    pub head_writes: Vec<u32>,
    pub sent: Vec<CmdDesc>,
    /// When set, every submission fails with this status.
    pub send_error: Option<CmdStatus>,
    /// Number of upcoming submissions that fail with [`CmdStatus::QueueFull`] before sends succeed.
    pub failing_sends: usize,
    /// Vector bindings answered to ring-vector queries, keyed by global queue id.
    pub vector_map: HashMap<u16, (u16, u8)>,
}

impl MockQueue {
    pub fn post(&mut self, req: &VfToPfRequest) {
        self.crq.push(req.to_desc());
    }

    pub fn post_desc(&mut self, desc: CmdDesc) {
        self.crq.push(desc);
    }

    /// Every PF→VF descriptor submitted so far, decoded.
    pub fn pf_to_vf(&self) -> Vec<PfToVfCmd> {
        self.sent
            .iter()
            .filter(|desc| desc.opcode == OPC_MBX_PF_TO_VF)
            .map(PfToVfCmd::decode_desc)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    pub fn responses(&self) -> Vec<PfToVfCmd> {
        self.pf_to_vf()
            .into_iter()
            .filter(|cmd| cmd.resp_status().is_some())
            .collect()
    }

    pub fn messages(&self) -> Vec<PfToVfCmd> {
        self.pf_to_vf()
            .into_iter()
            .filter(|cmd| cmd.resp_status().is_none())
            .collect()
    }
}

impl CommandQueue for MockQueue {
    fn crq_empty(&self) -> bool {
        self.next_to_use >= self.crq.len()
    }

    fn crq_current(&self) -> CmdDesc {
        self.crq[self.next_to_use]
    }

    fn crq_advance(&mut self) {
        self.crq[self.next_to_use].flag = 0;
        self.next_to_use += 1;
    }

    fn crq_cursor(&self) -> u32 {
        self.next_to_use as u32
    }

    fn write_crq_head(&mut self, cursor: u32) {
        self.head_writes.push(cursor);
    }

    fn send(&mut self, desc: &mut CmdDesc) -> Result<(), CmdStatus> {
        if let Some(err) = self.send_error {
            return Err(err);
        }
        if self.failing_sends > 0 {
            self.failing_sends -= 1;
            return Err(CmdStatus::QueueFull);
        }
        if desc.opcode == OPC_ADD_RING_TO_VECTOR {
            let raw = u16::from_le_bytes([
                desc.data[vector_chain::TQP_TYPE_AND_ID],
                desc.data[vector_chain::TQP_TYPE_AND_ID + 1],
            ]);
            let tqp = (raw & vector_chain::TQP_ID_MASK) >> vector_chain::TQP_ID_SHIFT;
            let (vector, gl) = self.vector_map.get(&tqp).copied().unwrap_or((0, 0));
            vector_chain::complete(desc, vector, gl);
        }
        self.sent.push(*desc);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    VportStart(u16),
    VportStop(u16),
    Bind {
        vport_id: u16,
        vector_id: u8,
        enable: bool,
        nodes: Vec<RingChainNode>,
    },
    RemoveMac {
        vport_id: u16,
        addr_type: MacAddrType,
        addrs: Vec<MacAddr>,
    },
    RemoveVlan {
        vport_id: u16,
        mode: RemovalMode,
    },
    SetMtu {
        vport_id: u16,
        mtu: u32,
    },
    ResetTqp(u16),
    FuncReset(u16),
    RequestReset(ResetType),
    VlanFilter {
        vport_id: u16,
        proto: u16,
        vlan: u16,
        is_kill: bool,
    },
    RxStrip {
        vport_id: u16,
        enable: bool,
    },
    VlanFilterEnable {
        vport_id: u16,
        enable: bool,
    },
    ScheduleServiceTask,
}

#[derive(Debug, Default)]
pub struct MockDevice {
    pub calls: Vec<Call>,
    pub mtu_error: Option<MbxError>,
    pub start_error: Option<MbxError>,
    pub reset_tqp_error: Option<MbxError>,
}

impl MockDevice {
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

fn result(err: Option<MbxError>) -> Result<(), MbxError> {
    match err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl DeviceOps for MockDevice {
    fn vport_start(&mut self, vport_id: u16) -> Result<(), MbxError> {
        self.calls.push(Call::VportStart(vport_id));
        result(self.start_error)
    }

    fn vport_stop(&mut self, vport_id: u16) {
        self.calls.push(Call::VportStop(vport_id));
    }

    fn bind_ring_with_vector(
        &mut self,
        vport_id: u16,
        vector_id: u8,
        enable: bool,
        chain: &RingChain,
    ) -> Result<(), MbxError> {
        self.calls.push(Call::Bind {
            vport_id,
            vector_id,
            enable,
            nodes: chain.nodes().to_vec(),
        });
        Ok(())
    }

    fn remove_mac_entries(
        &mut self,
        vport_id: u16,
        addr_type: MacAddrType,
        addrs: &[MacAddr],
    ) -> Result<(), MbxError> {
        self.calls.push(Call::RemoveMac {
            vport_id,
            addr_type,
            addrs: addrs.to_vec(),
        });
        Ok(())
    }

    fn remove_all_vlan_entries(&mut self, vport_id: u16, mode: RemovalMode) {
        self.calls.push(Call::RemoveVlan { vport_id, mode });
    }

    fn set_vport_mtu(&mut self, vport_id: u16, mtu: u32) -> Result<(), MbxError> {
        self.calls.push(Call::SetMtu { vport_id, mtu });
        result(self.mtu_error)
    }

    fn reset_tqp(&mut self, vport_id: u16) -> Result<(), MbxError> {
        self.calls.push(Call::ResetTqp(vport_id));
        result(self.reset_tqp_error)
    }

    fn func_reset(&mut self, vport_id: u16) -> Result<(), MbxError> {
        self.calls.push(Call::FuncReset(vport_id));
        Ok(())
    }

    fn request_reset(&mut self, reset: ResetType) {
        self.calls.push(Call::RequestReset(reset));
    }

    fn set_vlan_filter(
        &mut self,
        vport_id: u16,
        proto: u16,
        vlan: u16,
        is_kill: bool,
    ) -> Result<(), MbxError> {
        self.calls.push(Call::VlanFilter {
            vport_id,
            proto,
            vlan,
            is_kill,
        });
        Ok(())
    }

    fn en_hw_strip_rxvtag(&mut self, vport_id: u16, enable: bool) -> Result<(), MbxError> {
        self.calls.push(Call::RxStrip { vport_id, enable });
        Ok(())
    }

    fn enable_vport_vlan_filter(&mut self, vport_id: u16, enable: bool) -> Result<(), MbxError> {
        self.calls.push(Call::VlanFilterEnable { vport_id, enable });
        Ok(())
    }

    fn schedule_service_task(&mut self) {
        self.calls.push(Call::ScheduleServiceTask);
    }
}

pub fn config(num_req_vfs: u16) -> MailboxConfig {
    MailboxConfig {
        num_req_vfs,
        ..MailboxConfig::default()
    }
}

/// Vport `id` owns global queues `id * 4 .. id * 4 + 4`, all of them in RSS.
pub fn vports(num_req_vfs: u16) -> Vec<Vport> {
    (0..=num_req_vfs)
        .map(|id| {
            let base = id * QUEUES_PER_VPORT;
            Vport::new(id, (base..base + QUEUES_PER_VPORT).collect(), QUEUES_PER_VPORT)
        })
        .collect()
}

pub fn device_state(config: &MailboxConfig) -> DeviceState {
    let mut dev = DeviceState::from_config(config);
    for (i, byte) in dev.rss_key.iter_mut().enumerate() {
        *byte = i as u8;
    }
    dev.link_up = true;
    dev.speed = 25_000;
    dev.duplex = 1;
    dev.supported = 0x00ff;
    dev.advertising = 0x000f;
    dev.media_type = 1;
    dev.module_type = 3;
    dev
}

pub fn mailbox_with(config: MailboxConfig) -> PfMailbox<MockQueue, MockDevice> {
    init_tracing();
    let dev = device_state(&config);
    let vports = vports(config.num_req_vfs);
    PfMailbox::new(MockQueue::default(), MockDevice::default(), dev, vports, config).unwrap()
}

pub fn mailbox(num_req_vfs: u16) -> PfMailbox<MockQueue, MockDevice> {
    mailbox_with(config(num_req_vfs))
}

/// Status and payload of a decoded response.
pub fn resp_parts(cmd: &PfToVfCmd) -> (u16, [u8; 8]) {
    match cmd.body {
        PfToVfBody::Response {
            resp_status,
            resp_data,
            ..
        } => (resp_status, resp_data),
        PfToVfBody::Message { .. } => panic!("expected a response, got {cmd:?}"),
    }
}

/// Post `req` (with the response bit set), run one pump pass and return the single response.
pub fn roundtrip(
    mbx: &mut PfMailbox<MockQueue, MockDevice>,
    req: VfToPfRequest,
) -> (u16, [u8; 8]) {
    let before = mbx.queue().responses().len();
    mbx.queue_mut().post(&req.with_need_resp(true));
    let _ = mbx.handle_mailbox();
    let responses = mbx.queue().responses();
    assert_eq!(responses.len(), before + 1, "expected exactly one new response");
    resp_parts(&responses[before])
}
