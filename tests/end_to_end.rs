//! Drives the engine through the crate facade with a ring-buffer firmware model.

use pfmbx::proto::desc::OPC_MBX_PF_TO_VF;
use pfmbx::proto::payload::QueueInfo;
use pfmbx::proto::{CmdDesc, CmdStatus, Opcode, PfToVfBody, PfToVfCmd, VfToPfRequest};
use pfmbx::{
    CommandQueue, DeviceOps, DeviceState, MailboxConfig, MbxError, PfMailbox, RingChain, Vport,
    VportState,
};
use pretty_assertions::assert_eq;

const RING_DEPTH: usize = 4;

/// Receive ring of fixed depth; firmware posts at `tail`, the PF consumes at `next_to_use`.
struct Firmware {
    ring: [CmdDesc; RING_DEPTH],
    tail: usize,
    next_to_use: usize,
    head: Vec<u32>,
    sent: Vec<CmdDesc>,
}

impl Firmware {
    fn new() -> Self {
        Self {
            ring: [CmdDesc::default(); RING_DEPTH],
            tail: 0,
            next_to_use: 0,
            head: Vec::new(),
            sent: Vec::new(),
        }
    }

    fn post(&mut self, req: VfToPfRequest) {
        self.ring[self.tail] = req.to_desc();
        self.tail = (self.tail + 1) % RING_DEPTH;
    }

    fn responses(&self) -> Vec<PfToVfCmd> {
        self.sent
            .iter()
            .filter(|desc| desc.opcode == OPC_MBX_PF_TO_VF)
            .map(|desc| PfToVfCmd::decode_desc(desc).unwrap())
            .collect()
    }
}

impl CommandQueue for Firmware {
    fn crq_empty(&self) -> bool {
        self.next_to_use == self.tail
    }

    fn crq_current(&self) -> CmdDesc {
        self.ring[self.next_to_use]
    }

    fn crq_advance(&mut self) {
        self.ring[self.next_to_use].flag = 0;
        self.next_to_use = (self.next_to_use + 1) % RING_DEPTH;
    }

    fn crq_cursor(&self) -> u32 {
        self.next_to_use as u32
    }

    fn write_crq_head(&mut self, cursor: u32) {
        self.head.push(cursor);
    }

    fn send(&mut self, desc: &mut CmdDesc) -> Result<(), CmdStatus> {
        self.sent.push(*desc);
        Ok(())
    }
}

#[derive(Default)]
struct Adapter {
    started: Vec<u16>,
    resets: Vec<u16>,
}

impl DeviceOps for Adapter {
    fn vport_start(&mut self, vport_id: u16) -> Result<(), MbxError> {
        self.started.push(vport_id);
        Ok(())
    }

    fn vport_stop(&mut self, _vport_id: u16) {}

    fn bind_ring_with_vector(
        &mut self,
        _vport_id: u16,
        _vector_id: u8,
        _enable: bool,
        _chain: &RingChain,
    ) -> Result<(), MbxError> {
        Ok(())
    }

    fn remove_mac_entries(
        &mut self,
        _vport_id: u16,
        _addr_type: pfmbx::MacAddrType,
        _addrs: &[pfmbx::MacAddr],
    ) -> Result<(), MbxError> {
        Ok(())
    }

    fn remove_all_vlan_entries(&mut self, _vport_id: u16, _mode: pfmbx::RemovalMode) {}

    fn set_vport_mtu(&mut self, _vport_id: u16, _mtu: u32) -> Result<(), MbxError> {
        Ok(())
    }

    fn reset_tqp(&mut self, _vport_id: u16) -> Result<(), MbxError> {
        Ok(())
    }

    fn func_reset(&mut self, vport_id: u16) -> Result<(), MbxError> {
        self.resets.push(vport_id);
        Ok(())
    }

    fn request_reset(&mut self, _reset: pfmbx::proto::ResetType) {}

    fn set_vlan_filter(
        &mut self,
        _vport_id: u16,
        _proto: u16,
        _vlan: u16,
        _is_kill: bool,
    ) -> Result<(), MbxError> {
        Ok(())
    }

    fn en_hw_strip_rxvtag(&mut self, _vport_id: u16, _enable: bool) -> Result<(), MbxError> {
        Ok(())
    }

    fn enable_vport_vlan_filter(&mut self, _vport_id: u16, _enable: bool) -> Result<(), MbxError> {
        Ok(())
    }

    fn schedule_service_task(&mut self) {}
}

fn engine() -> PfMailbox<Firmware, Adapter> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = MailboxConfig::from_json(r#"{ "num_req_vfs": 2, "rx_buf_len": 4096 }"#).unwrap();
    let dev = DeviceState::from_config(&config);
    let vports = (0..=config.num_req_vfs)
        .map(|id| Vport::new(id, vec![id * 2, id * 2 + 1], 2))
        .collect();
    PfMailbox::new(Firmware::new(), Adapter::default(), dev, vports, config).unwrap()
}

fn request(vfid: u8, op: Opcode, match_id: u16) -> VfToPfRequest {
    VfToPfRequest::new(op)
        .with_src_vfid(vfid)
        .with_match_id(match_id)
        .with_need_resp(true)
}

#[test]
fn valid_messages_are_answered_around_an_invalid_one() {
    let mut mbx = engine();
    mbx.queue_mut().post(request(1, Opcode::GetQinfo, 1));
    mbx.queue_mut().post(request(7, Opcode::Reset, 2));
    mbx.queue_mut()
        .post(request(2, Opcode::SetAlive, 3).with_data(&[1]));

    let stats = mbx.handle_mailbox();
    assert_eq!((stats.processed, stats.dropped, stats.responses), (2, 1, 2));

    let responses = mbx.queue().responses();
    let ids: Vec<_> = responses
        .iter()
        .map(|cmd| (cmd.dest_vfid, cmd.match_id))
        .collect();
    assert_eq!(ids, vec![(1, 1), (2, 3)]);

    let PfToVfBody::Response {
        vf_code,
        resp_status,
        resp_data,
        ..
    } = responses[0].body
    else {
        panic!("expected a response");
    };
    assert_eq!(vf_code, u16::from(Opcode::GetQinfo.as_u8()));
    assert_eq!(resp_status, 0);
    assert_eq!(
        QueueInfo::decode(&resp_data).unwrap(),
        QueueInfo {
            alloc_tqps: 2,
            rss_size: 2,
            rx_buf_len: 4096,
        }
    );

    assert_eq!(mbx.queue().head, vec![3]);
    assert!(mbx.device().resets.is_empty());
    assert_eq!(mbx.device().started, vec![2]);
    assert!(mbx.vport(2).unwrap().state.contains(VportState::ALIVE));
}

#[test]
fn head_follows_the_ring_across_wraparound() {
    let mut mbx = engine();
    for pass in 0..2u16 {
        for i in 0..3 {
            mbx.queue_mut()
                .post(request(1, Opcode::KeepAlive, pass * 3 + i));
        }
        let stats = mbx.handle_mailbox();
        assert_eq!(stats.responses, 3);
    }

    assert_eq!(mbx.queue().head, vec![3, 2]);
    let match_ids: Vec<_> = mbx
        .queue()
        .responses()
        .iter()
        .map(|cmd| cmd.match_id)
        .collect();
    assert_eq!(match_ids, (0..6).collect::<Vec<u16>>());
}
