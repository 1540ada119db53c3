//! Recording test doubles for the engine, discovery and transport seams

use crate::{
    HfreId, Role, StackId,
    config::RoleConfig,
    constants::MAX_LOCAL_CODECS,
    discovery::{DiscoveryService, SdpRecordHandle},
    engine::{Command, EngineError, EngineResult, ProtocolEngine, ServerMode},
    notification::{NotificationBuffer, NotificationSink},
};
use alloc::{format, string::String, vec::Vec};
use bt_hci::param::BdAddr;

/// Discards log frames so test binaries link without a probe transport
#[defmt::global_logger]
struct DiscardLogger;

unsafe impl defmt::Logger for DiscardLogger {
    fn acquire() {}
    unsafe fn flush() {}
    unsafe fn release() {}
    unsafe fn write(_bytes: &[u8]) {}
}

#[defmt::panic_handler]
fn defmt_panic() -> ! {
    panic!("defmt panic")
}

defmt::timestamp!("{=u32}", 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    OpenServer(Role),
    SetMode(HfreId, ServerMode),
    CloseServer(HfreId),
    OpenRemote(Role, [u8; 6], u8),
    RequestResponse(HfreId, bool),
    ClosePort(HfreId),
    Command(HfreId, String),
}

/// Engine handing out the lowest free identifier, so repeated bring-ups are reproducible
#[derive(Debug, Default)]
pub struct MockEngine {
    pub calls: Vec<EngineCall>,
    pub stacks: Vec<StackId>,
    pub codecs: heapless::Vec<u8, MAX_LOCAL_CODECS>,
    pub codec_query_fails: bool,
    /// Fail the open of `slot` for `role`, counted by the role's currently open servers
    pub fail_open: Option<(Role, usize)>,
    pub fail_remote_open: bool,
    pub fail_close: bool,
    pub fail_server_close: bool,
    pub fail_commands_after: Option<usize>,
    open_servers: Vec<(Role, HfreId)>,
    open_ports: Vec<HfreId>,
    commands_sent: usize,
}

impl MockEngine {
    pub fn with_codecs(codecs: &[u8]) -> Self {
        let mut engine = Self::default();
        engine.codecs.extend_from_slice(codecs).unwrap();
        engine
    }

    /// Engine whose server open fails once `role` has `slot` servers open
    pub fn failing_open(role: Role, slot: usize) -> Self {
        Self {
            fail_open: Some((role, slot)),
            ..Self::default()
        }
    }

    pub fn open_server_ids(&self) -> Vec<HfreId> {
        self.open_servers.iter().map(|&(_, id)| id).collect()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Command(_, command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    fn allocate_id(&self) -> HfreId {
        let taken = |raw: u32| {
            self.open_servers.iter().any(|&(_, id)| id.get() == raw)
                || self.open_ports.iter().any(|id| id.get() == raw)
        };
        let raw = (1..).find(|&raw| !taken(raw)).unwrap();
        HfreId::new(raw).unwrap()
    }
}

impl ProtocolEngine for MockEngine {
    fn read_local_supported_codecs(
        &mut self,
        stack: StackId,
    ) -> EngineResult<heapless::Vec<u8, MAX_LOCAL_CODECS>> {
        self.stacks.push(stack);
        if self.codec_query_fails {
            return Err(EngineError(-1));
        }
        Ok(self.codecs.clone())
    }

    fn open_server_port(
        &mut self,
        stack: StackId,
        role: Role,
        config: &RoleConfig,
    ) -> EngineResult<HfreId> {
        assert_eq!(config.role(), role);
        self.stacks.push(stack);
        self.calls.push(EngineCall::OpenServer(role));

        let open_for_role = self.open_servers.iter().filter(|(r, _)| *r == role).count();
        if self.fail_open == Some((role, open_for_role)) {
            return Err(EngineError(-3));
        }
        let id = self.allocate_id();
        self.open_servers.push((role, id));
        Ok(id)
    }

    fn set_server_mode(&mut self, _stack: StackId, id: HfreId, mode: ServerMode) -> EngineResult {
        self.calls.push(EngineCall::SetMode(id, mode));
        Ok(())
    }

    fn close_server_port(&mut self, _stack: StackId, id: HfreId) -> EngineResult {
        self.calls.push(EngineCall::CloseServer(id));
        if self.fail_server_close {
            return Err(EngineError(-2));
        }
        let before = self.open_servers.len();
        self.open_servers.retain(|&(_, open)| open != id);
        if self.open_servers.len() == before {
            return Err(EngineError(-2));
        }
        Ok(())
    }

    fn open_remote_port(
        &mut self,
        _stack: StackId,
        role: Role,
        address: BdAddr,
        remote_port: u8,
        _config: &RoleConfig,
    ) -> EngineResult<HfreId> {
        let raw = address.raw().try_into().unwrap();
        self.calls
            .push(EngineCall::OpenRemote(role, raw, remote_port));
        if self.fail_remote_open {
            return Err(EngineError(-4));
        }
        let id = self.allocate_id();
        self.open_ports.push(id);
        Ok(id)
    }

    fn open_port_request_response(
        &mut self,
        _stack: StackId,
        id: HfreId,
        accept: bool,
    ) -> EngineResult {
        self.calls.push(EngineCall::RequestResponse(id, accept));
        Ok(())
    }

    fn close_port(&mut self, _stack: StackId, id: HfreId) -> EngineResult {
        self.calls.push(EngineCall::ClosePort(id));
        if self.fail_close {
            return Err(EngineError(-5));
        }
        self.open_ports.retain(|&open| open != id);
        Ok(())
    }

    fn send_command(&mut self, _stack: StackId, id: HfreId, command: &Command<'_>) -> EngineResult {
        if self
            .fail_commands_after
            .is_some_and(|limit| self.commands_sent >= limit)
        {
            return Err(EngineError(-6));
        }
        self.commands_sent += 1;
        self.calls
            .push(EngineCall::Command(id, format!("{command:?}")));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockDiscovery {
    pub installed: Vec<(Role, HfreId, SdpRecordHandle)>,
    pub deleted: Vec<SdpRecordHandle>,
    pub eir: Vec<Vec<u8>>,
    pub fail_register: bool,
    pub fail_delete: bool,
    next_handle: u32,
}

impl MockDiscovery {
    pub fn handle_for(&self, role: Role) -> Option<SdpRecordHandle> {
        self.installed
            .iter()
            .find(|(r, _, _)| *r == role)
            .map(|&(_, _, handle)| handle)
    }
}

impl DiscoveryService for MockDiscovery {
    fn register_sdp_record(
        &mut self,
        _stack: StackId,
        role: Role,
        anchor: HfreId,
        _config: &RoleConfig,
    ) -> EngineResult<SdpRecordHandle> {
        if self.fail_register {
            return Err(EngineError(-7));
        }
        self.next_handle += 1;
        let handle = SdpRecordHandle::new(0x0001_0000 + self.next_handle).unwrap();
        self.installed.push((role, anchor, handle));
        Ok(handle)
    }

    fn delete_sdp_record(&mut self, _stack: StackId, handle: SdpRecordHandle) -> EngineResult {
        self.deleted.push(handle);
        if self.fail_delete {
            return Err(EngineError(-8));
        }
        self.installed.retain(|&(_, _, installed)| installed != handle);
        Ok(())
    }

    fn add_eir_data(&mut self, data: &[u8]) -> EngineResult {
        self.eir.push(data.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub delivered: Vec<NotificationBuffer>,
    pub rejected: usize,
    reject: bool,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, buffer: NotificationBuffer) -> Result<(), NotificationBuffer> {
        if self.reject {
            self.rejected += 1;
            return Err(buffer);
        }
        self.delivered.push(buffer);
        Ok(())
    }
}
