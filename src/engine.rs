//! Protocol Engine Interface
//!
//! The manager does not speak RFCOMM or AT commands itself. It drives a
//! [`ProtocolEngine`] that owns the profile state machines, and receives the
//! engine's callbacks through [`HandsFreeManager::handle_profile_event`].
//!
//! [`HandsFreeManager::handle_profile_event`]: crate::HandsFreeManager::handle_profile_event

use crate::{HfreId, Role, StackId, config::RoleConfig, constants::MAX_LOCAL_CODECS};
use bt_hci::param::BdAddr;
use heapless::Vec;

pub use crate::command::Command;

/// Negative status code reported by the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct EngineError(pub i32);

/// Result of a protocol engine call
pub type EngineResult<T = ()> = Result<T, EngineError>;

/// How a server port treats incoming connection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ServerMode {
    /// Incoming connections are accepted without asking
    AutomaticAccept,
    /// Incoming connections are surfaced as requests awaiting a response
    ManualAccept,
}

/// Operations the manager issues against the Hands-Free protocol engine
///
/// Calls must not block on the completion of the operation they start; results
/// arrive later as profile events.
pub trait ProtocolEngine {
    /// Codec identifiers the local controller supports
    ///
    /// # Errors
    ///
    /// Returns the engine status if the controller could not be queried.
    fn read_local_supported_codecs(
        &mut self,
        stack: StackId,
    ) -> EngineResult<Vec<u8, MAX_LOCAL_CODECS>>;

    /// Open a server port for `role` and return its identifier
    ///
    /// # Errors
    ///
    /// Returns the engine status if the port could not be opened.
    fn open_server_port(
        &mut self,
        stack: StackId,
        role: Role,
        config: &RoleConfig,
    ) -> EngineResult<HfreId>;

    /// Change how a server port handles incoming connection requests
    ///
    /// # Errors
    ///
    /// Returns the engine status if the port rejected the mode.
    fn set_server_mode(&mut self, stack: StackId, id: HfreId, mode: ServerMode) -> EngineResult;

    /// Close a server port
    ///
    /// # Errors
    ///
    /// Returns the engine status if the port was not open.
    fn close_server_port(&mut self, stack: StackId, id: HfreId) -> EngineResult;

    /// Open an outgoing port to `address` using the local `role` configuration
    ///
    /// # Errors
    ///
    /// Returns the engine status if the connection attempt could not be started.
    fn open_remote_port(
        &mut self,
        stack: StackId,
        role: Role,
        address: BdAddr,
        remote_port: u8,
        config: &RoleConfig,
    ) -> EngineResult<HfreId>;

    /// Accept or reject a pending incoming connection on a manual-accept server
    ///
    /// # Errors
    ///
    /// Returns the engine status if no request is pending on `id`.
    fn open_port_request_response(
        &mut self,
        stack: StackId,
        id: HfreId,
        accept: bool,
    ) -> EngineResult;

    /// Close an open connection port
    ///
    /// # Errors
    ///
    /// Returns the engine status if the port was not open.
    fn close_port(&mut self, stack: StackId, id: HfreId) -> EngineResult;

    /// Encode and send a profile command on connection `id`
    ///
    /// # Errors
    ///
    /// Returns the engine status if the command cannot be sent in the current state.
    fn send_command(&mut self, stack: StackId, id: HfreId, command: &Command<'_>) -> EngineResult;
}
