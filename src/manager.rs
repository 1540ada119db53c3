//! Hands-Free Manager - role bookkeeping and stack lifecycle
//!
//! [`HandsFreeManager`] owns the configuration and server slots of the locally
//! enabled roles and sequences them against the radio's power state.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Initialized(stack down)
//!        ^                         |        ^
//!        |                 set_stack_id(id) set_stack_id(0)
//!     cleanup                      v        |
//!        +-------------------- Initialized(stack up)
//! ```
//!
//! Power-up opens `max_servers` server ports per enabled role in slot order,
//! Audio Gateway first, and switches each to manual accept. It commits only when
//! every enabled role came up completely; any failure closes what was opened for
//! both roles and leaves the stack down.
//!
//! ## Concurrency
//!
//! The manager is a plain owned value without internal locking. Share it between
//! tasks behind an `embassy_sync::mutex::Mutex` (or a blocking mutex) so that only
//! one lifecycle call runs at a time. No call waits for the engine to complete an
//! operation; completions arrive as profile events.

use crate::{
    HfpError, HfreId, Role, StackId,
    config::RoleConfig,
    constants::CODING_FORMAT_MSBC,
    discovery::{DiscoveryService, SdpRecordHandle, build_eir_data},
    engine::{ProtocolEngine, ServerMode},
    event::ProfileEvent,
    notification::{EventMarshaler, NotificationSink},
    registry::{IncomingConnection, RoleEntry, RoleTable},
};

/// Hands-Free / Audio Gateway session manager
///
/// Generic over the protocol engine it drives, the discovery service it publishes
/// through and the transport that receives marshaled events.
pub struct HandsFreeManager<E: ProtocolEngine, D: DiscoveryService, N: NotificationSink> {
    pub(crate) engine: E,
    discovery: D,
    marshaler: EventMarshaler<N>,
    pub(crate) roles: RoleTable,
    initialized: bool,
    pub(crate) stack: StackId,
}

impl<E: ProtocolEngine, D: DiscoveryService, N: NotificationSink> HandsFreeManager<E, D, N> {
    /// Create an uninitialized manager
    pub fn new(engine: E, discovery: D, sink: N) -> Self {
        Self {
            engine,
            discovery,
            marshaler: EventMarshaler::new(sink),
            roles: RoleTable::new(),
            initialized: false,
            stack: 0,
        }
    }

    /// Enable the roles whose configuration is supplied and valid
    ///
    /// Each configuration is validated on its own; an invalid one only disables its
    /// role. Calling this again while initialized is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInitializationData` if no role could be enabled.
    pub fn initialize(
        &mut self,
        audio_gateway: Option<RoleConfig>,
        hands_free: Option<RoleConfig>,
    ) -> Result<(), HfpError> {
        if self.initialized {
            defmt::debug!("[HFRM] already initialized");
            return Ok(());
        }

        let supplied = [
            (Role::AudioGateway, audio_gateway),
            (Role::HandsFree, hands_free),
        ];
        for (role, config) in supplied {
            let Some(config) = config else {
                continue;
            };
            if config.role() != role {
                defmt::warn!("[HFRM] {} configuration supplied for {}", config.role(), role);
                continue;
            }
            match RoleEntry::new(config) {
                Ok(entry) => {
                    defmt::info!(
                        "[HFRM] {} enabled: port {}, {} server(s)",
                        role,
                        entry.config.server_port,
                        entry.servers.capacity()
                    );
                    self.roles.insert(entry);
                }
                Err(e) => defmt::warn!("[HFRM] {} configuration rejected: {}", role, e),
            }
        }

        if self.roles.is_empty() {
            return Err(HfpError::InvalidInitializationData);
        }
        self.initialized = true;
        self.stack = 0;
        Ok(())
    }

    /// Inform the manager of a stack power transition
    ///
    /// A non-zero `stack` powers the roles up; if the stack was already up it is
    /// powered down first. Zero powers them down, keeping configuration and SDP
    /// records.
    ///
    /// Returns `true` when the controller supports wide band speech (mSBC), in which
    /// case codec negotiation is added to every enabled role's supported features.
    /// The value is only meaningful on power-up.
    pub fn set_stack_id(&mut self, stack: StackId) -> bool {
        if !self.initialized {
            defmt::debug!("[HFRM] stack transition ignored, not initialized");
            return false;
        }

        if stack == 0 {
            self.power_down();
            return false;
        }

        if self.stack != 0 {
            defmt::debug!("[HFRM] stack {} replaced by {}", self.stack, stack);
            self.power_down();
        }

        let wide_band_speech = self.probe_codecs(stack);

        if self.bring_up(stack) {
            self.stack = stack;
            defmt::info!("[HFRM] stack {} up", stack);
            self.publish_eir();
        } else {
            defmt::warn!("[HFRM] bring-up on stack {} failed, rolling back", stack);
            self.roll_back(stack);
        }

        wide_band_speech
    }

    /// Install or remove the SDP record of `role`
    ///
    /// Installing anchors the record on the role's first server and requires the
    /// stack to be up. Installing an already installed record and removing a missing
    /// one both succeed without doing anything.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization, and `InvalidOperation` if the
    /// role is not enabled, has no open server, or the discovery service failed.
    pub fn update_sdp_record(&mut self, role: Role, install: bool) -> Result<(), HfpError> {
        if !self.initialized {
            return Err(HfpError::NotInitialized);
        }
        let entry = self.roles.get_mut(role).ok_or(HfpError::InvalidOperation)?;

        if install {
            if entry.sdp_handle.is_some() {
                return Ok(());
            }
            let anchor = entry.servers.anchor().ok_or(HfpError::InvalidOperation)?;
            let handle = self
                .discovery
                .register_sdp_record(self.stack, role, anchor, &entry.config)
                .map_err(|e| {
                    defmt::warn!("[HFRM] {} SDP record not installed: {}", role, e);
                    HfpError::InvalidOperation
                })?;
            defmt::info!("[HFRM] {} SDP record {:#x} installed", role, handle.get());
            entry.sdp_handle = Some(handle);
        } else if let Some(handle) = entry.sdp_handle.take() {
            defmt::info!("[HFRM] {} SDP record {:#x} removed", role, handle.get());
            self.discovery
                .delete_sdp_record(self.stack, handle)
                .map_err(|_| HfpError::InvalidOperation)?;
        }
        Ok(())
    }

    /// Close every server, delete the SDP records and forget all configuration
    ///
    /// Safe to call at any time; does nothing when not initialized.
    pub fn cleanup(&mut self) {
        if !self.initialized {
            return;
        }

        let stack = self.stack;
        for entry in self.roles.iter_mut() {
            let closed = entry
                .servers
                .close_all(true, |id| close_server(&mut self.engine, stack, id));
            if let Some(handle) = entry.sdp_handle.take() {
                delete_record(&mut self.discovery, stack, handle);
            }
            defmt::debug!("[HFRM] {} cleaned up, {} server(s) closed", entry.config.role(), closed);
        }

        self.roles.clear();
        self.initialized = false;
        self.stack = 0;
        defmt::info!("[HFRM] cleaned up");
    }

    /// Determine which local role a server identifier belongs to
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization, `InvalidParameter` for a
    /// zero identifier and `NotConnected` if no local server holds it.
    pub fn query_incoming_connection_type(&self, id: u32) -> Result<IncomingConnection, HfpError> {
        if !self.initialized {
            return Err(HfpError::NotInitialized);
        }
        let id = HfreId::new(id).ok_or(HfpError::InvalidParameter)?;
        self.roles.resolve(id).ok_or(HfpError::NotConnected)
    }

    /// Configuration of an enabled role, including features added at power-up
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization and `InvalidOperation` if the
    /// role is not enabled.
    pub fn current_configuration(&self, role: Role) -> Result<&RoleConfig, HfpError> {
        if !self.initialized {
            return Err(HfpError::NotInitialized);
        }
        self.roles
            .get(role)
            .map(|entry| &entry.config)
            .ok_or(HfpError::InvalidOperation)
    }

    /// Entry point for the protocol engine's event callback
    pub fn handle_profile_event(
        &mut self,
        stack: StackId,
        event: &ProfileEvent<'_>,
        callback_parameter: usize,
    ) {
        self.marshaler.on_event(stack, event, callback_parameter);
    }

    /// Returns `true` once [`initialize`](Self::initialize) succeeded
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Identifier of the stack the roles are up on, `0` while down
    #[must_use]
    pub const fn stack_id(&self) -> StackId {
        self.stack
    }

    /// Returns `true` if `role` was enabled at initialization
    #[must_use]
    pub fn is_role_enabled(&self, role: Role) -> bool {
        self.roles.is_enabled(role)
    }

    /// Role configuration and server slots
    #[must_use]
    pub const fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// The protocol engine
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The discovery service
    pub const fn discovery(&self) -> &D {
        &self.discovery
    }

    /// The event marshaler and its delivery counters
    pub const fn marshaler(&self) -> &EventMarshaler<N> {
        &self.marshaler
    }

    fn probe_codecs(&mut self, stack: StackId) -> bool {
        let supported = match self.engine.read_local_supported_codecs(stack) {
            Ok(codecs) => codecs.contains(&CODING_FORMAT_MSBC),
            Err(e) => {
                defmt::debug!("[HFRM] codec query failed: {}", e);
                false
            }
        };

        if supported {
            for entry in self.roles.iter_mut() {
                entry.config.supported_features |= entry.config.role().codec_negotiation_bit();
            }
        }
        defmt::info!("[HFRM] wide band speech supported: {}", supported);
        supported
    }

    /// Open every server of every enabled role, stopping at the first failure
    fn bring_up(&mut self, stack: StackId) -> bool {
        for role in Role::ALL {
            let Some(capacity) = self.roles.get(role).map(|entry| entry.servers.capacity()) else {
                continue;
            };

            for slot in 0..capacity {
                let Some(entry) = self.roles.get(role) else {
                    return false;
                };
                let id = match self.engine.open_server_port(stack, role, &entry.config) {
                    Ok(id) => id,
                    Err(e) => {
                        defmt::warn!("[HFRM] {} server[{}] failed to open: {}", role, slot, e);
                        return false;
                    }
                };

                if let Err(e) = self.roles.record_opened(role, slot, id) {
                    defmt::warn!("[HFRM] {} server[{}] not recorded: {}", role, slot, e);
                    close_server(&mut self.engine, stack, id);
                    return false;
                }
                defmt::debug!("[HFRM] {} server[{}] opened: {}", role, slot, id.get());

                if let Err(e) = self.engine.set_server_mode(stack, id, ServerMode::ManualAccept) {
                    defmt::debug!("[HFRM] {} server[{}] kept its mode: {}", role, slot, e);
                }
            }
        }
        true
    }

    /// Undo a partial bring-up on `stack`
    fn roll_back(&mut self, stack: StackId) {
        for entry in self.roles.iter_mut() {
            entry
                .servers
                .close_all(false, |id| close_server(&mut self.engine, stack, id));
            if let Some(handle) = entry.sdp_handle.take() {
                delete_record(&mut self.discovery, stack, handle);
            }
        }
        self.stack = 0;
    }

    fn power_down(&mut self) {
        let stack = self.stack;
        let mut closed = 0;
        for entry in self.roles.iter_mut() {
            closed += entry
                .servers
                .close_all(false, |id| close_server(&mut self.engine, stack, id));
        }
        self.stack = 0;
        defmt::info!("[HFRM] stack down, {} server(s) closed", closed);
    }

    fn publish_eir(&mut self) {
        let enabled = self.roles.iter().map(|entry| entry.config.role());
        if let Some(data) = build_eir_data(enabled) {
            if let Err(e) = self.discovery.add_eir_data(&data) {
                defmt::warn!("[HFRM] EIR data rejected: {}", e);
            }
        }
    }
}

/// Close a server port; the slot is released whatever the engine reports
fn close_server<E: ProtocolEngine>(engine: &mut E, stack: StackId, id: HfreId) {
    if let Err(e) = engine.close_server_port(stack, id) {
        defmt::debug!("[HFRM] server {} close failed: {}", id.get(), e);
    }
}

/// Delete an SDP record; the handle is forgotten whatever the service reports
fn delete_record<D: DiscoveryService>(
    discovery: &mut D,
    stack: StackId,
    handle: SdpRecordHandle,
) {
    if let Err(e) = discovery.delete_sdp_record(stack, handle) {
        defmt::debug!("[HFRM] SDP record {:#x} delete failed: {}", handle.get(), e);
    }
}
