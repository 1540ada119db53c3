//! Server Registry and Connection Role Resolver
//!
//! Each enabled role owns a fixed-capacity table of server slots. A slot holds the
//! identifier the protocol engine returned when the slot's server port was opened,
//! or nothing while the stack is down. [`RoleTable`] groups the two roles and
//! answers which role an opaque identifier belongs to.
//!
//! An identifier is live in at most one slot across both roles at any time.

use crate::{
    HfpError, HfreId, Role, config::RoleConfig, constants::MAX_SERVERS_PER_ROLE,
    discovery::SdpRecordHandle,
};
use heapless::Vec;

/// Slot table of one role's server ports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRegistry {
    slots: Vec<Option<HfreId>, MAX_SERVERS_PER_ROLE>,
}

impl ServerRegistry {
    /// Create an empty, unconfigured registry
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocate `max_servers` empty slots
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if `max_servers` exceeds [`MAX_SERVERS_PER_ROLE`].
    pub fn configure(&mut self, max_servers: usize) -> Result<(), HfpError> {
        self.slots.clear();
        self.slots
            .resize(max_servers, None)
            .map_err(|()| HfpError::OutOfMemory)
    }

    /// Record an opened server port in `slot`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the slot does not exist or is already in use.
    pub fn record_opened(&mut self, slot: usize, id: HfreId) -> Result<(), HfpError> {
        match self.slots.get_mut(slot) {
            Some(entry @ None) => {
                *entry = Some(id);
                Ok(())
            }
            _ => Err(HfpError::InvalidParameter),
        }
    }

    /// Empty every used slot, handing each identifier to `close` first
    ///
    /// With `release` set the slot table itself is discarded as well. Returns the
    /// number of identifiers closed.
    pub fn close_all(&mut self, release: bool, mut close: impl FnMut(HfreId)) -> usize {
        let mut closed = 0;
        for slot in &mut self.slots {
            if let Some(id) = slot.take() {
                close(id);
                closed += 1;
            }
        }
        if release {
            self.slots.clear();
        }
        closed
    }

    /// Returns `true` if `id` is held by any slot
    #[must_use]
    pub fn contains(&self, id: HfreId) -> bool {
        self.slots.iter().any(|slot| *slot == Some(id))
    }

    /// Index of the first empty slot
    #[must_use]
    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Identifier in slot 0, used to anchor the role's SDP record
    #[must_use]
    pub fn anchor(&self) -> Option<HfreId> {
        self.slots.first().copied().flatten()
    }

    /// Open identifiers in slot order
    pub fn open_ids(&self) -> impl Iterator<Item = HfreId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// Number of slots currently holding an identifier
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open_ids().count()
    }

    /// Number of configured slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` once [`configure`](Self::configure) has allocated slots
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Returns `true` when every configured slot holds an identifier
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.is_configured() && self.first_free_slot().is_none()
    }
}

/// Everything the manager keeps for one enabled role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    /// Configuration captured at initialization
    pub config: RoleConfig,
    /// Server slots
    pub servers: ServerRegistry,
    /// Installed SDP record, if any
    pub sdp_handle: Option<SdpRecordHandle>,
}

impl RoleEntry {
    /// Validate `config` and allocate its server slots
    ///
    /// # Errors
    ///
    /// Propagates the validation error of the configuration.
    pub fn new(config: RoleConfig) -> Result<Self, HfpError> {
        config.validate()?;
        let mut servers = ServerRegistry::new();
        servers.configure(config.max_servers)?;
        Ok(Self {
            config,
            servers,
            sdp_handle: None,
        })
    }
}

/// Role and listening port an identifier resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct IncomingConnection {
    /// Local role owning the identifier
    pub role: Role,
    /// Server port configured for that role
    pub server_port: u8,
}

/// The Audio Gateway and Hands-Free entries side by side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    audio_gateway: Option<RoleEntry>,
    hands_free: Option<RoleEntry>,
}

impl RoleTable {
    /// Create a table with no role enabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            audio_gateway: None,
            hands_free: None,
        }
    }

    /// Enable a role
    pub fn insert(&mut self, entry: RoleEntry) {
        match entry.config.role() {
            Role::AudioGateway => self.audio_gateway = Some(entry),
            Role::HandsFree => self.hands_free = Some(entry),
        }
    }

    /// Entry of an enabled role
    #[must_use]
    pub fn get(&self, role: Role) -> Option<&RoleEntry> {
        match role {
            Role::AudioGateway => self.audio_gateway.as_ref(),
            Role::HandsFree => self.hands_free.as_ref(),
        }
    }

    /// Mutable entry of an enabled role
    pub fn get_mut(&mut self, role: Role) -> Option<&mut RoleEntry> {
        match role {
            Role::AudioGateway => self.audio_gateway.as_mut(),
            Role::HandsFree => self.hands_free.as_mut(),
        }
    }

    /// Returns `true` if `role` was enabled at initialization
    #[must_use]
    pub fn is_enabled(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    /// Returns `true` if no role is enabled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audio_gateway.is_none() && self.hands_free.is_none()
    }

    /// Enabled entries in bring-up order (Audio Gateway first)
    pub fn iter(&self) -> impl Iterator<Item = &RoleEntry> {
        self.audio_gateway.iter().chain(self.hands_free.iter())
    }

    /// Mutable enabled entries in bring-up order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RoleEntry> {
        self.audio_gateway.iter_mut().chain(self.hands_free.iter_mut())
    }

    /// Record an opened server port for `role`
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the role is not enabled, and `InvalidParameter`
    /// if the slot is out of range or occupied.
    pub fn record_opened(&mut self, role: Role, slot: usize, id: HfreId) -> Result<(), HfpError> {
        debug_assert!(
            self.resolve(id).is_none(),
            "server identifier recorded twice"
        );
        self.get_mut(role)
            .ok_or(HfpError::InvalidOperation)?
            .servers
            .record_opened(slot, id)
    }

    /// Determine which local role owns `id`
    ///
    /// The Audio Gateway registry is consulted before the Hands-Free one.
    #[must_use]
    pub fn resolve(&self, id: HfreId) -> Option<IncomingConnection> {
        self.iter()
            .find(|entry| entry.servers.contains(id))
            .map(|entry| IncomingConnection {
                role: entry.config.role(),
                server_port: entry.config.server_port,
            })
    }

    /// Total number of open server ports across both roles
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.iter().map(|entry| entry.servers.open_count()).sum()
    }

    /// Disable both roles and drop their configuration
    pub fn clear(&mut self) {
        self.audio_gateway = None;
        self.hands_free = None;
    }
}
