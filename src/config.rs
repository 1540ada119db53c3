//! Role Configuration
//!
//! A [`RoleConfig`] is captured once per role when the manager is initialized and
//! is read back on every stack power-up to open that role's server ports and to
//! describe the role in its SDP record.

use crate::{
    HfpError, Role,
    constants::{
        CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM, MAX_ADDITIONAL_INDICATORS,
        MAX_SERVERS_PER_ROLE, MAX_SERVICE_NAME_LENGTH, SPP_PORT_NUMBER_MAXIMUM,
        SPP_PORT_NUMBER_MINIMUM,
    },
};
use heapless::{String, Vec};

/// An additional indicator the local endpoint announces to its peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorEntry {
    /// Indicator name as carried in `+CIND`
    pub description: String<CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM>,
    /// Lowest value of the indicator range
    pub range_start: u32,
    /// Highest value of the indicator range
    pub range_end: u32,
}

/// Configuration of one local profile role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    role: Role,
    /// Human readable service name published in the SDP record
    pub service_name: String<MAX_SERVICE_NAME_LENGTH>,
    /// Local RFCOMM server channel
    pub server_port: u8,
    /// Flags applied to incoming connections (authorization, authentication, encryption)
    pub incoming_connection_flags: u32,
    /// Supported features bit mask
    pub supported_features: u32,
    /// Call hold and multiparty support mask (Audio Gateway only)
    pub call_holding_support: u32,
    /// Network type published in the Audio Gateway SDP record
    pub network_type: u8,
    /// Additional indicators beyond the mandatory set
    pub additional_indicators: Vec<IndicatorEntry, MAX_ADDITIONAL_INDICATORS>,
    /// Number of server ports opened for this role at power-up
    pub max_servers: usize,
}

impl RoleConfig {
    /// Audio Gateway configuration listening on `server_port`
    #[must_use]
    pub fn audio_gateway(server_port: u8, max_servers: usize) -> Self {
        Self::new(Role::AudioGateway, server_port, max_servers)
    }

    /// Hands-Free configuration listening on `server_port`
    #[must_use]
    pub fn hands_free(server_port: u8, max_servers: usize) -> Self {
        Self::new(Role::HandsFree, server_port, max_servers)
    }

    fn new(role: Role, server_port: u8, max_servers: usize) -> Self {
        let mut service_name = String::new();
        service_name.push_str(role.name()).ok();
        Self {
            role,
            service_name,
            server_port,
            incoming_connection_flags: 0,
            supported_features: 0,
            call_holding_support: 0,
            network_type: 0,
            additional_indicators: Vec::new(),
            max_servers,
        }
    }

    /// Role this configuration describes
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Set the service name, truncated to [`MAX_SERVICE_NAME_LENGTH`] bytes
    #[must_use]
    pub fn with_service_name(mut self, name: &str) -> Self {
        self.service_name.clear();
        self.service_name
            .push_str(floor_char_boundary(name, MAX_SERVICE_NAME_LENGTH))
            .ok();
        self
    }

    /// Set the supported features mask
    #[must_use]
    pub fn with_supported_features(mut self, features: u32) -> Self {
        self.supported_features = features;
        self
    }

    /// Set the call holding support mask
    #[must_use]
    pub fn with_call_holding_support(mut self, mask: u32) -> Self {
        self.call_holding_support = mask;
        self
    }

    /// Set the network type advertised by an Audio Gateway
    #[must_use]
    pub fn with_network_type(mut self, network_type: u8) -> Self {
        self.network_type = network_type;
        self
    }

    /// Set the incoming connection flags
    #[must_use]
    pub fn with_incoming_connection_flags(mut self, flags: u32) -> Self {
        self.incoming_connection_flags = flags;
        self
    }

    /// Append an additional indicator
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the description is empty or longer than
    /// [`CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM`], or if the range is inverted.
    /// Returns `OutOfMemory` if the indicator table is full.
    pub fn with_indicator(
        mut self,
        description: &str,
        range_start: u32,
        range_end: u32,
    ) -> Result<Self, HfpError> {
        if description.is_empty() || range_start > range_end {
            return Err(HfpError::InvalidParameter);
        }
        let mut name = String::new();
        name.push_str(description)
            .map_err(|()| HfpError::InvalidParameter)?;
        self.additional_indicators
            .push(IndicatorEntry {
                description: name,
                range_start,
                range_end,
            })
            .map_err(|_| HfpError::OutOfMemory)?;
        Ok(self)
    }

    /// Check the configuration can be used to bring the role up
    ///
    /// # Errors
    ///
    /// Returns `InvalidInitializationData` for a server port outside the RFCOMM
    /// channel range or a zero server count, and `OutOfMemory` if more servers
    /// are requested than a role can track.
    pub fn validate(&self) -> Result<(), HfpError> {
        if !(SPP_PORT_NUMBER_MINIMUM..=SPP_PORT_NUMBER_MAXIMUM).contains(&self.server_port) {
            return Err(HfpError::InvalidInitializationData);
        }
        if self.max_servers == 0 {
            return Err(HfpError::InvalidInitializationData);
        }
        if self.max_servers > MAX_SERVERS_PER_ROLE {
            return Err(HfpError::OutOfMemory);
        }
        Ok(())
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character
pub(crate) fn floor_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
