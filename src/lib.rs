#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::too_many_lines)]

extern crate alloc;

mod address;
pub mod api;
pub mod command;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod dispatch;
pub mod engine;
pub mod event;
pub mod manager;
pub mod notification;
pub mod registry;

#[cfg(test)]
pub(crate) mod mock;

use crate::constants::MAX_PENDING_NOTIFICATIONS;
use core::num::NonZeroU32;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

pub use address::BluetoothAddress;
pub use command::{
    CallHoldMultipartyHandling, CallMode, CallState, CallStatus, CurrentCallEntry, ExtendedResult,
    IndicatorUpdate, SubscriberNumber,
};
pub use config::{IndicatorEntry, RoleConfig};
pub use discovery::{DiscoveryService, SdpRecordHandle};
pub use engine::{Command, EngineError, ProtocolEngine, ServerMode};
pub use event::{EventType, PayloadShape, ProfileEvent};
pub use manager::HandsFreeManager;
pub use notification::{ChannelNotifier, DropReason, NotificationBuffer, NotificationSink};
pub use registry::IncomingConnection;

/// Identifier the protocol engine assigns to an open server or connection port.
///
/// Zero is reserved by the engine for "no port", so a live identifier is never zero.
pub type HfreId = NonZeroU32;

/// Identifier of the running Bluetooth stack; `0` means the stack is powered down.
pub type StackId = u32;

/// Default notification channel for firmware that delivers profile events through a
/// single static queue.
///
/// Pair it with [`ChannelNotifier`] on the producer side and
/// [`dispatch::dispatch_notifications`] on the consumer side.
pub static HFP_NOTIFICATION_CHANNEL: Channel<
    CriticalSectionRawMutex,
    NotificationBuffer,
    MAX_PENDING_NOTIFICATIONS,
> = Channel::new();

/// The two Hands-Free Profile roles a local endpoint can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, defmt::Format)]
pub enum Role {
    /// Phone/network side of the profile
    AudioGateway,
    /// Headset/accessory side of the profile
    HandsFree,
}

impl Role {
    /// Both roles in bring-up order
    pub const ALL: [Role; 2] = [Role::AudioGateway, Role::HandsFree];

    /// 16-bit service class UUID advertised for this role
    #[must_use]
    pub const fn service_uuid(self) -> u16 {
        match self {
            Self::AudioGateway => constants::AUDIO_GATEWAY_UUID_16,
            Self::HandsFree => constants::HANDS_FREE_UUID_16,
        }
    }

    /// Supported-features bit that announces codec negotiation for this role
    #[must_use]
    pub const fn codec_negotiation_bit(self) -> u32 {
        match self {
            Self::AudioGateway => constants::AG_CODEC_NEGOTIATION_SUPPORTED_BIT,
            Self::HandsFree => constants::HF_CODEC_NEGOTIATION_SUPPORTED_BIT,
        }
    }

    /// Human readable role name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AudioGateway => "Audio Gateway",
            Self::HandsFree => "Hands Free",
        }
    }
}

/// Hands-Free manager errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum HfpError {
    /// The manager has not been initialized
    NotInitialized,
    /// Neither role configuration passed validation during initialization
    InvalidInitializationData,
    /// Invalid parameter provided (zero id, bad string length, bad enum value)
    InvalidParameter,
    /// The role required by the operation is not enabled, or the engine rejected it
    InvalidOperation,
    /// The identifier does not belong to any local server
    NotConnected,
    /// A fixed-capacity table or heap allocation could not hold the request
    OutOfMemory,
    /// The engine failed to open an outgoing port to the remote device
    UnableToConnectToDevice,
    /// The engine failed to close the port
    UnableToDisconnectDevice,
}
