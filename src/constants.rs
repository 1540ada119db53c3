//! `BondyBird` HFP Constants
//!
//! This module contains the constants used throughout the Hands-Free manager.
//! They define capacity limits of the fixed-size tables, protocol bounds for
//! strings carried by commands and events, and the Bluetooth assigned numbers
//! the manager publishes during stack power-up.

/// Lowest RFCOMM server channel a profile server may listen on
pub const SPP_PORT_NUMBER_MINIMUM: u8 = 1;

/// Highest RFCOMM server channel a profile server may listen on
pub const SPP_PORT_NUMBER_MAXIMUM: u8 = 30;

/// Maximum number of server slots a single role can be configured with
pub const MAX_SERVERS_PER_ROLE: usize = 4;

/// Maximum number of additional indicators a role may register
pub const MAX_ADDITIONAL_INDICATORS: usize = 8;

/// Maximum service name length in bytes
pub const MAX_SERVICE_NAME_LENGTH: usize = 48;

/// Maximum phone number length in bytes (not counting the terminator)
pub const PHONE_NUMBER_LENGTH_MAXIMUM: usize = 64;

/// Maximum network operator name length in bytes (not counting the terminator)
pub const NETWORK_OPERATOR_LENGTH_MAXIMUM: usize = 16;

/// Maximum control indicator description length in bytes
pub const CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM: usize = 20;

/// Maximum phonebook name length carried by a current-call list entry
pub const PHONEBOOK_NAME_LENGTH_MAXIMUM: usize = 64;

/// Maximum number of audio bytes a single audio data command may carry
pub const AUDIO_DATA_LENGTH_MAXIMUM: usize = 255;

/// Maximum speaker/microphone gain value defined by HFP
pub const GAIN_MAXIMUM: u8 = 15;

/// Maximum number of codecs reported by the local codec query
pub const MAX_LOCAL_CODECS: usize = 16;

/// HCI coding format identifier of the modified SBC (mSBC) codec
pub const CODING_FORMAT_MSBC: u8 = 0x05;

/// Audio Gateway supported-features bit: codec negotiation
pub const AG_CODEC_NEGOTIATION_SUPPORTED_BIT: u32 = 1 << 9;

/// Hands-Free supported-features bit: codec negotiation
pub const HF_CODEC_NEGOTIATION_SUPPORTED_BIT: u32 = 1 << 7;

/// Hands-Free service class UUID (16-bit)
pub const HANDS_FREE_UUID_16: u16 = 0x111E;

/// Hands-Free Audio Gateway service class UUID (16-bit)
pub const AUDIO_GATEWAY_UUID_16: u16 = 0x111F;

/// EIR data type: incomplete list of 16-bit service class UUIDs
pub const EIR_TYPE_16_BIT_SERVICE_UUID_PARTIAL: u8 = 0x02;

/// Size of a 16-bit UUID in bytes
pub const UUID_16_SIZE: usize = 2;

/// Size of the EIR block published at power-up (length + type + two UUIDs)
pub const EIR_DATA_CAPACITY: usize = 2 + UUID_16_SIZE * 2;

/// Depth of the default notification channel
pub const MAX_PENDING_NOTIFICATIONS: usize = 8;
