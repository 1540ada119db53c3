//! Profile Events
//!
//! The protocol engine reports everything that happens on a connection as a
//! [`ProfileEvent`]: a tag, the fixed-size header bytes of that event, and for a
//! handful of tags a reference to a trailing variable-length payload (a phone
//! number, an indicator description, audio samples, ...).
//!
//! Events only borrow engine memory for the duration of the callback. The
//! [`notification`](crate::notification) module turns them into owned buffers.

use crate::constants::CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM;

/// How the trailing payload of an event is sized and copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PayloadShape {
    /// Header only, no trailing payload
    Fixed,
    /// Text truncated to `capacity` bytes, stored in a `capacity + 1` byte region
    BoundedText {
        /// Longest text kept, excluding the terminator
        capacity: usize,
    },
    /// Text stored at its exact length plus a NUL terminator
    ExactText,
    /// Raw bytes stored at exactly the count the event declares
    Blob,
}

/// Event tags reported by the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, defmt::Format)]
#[repr(u8)]
pub enum EventType {
    /// A remote device connected to a local server port
    OpenPortIndication = 0,
    /// An outgoing connection attempt completed
    OpenPortConfirmation,
    /// A remote device asks to connect to a manual-accept server
    OpenPortRequestIndication,
    /// The service level connection is established
    OpenServiceLevelConnectionIndication,
    /// The connection was closed
    ClosePortIndication,
    /// Indicator status received from the Audio Gateway
    ControlIndicatorStatusIndication,
    /// Response to an indicator status query
    ControlIndicatorStatusConfirmation,
    /// Call hold and multiparty support of the Audio Gateway
    CallHoldMultipartySupportConfirmation,
    /// Call hold and multiparty action requested by the Hands-Free unit
    CallHoldMultipartySelectionIndication,
    /// Call waiting notification toggled by the Hands-Free unit
    CallWaitingNotificationActivationIndication,
    /// A call is waiting
    CallWaitingNotificationIndication,
    /// Calling line identification toggled by the Hands-Free unit
    CallLineIdentificationNotificationActivationIndication,
    /// Calling line identification of an incoming call
    CallLineIdentificationNotificationIndication,
    /// Echo cancellation and noise reduction disabled by the Hands-Free unit
    DisableSoundEnhancementIndication,
    /// The Hands-Free unit dials a number
    DialPhoneNumberIndication,
    /// The Hands-Free unit dials a memory location
    DialPhoneNumberFromMemoryIndication,
    /// The Hands-Free unit redials the last number
    RedialLastPhoneNumberIndication,
    /// The Audio Gateway rings
    RingIndication,
    /// The Hands-Free unit sends a DTMF tone
    GenerateDtmfToneIndication,
    /// The Hands-Free unit answers the call
    AnswerCallIndication,
    /// In-band ring tone setting changed
    InBandRingToneSettingIndication,
    /// Voice recognition state changed
    VoiceRecognitionNotificationIndication,
    /// Remote speaker gain changed
    SpeakerGainIndication,
    /// Remote microphone gain changed
    MicrophoneGainIndication,
    /// The Hands-Free unit asks for a voice tag number
    VoiceTagRequestIndication,
    /// Voice tag number returned by the Audio Gateway
    VoiceTagRequestConfirmation,
    /// The Hands-Free unit hangs up
    HangUpIndication,
    /// Synchronous audio link established
    AudioConnectionIndication,
    /// Synchronous audio link released
    AudioDisconnectionIndication,
    /// Audio samples received on the synchronous link
    AudioDataIndication,
    /// The Hands-Free unit queries the current calls
    CurrentCallsListIndication,
    /// One current call reported by the Audio Gateway
    CurrentCallsListConfirmation,
    /// Network operator format set by the Hands-Free unit
    NetworkOperatorSelectionFormatIndication,
    /// The Hands-Free unit queries the network operator
    NetworkOperatorSelectionIndication,
    /// Network operator reported by the Audio Gateway
    NetworkOperatorSelectionConfirmation,
    /// Extended error results toggled by the Hands-Free unit
    ExtendedErrorResultActivationIndication,
    /// The Hands-Free unit queries the subscriber number
    SubscriberNumberInformationIndication,
    /// Subscriber number reported by the Audio Gateway
    SubscriberNumberInformationConfirmation,
    /// The Hands-Free unit queries the response and hold state
    ResponseHoldStatusIndication,
    /// Response and hold state reported by the Audio Gateway
    ResponseHoldStatusConfirmation,
    /// The Hands-Free unit sets the incoming call state
    IncomingCallStateIndication,
    /// Incoming call state reported by the Audio Gateway
    IncomingCallStateConfirmation,
    /// Final result of a previously sent command
    CommandResult,
    /// Unknown command text received by the Audio Gateway
    ArbitraryCommandIndication,
    /// Unknown response text received by the Hands-Free unit
    ArbitraryResponseIndication,
    /// The Audio Gateway selects a codec
    CodecSelectRequestIndication,
    /// The Hands-Free unit confirmed the selected codec
    CodecSelectConfirmation,
    /// Codec connection setup requested
    CodecConnectionSetupIndication,
    /// Codecs available on the Hands-Free unit
    AvailableCodecListIndication,
}

impl EventType {
    /// Every tag, indexed by its discriminant
    pub const ALL: [EventType; 49] = [
        Self::OpenPortIndication,
        Self::OpenPortConfirmation,
        Self::OpenPortRequestIndication,
        Self::OpenServiceLevelConnectionIndication,
        Self::ClosePortIndication,
        Self::ControlIndicatorStatusIndication,
        Self::ControlIndicatorStatusConfirmation,
        Self::CallHoldMultipartySupportConfirmation,
        Self::CallHoldMultipartySelectionIndication,
        Self::CallWaitingNotificationActivationIndication,
        Self::CallWaitingNotificationIndication,
        Self::CallLineIdentificationNotificationActivationIndication,
        Self::CallLineIdentificationNotificationIndication,
        Self::DisableSoundEnhancementIndication,
        Self::DialPhoneNumberIndication,
        Self::DialPhoneNumberFromMemoryIndication,
        Self::RedialLastPhoneNumberIndication,
        Self::RingIndication,
        Self::GenerateDtmfToneIndication,
        Self::AnswerCallIndication,
        Self::InBandRingToneSettingIndication,
        Self::VoiceRecognitionNotificationIndication,
        Self::SpeakerGainIndication,
        Self::MicrophoneGainIndication,
        Self::VoiceTagRequestIndication,
        Self::VoiceTagRequestConfirmation,
        Self::HangUpIndication,
        Self::AudioConnectionIndication,
        Self::AudioDisconnectionIndication,
        Self::AudioDataIndication,
        Self::CurrentCallsListIndication,
        Self::CurrentCallsListConfirmation,
        Self::NetworkOperatorSelectionFormatIndication,
        Self::NetworkOperatorSelectionIndication,
        Self::NetworkOperatorSelectionConfirmation,
        Self::ExtendedErrorResultActivationIndication,
        Self::SubscriberNumberInformationIndication,
        Self::SubscriberNumberInformationConfirmation,
        Self::ResponseHoldStatusIndication,
        Self::ResponseHoldStatusConfirmation,
        Self::IncomingCallStateIndication,
        Self::IncomingCallStateConfirmation,
        Self::CommandResult,
        Self::ArbitraryCommandIndication,
        Self::ArbitraryResponseIndication,
        Self::CodecSelectRequestIndication,
        Self::CodecSelectConfirmation,
        Self::CodecConnectionSetupIndication,
        Self::AvailableCodecListIndication,
    ];

    /// Wire tag of the event
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Payload shape class of the event
    ///
    /// Several tags share one shape because their headers are laid out alike.
    #[must_use]
    pub const fn shape(self) -> PayloadShape {
        match self {
            Self::ControlIndicatorStatusIndication | Self::ControlIndicatorStatusConfirmation => {
                PayloadShape::BoundedText {
                    capacity: CONTROL_INDICATOR_DESCRIPTION_LENGTH_MAXIMUM,
                }
            }
            Self::CallWaitingNotificationIndication
            | Self::CallLineIdentificationNotificationIndication
            | Self::DialPhoneNumberIndication
            | Self::VoiceTagRequestConfirmation
            | Self::CurrentCallsListConfirmation
            | Self::SubscriberNumberInformationConfirmation
            | Self::NetworkOperatorSelectionConfirmation
            | Self::ArbitraryCommandIndication
            | Self::ArbitraryResponseIndication => PayloadShape::ExactText,
            Self::AudioDataIndication | Self::AvailableCodecListIndication => PayloadShape::Blob,
            _ => PayloadShape::Fixed,
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(usize::from(tag)).copied().ok_or(tag)
    }
}

/// An event delivered by the protocol engine, borrowed for the callback's duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileEvent<'a> {
    /// Raw event tag
    pub tag: u8,
    /// Fixed-size header; its length is the declared event size
    pub header: &'a [u8],
    /// Trailing payload referenced by the header, `None` for a null reference
    pub payload: Option<&'a [u8]>,
}

impl<'a> ProfileEvent<'a> {
    /// Event without a trailing payload
    #[must_use]
    pub const fn new(event_type: EventType, header: &'a [u8]) -> Self {
        Self {
            tag: event_type.tag(),
            header,
            payload: None,
        }
    }

    /// Attach a text payload
    #[must_use]
    pub const fn with_text(mut self, text: &'a str) -> Self {
        self.payload = Some(text.as_bytes());
        self
    }

    /// Attach a raw payload; its length is the event's count field
    #[must_use]
    pub const fn with_bytes(mut self, bytes: &'a [u8]) -> Self {
        self.payload = Some(bytes);
        self
    }

    /// Decoded tag, `None` for tags this manager does not forward
    #[must_use]
    pub fn event_type(&self) -> Option<EventType> {
        EventType::try_from(self.tag).ok()
    }

    /// Declared size of the fixed header in bytes
    #[must_use]
    pub const fn declared_size(&self) -> usize {
        self.header.len()
    }
}
