//! Profile Commands
//!
//! Every call-control operation the manager exposes is expressed as a [`Command`]
//! before it is handed to the protocol engine. A command knows which local role
//! may issue it and which argument bounds it must satisfy, so the façade can reject
//! it synchronously without involving the engine.

use crate::{
    HfpError, Role,
    constants::{
        AUDIO_DATA_LENGTH_MAXIMUM, GAIN_MAXIMUM, NETWORK_OPERATOR_LENGTH_MAXIMUM,
        PHONE_NUMBER_LENGTH_MAXIMUM, PHONEBOOK_NAME_LENGTH_MAXIMUM,
    },
};

/// State of an incoming call as exchanged with `+BTRH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CallState {
    /// Put the incoming call on hold
    Hold,
    /// Accept the held incoming call
    Accept,
    /// Reject the held incoming call
    Reject,
    /// No incoming call is held
    None,
}

/// Final result code of an Audio Gateway response
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ExtendedResult {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// `NO CARRIER`
    NoCarrier,
    /// `BUSY`
    Busy,
    /// `NO ANSWER`
    NoAnswer,
    /// `DELAYED`
    Delayed,
    /// `BLACKLISTED`
    Blacklisted,
    /// `+CME ERROR` carrying a result value
    ResultCode,
}

/// Three-way calling action requested with `AT+CHLD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CallHoldMultipartyHandling {
    /// Release all held calls or reject the waiting call
    ReleaseAllHeldCalls,
    /// Release active calls and accept the held or waiting call
    ReleaseAllActiveCallsAcceptWaitingCall,
    /// Hold active calls and accept the held or waiting call
    PlaceAllActiveCallsOnHoldAcceptOther,
    /// Add a held call to the conversation
    AddHeldCallToConversation,
    /// Connect the two calls and disconnect the subscriber
    ConnectTwoCallsAndDisconnect,
    /// Release the call with the given index
    ReleaseSpecifiedCallIndex,
    /// Private consultation with the call with the given index
    PrivateConsultationMode,
}

/// Status of a call in the current calls list
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CallStatus {
    /// Call is active
    Active,
    /// Call is held
    Held,
    /// Outgoing call is dialing
    Dialing,
    /// Outgoing call is alerting the remote party
    Alerting,
    /// Incoming call is ringing
    Incoming,
    /// Incoming call is waiting
    Waiting,
}

/// Bearer mode of a call in the current calls list
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum CallMode {
    /// Voice call
    Voice,
    /// Data call
    Data,
    /// Fax call
    Fax,
}

/// One `+CLCC` entry sent by an Audio Gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCallEntry<'a> {
    /// Call index, starting at 1
    pub index: u32,
    /// `true` for a call originated by the Audio Gateway
    pub outgoing: bool,
    /// Call status
    pub status: CallStatus,
    /// Bearer mode
    pub mode: CallMode,
    /// `true` if the call is part of a conference
    pub multiparty: bool,
    /// Remote phone number
    pub phone_number: Option<&'a str>,
    /// Number format (`129` national, `145` international)
    pub number_format: u32,
    /// Phonebook entry matching the number
    pub phonebook_name: Option<&'a str>,
}

/// One `+CNUM` entry sent by an Audio Gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberNumber<'a> {
    /// Subscriber phone number
    pub phone_number: &'a str,
    /// Service the number relates to (voice, fax)
    pub service_type: u32,
    /// Number format (`129` national, `145` international)
    pub number_format: u32,
}

/// New value of one indicator in a `+CIEV` update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorUpdate<'a> {
    /// Indicator name
    pub description: &'a str,
    /// New indicator value
    pub value: u32,
}

/// A profile command addressed to one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AT+NREC=0`
    DisableRemoteEchoCancellation,
    /// `AT+BVRA` / `+BVRA`
    SetRemoteVoiceRecognitionActivation(bool),
    /// `+VGS`
    SetRemoteSpeakerGain(u8),
    /// `+VGM`
    SetRemoteMicrophoneGain(u8),
    /// `AT+BCS` / `+BCS`
    SendSelectCodec(u8),
    /// `AT+BAC`
    SendAvailableCodecList(&'a [u8]),
    /// Unsolicited response text not handled by the profile
    SendArbitraryResponse(&'a str),
    /// Set up the synchronous audio link
    SetupAudioConnection,
    /// Release the synchronous audio link
    ReleaseAudioConnection,
    /// Audio samples for the synchronous link
    SendAudioData(&'a [u8]),
    /// `AT+CIND?`
    QueryRemoteControlIndicatorStatus,
    /// `AT+CMER`
    EnableRemoteIndicatorEventNotification(bool),
    /// `AT+CHLD=?`
    QueryRemoteCallHoldingMultipartyServiceSupport,
    /// `AT+CHLD=<n>`
    SendCallHoldingMultipartySelection {
        /// Requested action
        handling: CallHoldMultipartyHandling,
        /// Call index for the indexed actions
        index: u32,
    },
    /// `AT+CCWA`
    EnableRemoteCallWaitingNotification(bool),
    /// `AT+CLIP`
    EnableRemoteCallLineIdentificationNotification(bool),
    /// `ATD<number>;`
    DialPhoneNumber(&'a str),
    /// `ATD><location>;`
    DialPhoneNumberFromMemory(u32),
    /// `AT+BLDN`
    RedialLastPhoneNumber,
    /// `ATA`
    AnswerIncomingCall,
    /// `AT+VTS`
    TransmitDtmfCode(char),
    /// `AT+BINP=1`
    VoiceTagRequest,
    /// `AT+CHUP`
    HangUpCall,
    /// `AT+CLCC`
    QueryRemoteCurrentCallsList,
    /// `AT+COPS=3,0`
    SetNetworkOperatorSelectionFormat,
    /// `AT+COPS?`
    QueryRemoteNetworkOperatorSelection,
    /// `AT+CMEE`
    EnableRemoteExtendedErrorResult(bool),
    /// `AT+CNUM`
    QuerySubscriberNumberInformation,
    /// `AT+BTRH?`
    QueryResponseHoldStatus,
    /// `AT+BTRH=<n>`
    SetIncomingCallState(CallState),
    /// Command text not handled by the profile
    SendArbitraryCommand(&'a str),
    /// `+CIEV` for several indicators
    UpdateCurrentControlIndicatorStatus(&'a [IndicatorUpdate<'a>]),
    /// `+CIEV` for one indicator looked up by name
    UpdateCurrentControlIndicatorStatusByName {
        /// Indicator name
        name: &'a str,
        /// New value
        value: u32,
    },
    /// `+CCWA`
    SendCallWaitingNotification(Option<&'a str>),
    /// `+CLIP`
    SendCallLineIdentificationNotification(&'a str),
    /// `RING`
    RingIndication,
    /// `+BSIR`
    EnableRemoteInBandRingToneSetting(bool),
    /// `+BINP`
    VoiceTagResponse(&'a str),
    /// One `+CLCC` line
    SendCurrentCallsListEntry(CurrentCallEntry<'a>),
    /// One `+CLCC` line carrying a phonebook name
    SendCurrentCallsListEntryWithPhonebookName(CurrentCallEntry<'a>),
    /// Final `OK` of a `+CLCC` listing
    SendCurrentCallsListEnd,
    /// `+COPS`
    SendNetworkOperatorSelection {
        /// Network registration mode
        mode: u8,
        /// Operator name, `None` when not registered
        operator: Option<&'a str>,
    },
    /// `+CME ERROR`
    SendExtendedErrorResult(u32),
    /// One `+CNUM` line
    SendSubscriberNumberInformation {
        /// The subscriber number
        entry: SubscriberNumber<'a>,
        /// `true` for the last line, which carries the final `OK`
        last: bool,
    },
    /// `+BTRH`
    SendIncomingCallState(CallState),
    /// Final result code
    SendTerminatingResponse {
        /// Result type
        result: ExtendedResult,
        /// Value for [`ExtendedResult::ResultCode`]
        value: u32,
    },
    /// Route unknown commands to the application
    EnableArbitraryCommandProcessing,
}

fn check_length(text: &str, min: usize, max: usize) -> Result<(), HfpError> {
    if (min..=max).contains(&text.len()) {
        Ok(())
    } else {
        Err(HfpError::InvalidParameter)
    }
}

fn check_optional_length(text: Option<&str>, max: usize) -> Result<(), HfpError> {
    text.map_or(Ok(()), |text| check_length(text, 0, max))
}

fn check_gain(gain: u8) -> Result<(), HfpError> {
    if gain <= GAIN_MAXIMUM {
        Ok(())
    } else {
        Err(HfpError::InvalidParameter)
    }
}

const fn is_dtmf_code(code: char) -> bool {
    matches!(code, '0'..='9' | '*' | '#' | 'A'..='D')
}

impl CurrentCallEntry<'_> {
    fn validate(&self) -> Result<(), HfpError> {
        if self.index == 0 {
            return Err(HfpError::InvalidParameter);
        }
        check_optional_length(self.phone_number, PHONE_NUMBER_LENGTH_MAXIMUM)?;
        check_optional_length(self.phonebook_name, PHONEBOOK_NAME_LENGTH_MAXIMUM)
    }
}

impl Command<'_> {
    /// Local role allowed to issue the command, `None` for either role
    #[must_use]
    pub const fn required_role(&self) -> Option<Role> {
        match self {
            Self::DisableRemoteEchoCancellation
            | Self::SetRemoteVoiceRecognitionActivation(_)
            | Self::SetRemoteSpeakerGain(_)
            | Self::SetRemoteMicrophoneGain(_)
            | Self::SendSelectCodec(_)
            | Self::SendAvailableCodecList(_)
            | Self::SendArbitraryResponse(_)
            | Self::SetupAudioConnection
            | Self::ReleaseAudioConnection
            | Self::SendAudioData(_) => None,

            Self::QueryRemoteControlIndicatorStatus
            | Self::EnableRemoteIndicatorEventNotification(_)
            | Self::QueryRemoteCallHoldingMultipartyServiceSupport
            | Self::SendCallHoldingMultipartySelection { .. }
            | Self::EnableRemoteCallWaitingNotification(_)
            | Self::EnableRemoteCallLineIdentificationNotification(_)
            | Self::DialPhoneNumber(_)
            | Self::DialPhoneNumberFromMemory(_)
            | Self::RedialLastPhoneNumber
            | Self::AnswerIncomingCall
            | Self::TransmitDtmfCode(_)
            | Self::VoiceTagRequest
            | Self::HangUpCall
            | Self::QueryRemoteCurrentCallsList
            | Self::SetNetworkOperatorSelectionFormat
            | Self::QueryRemoteNetworkOperatorSelection
            | Self::EnableRemoteExtendedErrorResult(_)
            | Self::QuerySubscriberNumberInformation
            | Self::QueryResponseHoldStatus
            | Self::SetIncomingCallState(_)
            | Self::SendArbitraryCommand(_) => Some(Role::HandsFree),

            Self::UpdateCurrentControlIndicatorStatus(_)
            | Self::UpdateCurrentControlIndicatorStatusByName { .. }
            | Self::SendCallWaitingNotification(_)
            | Self::SendCallLineIdentificationNotification(_)
            | Self::RingIndication
            | Self::EnableRemoteInBandRingToneSetting(_)
            | Self::VoiceTagResponse(_)
            | Self::SendCurrentCallsListEntry(_)
            | Self::SendCurrentCallsListEntryWithPhonebookName(_)
            | Self::SendCurrentCallsListEnd
            | Self::SendNetworkOperatorSelection { .. }
            | Self::SendExtendedErrorResult(_)
            | Self::SendSubscriberNumberInformation { .. }
            | Self::SendIncomingCallState(_)
            | Self::SendTerminatingResponse { .. }
            | Self::EnableArbitraryCommandProcessing => Some(Role::AudioGateway),
        }
    }

    /// Check the command's arguments against the protocol bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an out-of-range value or a string outside
    /// its length bounds.
    pub fn validate(&self) -> Result<(), HfpError> {
        match *self {
            Self::SetRemoteSpeakerGain(gain) | Self::SetRemoteMicrophoneGain(gain) => {
                check_gain(gain)
            }
            Self::SendSelectCodec(0) => Err(HfpError::InvalidParameter),
            Self::SendAvailableCodecList(codecs) if codecs.is_empty() => {
                Err(HfpError::InvalidParameter)
            }
            Self::SendAudioData(data) if !(1..=AUDIO_DATA_LENGTH_MAXIMUM).contains(&data.len()) => {
                Err(HfpError::InvalidParameter)
            }
            Self::SendArbitraryResponse(text) | Self::SendArbitraryCommand(text)
                if text.is_empty() =>
            {
                Err(HfpError::InvalidParameter)
            }
            // An empty number redials the last one
            Self::DialPhoneNumber(number) => check_length(number, 0, PHONE_NUMBER_LENGTH_MAXIMUM),
            Self::TransmitDtmfCode(code) if !is_dtmf_code(code) => Err(HfpError::InvalidParameter),
            Self::UpdateCurrentControlIndicatorStatus(updates) => {
                if updates.is_empty() || updates.iter().any(|u| u.description.is_empty()) {
                    Err(HfpError::InvalidParameter)
                } else {
                    Ok(())
                }
            }
            Self::UpdateCurrentControlIndicatorStatusByName { name, .. } if name.is_empty() => {
                Err(HfpError::InvalidParameter)
            }
            Self::SendCallWaitingNotification(number) => {
                check_optional_length(number, PHONE_NUMBER_LENGTH_MAXIMUM)
            }
            Self::SendCallLineIdentificationNotification(number) | Self::VoiceTagResponse(number) => {
                check_length(number, 1, PHONE_NUMBER_LENGTH_MAXIMUM)
            }
            Self::SendCurrentCallsListEntry(entry) => entry.validate(),
            Self::SendCurrentCallsListEntryWithPhonebookName(entry) => {
                if entry.phonebook_name.is_none() {
                    return Err(HfpError::InvalidParameter);
                }
                entry.validate()
            }
            Self::SendNetworkOperatorSelection { operator, .. } => {
                check_optional_length(operator, NETWORK_OPERATOR_LENGTH_MAXIMUM)
            }
            Self::SendSubscriberNumberInformation { entry, .. } => {
                check_length(entry.phone_number, 1, PHONE_NUMBER_LENGTH_MAXIMUM)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        phone_number: Option<&'static str>,
        phonebook_name: Option<&'static str>,
    ) -> CurrentCallEntry<'static> {
        CurrentCallEntry {
            index: 1,
            outgoing: false,
            status: CallStatus::Active,
            mode: CallMode::Voice,
            multiparty: false,
            phone_number,
            number_format: 129,
            phonebook_name,
        }
    }

    #[test]
    fn test_required_roles() {
        assert_eq!(Command::SetupAudioConnection.required_role(), None);
        assert_eq!(
            Command::DialPhoneNumber("123").required_role(),
            Some(Role::HandsFree)
        );
        assert_eq!(Command::RingIndication.required_role(), Some(Role::AudioGateway));
        assert_eq!(
            Command::SendCurrentCallsListEnd.required_role(),
            Some(Role::AudioGateway)
        );
    }

    #[test]
    fn test_gain_bounds() {
        assert!(Command::SetRemoteSpeakerGain(0).validate().is_ok());
        assert!(Command::SetRemoteSpeakerGain(15).validate().is_ok());
        assert_eq!(
            Command::SetRemoteMicrophoneGain(16).validate(),
            Err(HfpError::InvalidParameter)
        );
    }

    #[test]
    fn test_phone_number_bounds() {
        let max = "1".repeat(PHONE_NUMBER_LENGTH_MAXIMUM);
        let too_long = "1".repeat(PHONE_NUMBER_LENGTH_MAXIMUM + 1);

        assert!(Command::DialPhoneNumber(&max).validate().is_ok());
        assert_eq!(
            Command::DialPhoneNumber(&too_long).validate(),
            Err(HfpError::InvalidParameter)
        );
        assert!(Command::DialPhoneNumber("").validate().is_ok());
        assert_eq!(
            Command::VoiceTagResponse("").validate(),
            Err(HfpError::InvalidParameter)
        );
        assert!(Command::SendCallWaitingNotification(None).validate().is_ok());
        assert_eq!(
            Command::SendCallWaitingNotification(Some(&too_long)).validate(),
            Err(HfpError::InvalidParameter)
        );
    }

    #[test]
    fn test_dtmf_codes() {
        for code in ['0', '9', '*', '#', 'A', 'D'] {
            assert!(Command::TransmitDtmfCode(code).validate().is_ok());
        }
        for code in ['E', 'a', ' ', '+'] {
            assert_eq!(
                Command::TransmitDtmfCode(code).validate(),
                Err(HfpError::InvalidParameter)
            );
        }
    }

    #[test]
    fn test_audio_data_bounds() {
        let max = [0u8; AUDIO_DATA_LENGTH_MAXIMUM];
        let too_long = [0u8; AUDIO_DATA_LENGTH_MAXIMUM + 1];

        assert!(Command::SendAudioData(&max).validate().is_ok());
        assert!(Command::SendAudioData(&[]).validate().is_err());
        assert!(Command::SendAudioData(&too_long).validate().is_err());
    }

    #[test]
    fn test_network_operator_bounds() {
        assert!(
            Command::SendNetworkOperatorSelection {
                mode: 0,
                operator: Some("Operator")
            }
            .validate()
            .is_ok()
        );
        assert!(
            Command::SendNetworkOperatorSelection {
                mode: 0,
                operator: Some("An Operator Name Too Long")
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_empty_lists_and_strings() {
        assert!(Command::SendAvailableCodecList(&[]).validate().is_err());
        assert!(Command::SendAvailableCodecList(&[1, 2]).validate().is_ok());
        assert!(Command::SendArbitraryCommand("").validate().is_err());
        assert!(Command::SendArbitraryResponse("+XAPL").validate().is_ok());
        assert!(Command::UpdateCurrentControlIndicatorStatus(&[]).validate().is_err());
        assert!(Command::SendSelectCodec(0).validate().is_err());
    }

    #[test]
    fn test_current_call_entry_validation() {
        assert!(Command::SendCurrentCallsListEntry(call(Some("n"), None)).validate().is_ok());
        assert!(
            Command::SendCurrentCallsListEntryWithPhonebookName(call(Some("n"), Some("p")))
                .validate()
                .is_ok()
        );
        assert!(
            Command::SendCurrentCallsListEntryWithPhonebookName(call(None, None))
                .validate()
                .is_err()
        );

        let unindexed = CurrentCallEntry {
            index: 0,
            ..call(None, None)
        };
        assert!(Command::SendCurrentCallsListEntry(unindexed).validate().is_err());
    }
}
