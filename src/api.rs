//! Hands-Free Command API
//!
//! Call-control operations on established connections. Every operation checks the
//! same preconditions in the same order before anything reaches the engine:
//!
//! 1. the manager is initialized (`NotInitialized`),
//! 2. the role the command belongs to is enabled (`InvalidOperation`),
//! 3. the connection identifier is non-zero (`InvalidParameter`),
//! 4. the arguments are within protocol bounds (`InvalidParameter`).
//!
//! The command is then forwarded; an engine failure becomes `InvalidOperation`.
//! Nothing here waits for the remote side: results arrive later as profile events.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bondybird_hfp::{HandsFreeManager, RoleConfig};
//!
//! let mut hfp = HandsFreeManager::new(engine, discovery, notifier);
//! hfp.initialize(None, Some(RoleConfig::hands_free(7, 1)))?;
//! hfp.set_stack_id(stack);
//!
//! // once a service level connection is up on `id`
//! hfp.dial_phone_number(id, "+15551234567")?;
//! hfp.set_remote_speaker_gain(id, 9)?;
//! ```

use crate::{
    BluetoothAddress, HfpError, HfreId, Role,
    command::{
        CallHoldMultipartyHandling, CallState, Command, CurrentCallEntry, ExtendedResult,
        IndicatorUpdate, SubscriberNumber,
    },
    constants::{SPP_PORT_NUMBER_MAXIMUM, SPP_PORT_NUMBER_MINIMUM},
    discovery::DiscoveryService,
    engine::ProtocolEngine,
    manager::HandsFreeManager,
    notification::NotificationSink,
};

/// `+CLCC` line for `entry`, in the phonebook form when a name is known
fn calls_list_entry(entry: CurrentCallEntry<'_>) -> Command<'_> {
    if entry.phonebook_name.is_some() {
        Command::SendCurrentCallsListEntryWithPhonebookName(entry)
    } else {
        Command::SendCurrentCallsListEntry(entry)
    }
}

impl<E: ProtocolEngine, D: DiscoveryService, N: NotificationSink> HandsFreeManager<E, D, N> {
    fn check_preconditions(&self, id: u32, role: Option<Role>) -> Result<HfreId, HfpError> {
        if !self.is_initialized() {
            return Err(HfpError::NotInitialized);
        }
        if let Some(role) = role {
            if !self.roles.is_enabled(role) {
                defmt::debug!("[HFRM] command requires {}, which is not enabled", role);
                return Err(HfpError::InvalidOperation);
            }
        }
        HfreId::new(id).ok_or(HfpError::InvalidParameter)
    }

    fn forward(&mut self, id: HfreId, command: &Command<'_>) -> Result<(), HfpError> {
        self.engine
            .send_command(self.stack, id, command)
            .map_err(|e| {
                defmt::debug!("[HFRM] command on {} failed: {}", id.get(), e);
                HfpError::InvalidOperation
            })
    }

    /// Check and forward a single command
    fn send(&mut self, id: u32, command: Command<'_>) -> Result<(), HfpError> {
        let id = self.check_preconditions(id, command.required_role())?;
        command.validate().inspect_err(|e| {
            defmt::debug!("[HFRM] command on {} rejected: {}", id.get(), e);
        })?;
        self.forward(id, &command)
    }

    // Connection management

    /// Accept or reject an incoming connection request on a manual-accept server
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if `id` is not one of the local servers, and
    /// `InvalidOperation` if the engine rejected the response.
    pub fn connection_request_response(&mut self, id: u32, accept: bool) -> Result<(), HfpError> {
        let id = self.check_preconditions(id, None)?;
        let incoming = self.roles.resolve(id).ok_or(HfpError::NotConnected)?;
        defmt::debug!(
            "[HFRM] {} connection request on {}: accept={}",
            incoming.role,
            id.get(),
            accept
        );
        self.engine
            .open_port_request_response(self.stack, id, accept)
            .map_err(|_| HfpError::InvalidOperation)
    }

    /// Open an outgoing connection to `remote_port` on `address` as `role`
    ///
    /// Returns the identifier of the new connection. Completion is reported by an
    /// open port confirmation event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `role` is not enabled, `InvalidParameter` for a
    /// null address or a port outside 1..=30, and `UnableToConnectToDevice` if the
    /// engine could not start the connection.
    pub fn connect_remote_device(
        &mut self,
        role: Role,
        address: BluetoothAddress,
        remote_port: u8,
    ) -> Result<HfreId, HfpError> {
        if !self.is_initialized() {
            return Err(HfpError::NotInitialized);
        }
        let entry = self.roles.get(role).ok_or(HfpError::InvalidOperation)?;
        if address.is_null()
            || !(SPP_PORT_NUMBER_MINIMUM..=SPP_PORT_NUMBER_MAXIMUM).contains(&remote_port)
        {
            return Err(HfpError::InvalidParameter);
        }

        let id = self
            .engine
            .open_remote_port(
                self.stack,
                role,
                address.into(),
                remote_port,
                &entry.config,
            )
            .map_err(|e| {
                defmt::warn!("[HFRM] {} connect to {} failed: {}", role, address, e);
                HfpError::UnableToConnectToDevice
            })?;
        defmt::info!(
            "[HFRM] {} connecting to {} port {}: {}",
            role,
            address,
            remote_port,
            id.get()
        );
        Ok(id)
    }

    /// Close a connection
    ///
    /// # Errors
    ///
    /// Returns `UnableToDisconnectDevice` if the engine could not close the port.
    pub fn disconnect_device(&mut self, id: u32) -> Result<(), HfpError> {
        let id = self.check_preconditions(id, None)?;
        self.engine.close_port(self.stack, id).map_err(|e| {
            defmt::warn!("[HFRM] disconnect of {} failed: {}", id.get(), e);
            HfpError::UnableToDisconnectDevice
        })
    }

    // Either role

    /// Ask the remote side to turn off echo cancellation and noise reduction
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or the engine rejects the command.
    pub fn disable_remote_echo_cancellation(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::DisableRemoteEchoCancellation)
    }

    /// Start or stop voice recognition
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or the engine rejects the command.
    pub fn set_remote_voice_recognition_activation(
        &mut self,
        id: u32,
        active: bool,
    ) -> Result<(), HfpError> {
        self.send(id, Command::SetRemoteVoiceRecognitionActivation(active))
    }

    /// Report or set the speaker gain
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a gain above 15.
    pub fn set_remote_speaker_gain(&mut self, id: u32, gain: u8) -> Result<(), HfpError> {
        self.send(id, Command::SetRemoteSpeakerGain(gain))
    }

    /// Report or set the microphone gain
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a gain above 15.
    pub fn set_remote_microphone_gain(&mut self, id: u32, gain: u8) -> Result<(), HfpError> {
        self.send(id, Command::SetRemoteMicrophoneGain(gain))
    }

    /// Select the codec for the next audio connection
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for codec id 0.
    pub fn send_select_codec(&mut self, id: u32, codec: u8) -> Result<(), HfpError> {
        self.send(id, Command::SendSelectCodec(codec))
    }

    /// Announce the locally available codecs
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty list.
    pub fn send_available_codec_list(&mut self, id: u32, codecs: &[u8]) -> Result<(), HfpError> {
        self.send(id, Command::SendAvailableCodecList(codecs))
    }

    /// Send response text the profile does not handle itself
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for empty text.
    pub fn send_arbitrary_response(&mut self, id: u32, response: &str) -> Result<(), HfpError> {
        self.send(id, Command::SendArbitraryResponse(response))
    }

    /// Set up the audio connection
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or the engine rejects the command.
    pub fn setup_audio_connection(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::SetupAudioConnection)
    }

    /// Release the audio connection
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or the engine rejects the command.
    pub fn release_audio_connection(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::ReleaseAudioConnection)
    }

    /// Send audio samples over the audio connection
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless the data is 1 to 255 bytes long.
    pub fn send_audio_data(&mut self, id: u32, data: &[u8]) -> Result<(), HfpError> {
        self.send(id, Command::SendAudioData(data))
    }

    // Hands-Free

    /// Query the Audio Gateway's indicator values
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_remote_control_indicator_status(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::QueryRemoteControlIndicatorStatus)
    }

    /// Turn indicator event reporting on or off
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn enable_remote_indicator_event_notification(
        &mut self,
        id: u32,
        enable: bool,
    ) -> Result<(), HfpError> {
        self.send(id, Command::EnableRemoteIndicatorEventNotification(enable))
    }

    /// Query the supported three-way calling actions
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_remote_call_holding_multiparty_service_support(
        &mut self,
        id: u32,
    ) -> Result<(), HfpError> {
        self.send(id, Command::QueryRemoteCallHoldingMultipartyServiceSupport)
    }

    /// Request a three-way calling action
    ///
    /// `index` is only used by the indexed actions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn send_call_holding_multiparty_selection(
        &mut self,
        id: u32,
        handling: CallHoldMultipartyHandling,
        index: u32,
    ) -> Result<(), HfpError> {
        self.send(
            id,
            Command::SendCallHoldingMultipartySelection { handling, index },
        )
    }

    /// Turn call waiting notification on or off
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn enable_remote_call_waiting_notification(
        &mut self,
        id: u32,
        enable: bool,
    ) -> Result<(), HfpError> {
        self.send(id, Command::EnableRemoteCallWaitingNotification(enable))
    }

    /// Turn calling line identification on or off
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn enable_remote_call_line_identification_notification(
        &mut self,
        id: u32,
        enable: bool,
    ) -> Result<(), HfpError> {
        self.send(
            id,
            Command::EnableRemoteCallLineIdentificationNotification(enable),
        )
    }

    /// Place a call to `number`; an empty number redials the last one
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a number longer than 64 bytes.
    pub fn dial_phone_number(&mut self, id: u32, number: &str) -> Result<(), HfpError> {
        self.send(id, Command::DialPhoneNumber(number))
    }

    /// Place a call to a stored number
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn dial_phone_number_from_memory(&mut self, id: u32, location: u32) -> Result<(), HfpError> {
        self.send(id, Command::DialPhoneNumberFromMemory(location))
    }

    /// Redial the last number
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn redial_last_phone_number(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::RedialLastPhoneNumber)
    }

    /// Answer the ringing call
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn answer_incoming_call(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::AnswerIncomingCall)
    }

    /// Send a DTMF tone
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless `code` is one of `0-9`, `*`, `#`, `A-D`.
    pub fn transmit_dtmf_code(&mut self, id: u32, code: char) -> Result<(), HfpError> {
        self.send(id, Command::TransmitDtmfCode(code))
    }

    /// Ask for a phone number to attach to a voice tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn voice_tag_request(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::VoiceTagRequest)
    }

    /// Hang up the active call or reject the incoming one
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn hang_up_call(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::HangUpCall)
    }

    /// Request the list of current calls
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_remote_current_calls_list(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::QueryRemoteCurrentCallsList)
    }

    /// Select long alphanumeric format for operator names
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn set_network_operator_selection_format(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::SetNetworkOperatorSelectionFormat)
    }

    /// Query the current network operator
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_remote_network_operator_selection(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::QueryRemoteNetworkOperatorSelection)
    }

    /// Turn extended error result codes on or off
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn enable_remote_extended_error_result(
        &mut self,
        id: u32,
        enable: bool,
    ) -> Result<(), HfpError> {
        self.send(id, Command::EnableRemoteExtendedErrorResult(enable))
    }

    /// Query the subscriber numbers
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_subscriber_number_information(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::QuerySubscriberNumberInformation)
    }

    /// Query the response and hold state
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn query_response_hold_status(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::QueryResponseHoldStatus)
    }

    /// Hold, accept or reject the incoming call
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Hands-Free role is not enabled.
    pub fn set_incoming_call_state(&mut self, id: u32, state: CallState) -> Result<(), HfpError> {
        self.send(id, Command::SetIncomingCallState(state))
    }

    /// Send command text the profile does not handle itself
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for empty text.
    pub fn send_arbitrary_command(&mut self, id: u32, command: &str) -> Result<(), HfpError> {
        self.send(id, Command::SendArbitraryCommand(command))
    }

    // Audio Gateway

    /// Report new values for several indicators
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty list or an unnamed indicator.
    pub fn update_current_control_indicator_status(
        &mut self,
        id: u32,
        updates: &[IndicatorUpdate<'_>],
    ) -> Result<(), HfpError> {
        self.send(id, Command::UpdateCurrentControlIndicatorStatus(updates))
    }

    /// Report a new value for one indicator, by name
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty name.
    pub fn update_current_control_indicator_status_by_name(
        &mut self,
        id: u32,
        name: &str,
        value: u32,
    ) -> Result<(), HfpError> {
        self.send(
            id,
            Command::UpdateCurrentControlIndicatorStatusByName { name, value },
        )
    }

    /// Announce a waiting call, optionally with the caller's number
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a number longer than 64 bytes.
    pub fn send_call_waiting_notification(
        &mut self,
        id: u32,
        number: Option<&str>,
    ) -> Result<(), HfpError> {
        self.send(id, Command::SendCallWaitingNotification(number))
    }

    /// Announce the calling line identity
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless the number is 1 to 64 bytes long.
    pub fn send_call_line_identification_notification(
        &mut self,
        id: u32,
        number: &str,
    ) -> Result<(), HfpError> {
        self.send(id, Command::SendCallLineIdentificationNotification(number))
    }

    /// Send a ring alert
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn ring_indication(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::RingIndication)
    }

    /// Turn the in-band ring tone on or off
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn enable_remote_in_band_ring_tone_setting(
        &mut self,
        id: u32,
        enable: bool,
    ) -> Result<(), HfpError> {
        self.send(id, Command::EnableRemoteInBandRingToneSetting(enable))
    }

    /// Answer a voice tag request with a phone number
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless the number is 1 to 64 bytes long.
    pub fn voice_tag_response(&mut self, id: u32, number: &str) -> Result<(), HfpError> {
        self.send(id, Command::VoiceTagResponse(number))
    }

    /// Send the list of current calls, followed by the final `OK`
    ///
    /// Entries carrying a phonebook name use the phonebook form of the response.
    /// All entries are checked before the first one is sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an invalid entry and `InvalidOperation` if the
    /// engine rejected any part of the listing.
    pub fn send_current_calls_list(
        &mut self,
        id: u32,
        entries: &[CurrentCallEntry<'_>],
    ) -> Result<(), HfpError> {
        let id = self.check_preconditions(id, Some(Role::AudioGateway))?;

        for entry in entries {
            calls_list_entry(*entry).validate()?;
        }

        for entry in entries {
            self.forward(id, &calls_list_entry(*entry))?;
        }
        self.forward(id, &Command::SendCurrentCallsListEnd)
    }

    /// Report the network operator
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an operator name longer than 16 bytes.
    pub fn send_network_operator_selection(
        &mut self,
        id: u32,
        mode: u8,
        operator: Option<&str>,
    ) -> Result<(), HfpError> {
        self.send(id, Command::SendNetworkOperatorSelection { mode, operator })
    }

    /// Send an extended error result code
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn send_extended_error_result(&mut self, id: u32, code: u32) -> Result<(), HfpError> {
        self.send(id, Command::SendExtendedErrorResult(code))
    }

    /// Send the subscriber numbers
    ///
    /// The last entry carries the final `OK`; an empty list sends only `OK`.
    /// Sending stops at the first entry the engine rejects.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an invalid number and `InvalidOperation` if the
    /// engine rejected an entry.
    pub fn send_subscriber_number_information(
        &mut self,
        id: u32,
        entries: &[SubscriberNumber<'_>],
    ) -> Result<(), HfpError> {
        let id = self.check_preconditions(id, Some(Role::AudioGateway))?;

        if entries.is_empty() {
            return self.forward(
                id,
                &Command::SendTerminatingResponse {
                    result: ExtendedResult::Ok,
                    value: 0,
                },
            );
        }

        let last = entries.len() - 1;
        for (index, entry) in entries.iter().enumerate() {
            let command = Command::SendSubscriberNumberInformation {
                entry: *entry,
                last: index == last,
            };
            command.validate()?;
            self.forward(id, &command)?;
        }
        Ok(())
    }

    /// Report the response and hold state
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn send_incoming_call_state(&mut self, id: u32, state: CallState) -> Result<(), HfpError> {
        self.send(id, Command::SendIncomingCallState(state))
    }

    /// Send a final result code
    ///
    /// `value` is only used with [`ExtendedResult::ResultCode`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn send_terminating_response(
        &mut self,
        id: u32,
        result: ExtendedResult,
        value: u32,
    ) -> Result<(), HfpError> {
        self.send(id, Command::SendTerminatingResponse { result, value })
    }

    /// Have commands the profile does not recognize delivered as events
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the Audio Gateway role is not enabled.
    pub fn enable_arbitrary_command_processing(&mut self, id: u32) -> Result<(), HfpError> {
        self.send(id, Command::EnableArbitraryCommandProcessing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::{CallMode, CallStatus},
        config::RoleConfig,
        mock::{EngineCall, MockDiscovery, MockEngine, RecordingSink},
    };
    use alloc::{string::String, vec::Vec};

    type TestManager = HandsFreeManager<MockEngine, MockDiscovery, RecordingSink>;

    fn manager(audio_gateway: bool, hands_free: bool) -> TestManager {
        let mut manager = HandsFreeManager::new(
            MockEngine::default(),
            MockDiscovery::default(),
            RecordingSink::default(),
        );
        manager
            .initialize(
                audio_gateway.then(|| RoleConfig::audio_gateway(3, 1)),
                hands_free.then(|| RoleConfig::hands_free(7, 1)),
            )
            .unwrap();
        manager.set_stack_id(1);
        manager
    }

    fn commands(manager: &TestManager) -> Vec<String> {
        manager.engine().commands()
    }

    fn call<'a>(index: u32, number: &'a str, name: Option<&'a str>) -> CurrentCallEntry<'a> {
        CurrentCallEntry {
            index,
            outgoing: true,
            status: CallStatus::Active,
            mode: CallMode::Voice,
            multiparty: false,
            phone_number: Some(number),
            number_format: 145,
            phonebook_name: name,
        }
    }

    #[test]
    fn test_not_initialized_checked_first() {
        let mut manager = HandsFreeManager::new(
            MockEngine::default(),
            MockDiscovery::default(),
            RecordingSink::default(),
        );
        assert_eq!(manager.hang_up_call(0), Err(HfpError::NotInitialized));
        assert_eq!(
            manager.dial_phone_number(1, ""),
            Err(HfpError::NotInitialized)
        );
        assert_eq!(
            manager.connect_remote_device(Role::HandsFree, BluetoothAddress::NULL, 0),
            Err(HfpError::NotInitialized)
        );
    }

    #[test]
    fn test_role_checked_before_id_and_arguments() {
        let mut manager = manager(false, true);
        assert_eq!(manager.ring_indication(0), Err(HfpError::InvalidOperation));
        assert_eq!(
            manager.voice_tag_response(5, ""),
            Err(HfpError::InvalidOperation)
        );

        let mut manager = self::manager(true, false);
        assert_eq!(manager.hang_up_call(0), Err(HfpError::InvalidOperation));
        assert!(commands(&manager).is_empty());
    }

    #[test]
    fn test_zero_id_rejected() {
        let mut manager = manager(true, true);
        assert_eq!(manager.hang_up_call(0), Err(HfpError::InvalidParameter));
        assert_eq!(
            manager.setup_audio_connection(0),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(manager.disconnect_device(0), Err(HfpError::InvalidParameter));
    }

    #[test]
    fn test_argument_bounds() {
        let mut manager = manager(true, true);
        let too_long = "5".repeat(65);

        assert_eq!(
            manager.dial_phone_number(4, &too_long),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(
            manager.set_remote_speaker_gain(4, 16),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(
            manager.transmit_dtmf_code(4, 'x'),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(
            manager.send_network_operator_selection(4, 0, Some("a very long operator")),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(
            manager.send_audio_data(4, &[0; 256]),
            Err(HfpError::InvalidParameter)
        );
        assert!(commands(&manager).is_empty());
    }

    #[test]
    fn test_any_role_command_with_single_role() {
        let mut manager = manager(true, false);
        manager.set_remote_microphone_gain(4, 15).unwrap();
        manager.send_select_codec(4, 2).unwrap();
        assert_eq!(
            commands(&manager),
            ["SetRemoteMicrophoneGain(15)", "SendSelectCodec(2)"]
        );
    }

    #[test]
    fn test_empty_number_dials_last() {
        let mut manager = manager(false, true);
        manager.dial_phone_number(4, "").unwrap();
        assert_eq!(commands(&manager), ["DialPhoneNumber(\"\")"]);
    }

    #[test]
    fn test_forwarded_to_engine() {
        let mut manager = manager(true, true);
        manager.dial_phone_number(4, "+15551234567").unwrap();
        manager.set_incoming_call_state(4, CallState::Hold).unwrap();
        manager.ring_indication(5).unwrap();

        assert_eq!(
            commands(&manager),
            [
                "DialPhoneNumber(\"+15551234567\")",
                "SetIncomingCallState(Hold)",
                "RingIndication"
            ]
        );
        let targets: Vec<u32> = manager
            .engine()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Command(id, _) => Some(id.get()),
                _ => None,
            })
            .collect();
        assert_eq!(targets, [4, 4, 5]);
    }

    #[test]
    fn test_engine_failure_maps_to_invalid_operation() {
        let mut manager = manager(true, true);
        manager.engine.fail_commands_after = Some(0);
        assert_eq!(manager.answer_incoming_call(4), Err(HfpError::InvalidOperation));
        assert_eq!(
            manager.send_terminating_response(4, ExtendedResult::Busy, 0),
            Err(HfpError::InvalidOperation)
        );
    }

    #[test]
    fn test_current_calls_list_terminated() {
        let mut manager = manager(true, false);
        manager
            .send_current_calls_list(
                4,
                &[call(1, "5551234", None), call(2, "5559876", Some("Alice"))],
            )
            .unwrap();

        let sent = commands(&manager);
        assert_eq!(sent.len(), 3);
        assert!(sent[0].starts_with("SendCurrentCallsListEntry("));
        assert!(sent[1].starts_with("SendCurrentCallsListEntryWithPhonebookName("));
        assert_eq!(sent[2], "SendCurrentCallsListEnd");
    }

    #[test]
    fn test_current_calls_list_validated_up_front() {
        let mut manager = manager(true, false);
        let long_name = "n".repeat(65);
        assert_eq!(
            manager.send_current_calls_list(
                4,
                &[call(1, "5551234", None), call(2, "5559876", Some(long_name.as_str()))],
            ),
            Err(HfpError::InvalidParameter)
        );
        assert!(commands(&manager).is_empty());

        manager.send_current_calls_list(4, &[]).unwrap();
        assert_eq!(commands(&manager), ["SendCurrentCallsListEnd"]);
    }

    #[test]
    fn test_current_calls_list_engine_failure() {
        let mut manager = manager(true, false);
        manager.engine.fail_commands_after = Some(1);
        assert_eq!(
            manager.send_current_calls_list(4, &[call(1, "5551234", None)]),
            Err(HfpError::InvalidOperation)
        );
        assert_eq!(commands(&manager).len(), 1);
    }

    #[test]
    fn test_subscriber_numbers_flag_last_entry() {
        let mut manager = manager(true, false);
        let number = |phone_number| SubscriberNumber {
            phone_number,
            service_type: 4,
            number_format: 129,
        };
        manager
            .send_subscriber_number_information(4, &[number("5551234"), number("5559876")])
            .unwrap();

        let sent = commands(&manager);
        assert_eq!(sent.len(), 2);
        assert!(sent[0].ends_with("last: false }"));
        assert!(sent[1].ends_with("last: true }"));
    }

    #[test]
    fn test_subscriber_numbers_stop_at_first_failure() {
        let mut manager = manager(true, false);
        manager.engine.fail_commands_after = Some(1);
        let entry = SubscriberNumber {
            phone_number: "5551234",
            service_type: 4,
            number_format: 129,
        };
        assert_eq!(
            manager.send_subscriber_number_information(4, &[entry, entry, entry]),
            Err(HfpError::InvalidOperation)
        );
        assert_eq!(commands(&manager).len(), 1);
    }

    #[test]
    fn test_empty_subscriber_list_sends_ok() {
        let mut manager = manager(true, false);
        manager.send_subscriber_number_information(4, &[]).unwrap();
        assert_eq!(
            commands(&manager),
            ["SendTerminatingResponse { result: Ok, value: 0 }"]
        );
    }

    #[test]
    fn test_connection_request_response() {
        let mut manager = manager(true, true);
        let server = manager.roles().get(Role::HandsFree).unwrap().servers.anchor().unwrap();

        manager.connection_request_response(server.get(), true).unwrap();
        assert!(
            manager
                .engine()
                .calls
                .contains(&EngineCall::RequestResponse(server, true))
        );
        assert_eq!(
            manager.connection_request_response(99, false),
            Err(HfpError::NotConnected)
        );
    }

    #[test]
    fn test_connect_remote_device() {
        let address = BluetoothAddress::new([0x00, 0x1B, 0xDC, 0x0F, 0x12, 0x34]);
        let mut manager = manager(false, true);

        assert_eq!(
            manager.connect_remote_device(Role::AudioGateway, address, 3),
            Err(HfpError::InvalidOperation)
        );
        assert_eq!(
            manager.connect_remote_device(Role::HandsFree, BluetoothAddress::NULL, 3),
            Err(HfpError::InvalidParameter)
        );
        assert_eq!(
            manager.connect_remote_device(Role::HandsFree, address, 31),
            Err(HfpError::InvalidParameter)
        );

        let id = manager
            .connect_remote_device(Role::HandsFree, address, 3)
            .unwrap();
        assert!(
            manager
                .engine()
                .calls
                .contains(&EngineCall::OpenRemote(Role::HandsFree, *address.as_bytes(), 3))
        );
        manager.disconnect_device(id.get()).unwrap();

        manager.engine.fail_remote_open = true;
        assert_eq!(
            manager.connect_remote_device(Role::HandsFree, address, 3),
            Err(HfpError::UnableToConnectToDevice)
        );
    }

    #[test]
    fn test_disconnect_failure() {
        let mut manager = manager(true, false);
        manager.engine.fail_close = true;
        assert_eq!(
            manager.disconnect_device(8),
            Err(HfpError::UnableToDisconnectDevice)
        );
    }
}
