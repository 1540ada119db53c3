//! Service Discovery Interface
//!
//! SDP records and extended inquiry response (EIR) data make the enabled roles
//! visible to remote devices. Record encoding belongs to the [`DiscoveryService`]
//! implementation; this module only decides what gets published.

use crate::{
    HfreId, Role, StackId,
    config::RoleConfig,
    constants::{EIR_DATA_CAPACITY, EIR_TYPE_16_BIT_SERVICE_UUID_PARTIAL, UUID_16_SIZE},
    engine::EngineResult,
};
use core::num::NonZeroU32;
use heapless::Vec;

/// Handle of an installed SDP service record
pub type SdpRecordHandle = NonZeroU32;

/// SDP database and EIR publication used by the manager
pub trait DiscoveryService {
    /// Install the service record of `role`, anchored on server `anchor`
    ///
    /// # Errors
    ///
    /// Returns the engine status if the record could not be registered.
    fn register_sdp_record(
        &mut self,
        stack: StackId,
        role: Role,
        anchor: HfreId,
        config: &RoleConfig,
    ) -> EngineResult<SdpRecordHandle>;

    /// Remove a previously installed service record
    ///
    /// # Errors
    ///
    /// Returns the engine status if the handle is unknown.
    fn delete_sdp_record(&mut self, stack: StackId, handle: SdpRecordHandle) -> EngineResult;

    /// Publish an EIR data structure
    ///
    /// # Errors
    ///
    /// Returns the engine status if the controller rejected the data.
    fn add_eir_data(&mut self, data: &[u8]) -> EngineResult;
}

/// Build the EIR "incomplete list of 16-bit service UUIDs" structure for `roles`
///
/// UUIDs are written little-endian in the order given. Returns `None` when no role
/// is listed, since an empty structure is never published.
#[must_use]
pub fn build_eir_data(roles: impl IntoIterator<Item = Role>) -> Option<Vec<u8, EIR_DATA_CAPACITY>> {
    let mut data: Vec<u8, EIR_DATA_CAPACITY> = Vec::new();
    // Length byte is patched once the UUID count is known
    data.extend_from_slice(&[0, EIR_TYPE_16_BIT_SERVICE_UUID_PARTIAL])
        .ok()?;

    let mut count = 0usize;
    for role in roles {
        data.extend_from_slice(&role.service_uuid().to_le_bytes())
            .ok()?;
        count += 1;
    }
    if count == 0 {
        return None;
    }

    data[0] = u8::try_from(1 + count * UUID_16_SIZE).ok()?;
    Some(data)
}
