use bt_hci::param::BdAddr;

/// A Bluetooth Device Address (`BD_ADDR`) of a remote Hands-Free or Audio Gateway peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, defmt::Format)]
pub struct BluetoothAddress(pub [u8; 6]);

impl BluetoothAddress {
    /// The all-zero address, never a valid connection target
    pub const NULL: Self = Self([0; 6]);

    /// Create a new Bluetooth address from bytes
    #[must_use]
    pub const fn new(addr: [u8; 6]) -> Self {
        Self(addr)
    }

    /// Get the raw address bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Returns `true` for the all-zero address
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<[u8; 6]> for BluetoothAddress {
    fn from(addr: [u8; 6]) -> Self {
        Self(addr)
    }
}

impl From<BluetoothAddress> for BdAddr {
    fn from(addr: BluetoothAddress) -> Self {
        BdAddr::new(addr.0)
    }
}
