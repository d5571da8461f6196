//! Device identity summary.
//!
//! [`DeviceInfo`] is a lightweight, cloneable description of a device suitable for event
//! payloads, logging and UI display. It is captured from the raw record when the device is
//! created and does not change afterwards, even while the slot is empty.

use serde::{Deserialize, Serialize};

/// Identity of a device as seen when its slot was first populated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Slot index.
    pub index: usize,

    /// Platform id string (vendor/product description).
    pub id: String,

    /// Number of buttons reported at creation.
    pub num_buttons: usize,

    /// Number of axes reported at creation.
    pub num_axes: usize,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({} buttons, {} axes)",
            self.index, self.id, self.num_buttons, self.num_axes
        )
    }
}
