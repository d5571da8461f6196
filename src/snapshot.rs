//! Raw per-tick device snapshots.
//!
//! A [`Snapshot`] is an **owned**, read-only view of every controller slot the platform
//! reports at a point in time (typically "this frame"). It is produced by a
//! [`SnapshotSource`] once per tick and is cheap to clone for fan-out.
//!
//! # Semantics
//! - Slots are positional: entry `i` describes controller slot `i`, or is `None` when the
//!   slot is empty. The list may be sparse and its length may change between ticks.
//! - A snapshot is **immutable** and carries no identity across ticks beyond the slot
//!   index. Devices re-resolve their record by index on every read instead of holding on
//!   to one.
//!
//! # Example
//! ```
//! use padwatch::{RawDevice, Snapshot};
//!
//! let snap = Snapshot::from_slots(vec![None, Some(RawDevice::new(1, "pad", 2, 2))]);
//! assert!(snap.get(0).is_none());
//! assert_eq!(snap.get(1).map(|raw| raw.id.as_str()), Some("pad"));
//! ```

use serde::{Deserialize, Serialize};

/// One analog button reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawButton {
    /// How far the button is depressed, in `[0.0, 1.0]`.
    pub value: f32,
}

/// A platform device record as reported for one slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDevice {
    /// Connection status as reported by the platform.
    pub connected: bool,
    /// Platform identifier string (vendor/product description).
    pub id: String,
    /// Slot index this record occupies.
    pub index: usize,
    pub buttons: Vec<RawButton>,
    /// Axis readings, conventionally in `[-1.0, 1.0]`.
    pub axes: Vec<f32>,
}

impl RawDevice {
    /// A connected device with all controls at rest.
    pub fn new(index: usize, id: impl Into<String>, num_buttons: usize, num_axes: usize) -> Self {
        Self {
            connected: true,
            id: id.into(),
            index,
            buttons: vec![RawButton::default(); num_buttons],
            axes: vec![0.0; num_axes],
        }
    }

    /// Button value, 0 when out of range.
    #[inline]
    pub fn button(&self, idx: usize) -> f32 {
        self.buttons.get(idx).map_or(0.0, |b| b.value)
    }

    /// Axis value, 0 when out of range.
    #[inline]
    pub fn axis(&self, idx: usize) -> f32 {
        self.axes.get(idx).copied().unwrap_or(0.0)
    }
}

/// Owned snapshot of all controller slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(pub Vec<Option<RawDevice>>);

impl Snapshot {
    pub fn from_slots(slots: Vec<Option<RawDevice>>) -> Self {
        Self(slots)
    }

    /// Record at `index`, or `None` when the slot is empty or past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&RawDevice> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Number of slots, including empty ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(slot, record)` pairs, empty slots included.
    pub fn slots(&self) -> impl Iterator<Item = (usize, Option<&RawDevice>)> {
        self.0.iter().enumerate().map(|(i, s)| (i, s.as_ref()))
    }

    /// Consume the snapshot and return the slot list.
    #[inline]
    pub fn into_inner(self) -> Vec<Option<RawDevice>> {
        self.0
    }
}

/// A connect/disconnect notification pushed by the platform.
#[derive(Clone, Debug, PartialEq)]
pub enum Hotplug {
    Connected(RawDevice),
    Disconnected { index: usize },
}

/// Where the manager gets its raw data from.
///
/// Implementations wrap a platform API (see [`crate::backends`]). Sources that can push
/// connect/disconnect notifications report [`pushes_hotplug`](Self::pushes_hotplug) and
/// queue them for [`drain_hotplug`](Self::drain_hotplug); all others are diffed by slot
/// presence every tick.
pub trait SnapshotSource {
    /// Whether the platform exposes controllers at all.
    fn supported(&self) -> bool {
        true
    }

    /// Whether connect/disconnect notifications are pushed.
    fn pushes_hotplug(&self) -> bool {
        false
    }

    /// Current raw state of every slot. Empty when unsupported.
    fn snapshot(&mut self) -> Snapshot;

    /// Take the notifications queued since the last call.
    fn drain_hotplug(&mut self) -> Vec<Hotplug> {
        Vec::new()
    }
}
