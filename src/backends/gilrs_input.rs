//! Real controllers through `gilrs`.
//!
//! gilrs reports connects and disconnects as events, so this source runs in push mode:
//! every [`snapshot`](SnapshotSource::snapshot) call first drains the gilrs event queue
//! (which also refreshes its cached gamepad state) and queues [`Hotplug`] notifications
//! for the manager.
//!
//! ## Layout
//! Buttons and axes are read in the fixed order of [`BUTTONS`] and [`AXES`], so indices
//! are stable across controllers that gilrs maps. Controls a pad lacks read as 0.
//!
//! Slots are gilrs gamepad ids. The id string is the gamepad name followed by its UUID.

use crate::error::{Error, Result};
use crate::snapshot::{Hotplug, RawButton, RawDevice, Snapshot, SnapshotSource};
use gilrs::{Axis, Button, EventType, Gamepad, Gilrs};
use std::collections::HashSet;

/// Button order used for raw button indices.
pub const BUTTONS: [Button; 19] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
    Button::C,
    Button::Z,
];

/// Axis order used for raw axis indices.
pub const AXES: [Axis; 8] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
    Axis::DPadX,
    Axis::DPadY,
];

pub struct GilrsSource {
    gilrs: Gilrs,
    supported: bool,
    /// Slots announced as connected and not yet disconnected.
    known: HashSet<usize>,
    pending: Vec<Hotplug>,
}

impl GilrsSource {
    /// Opens gilrs and queues a connect for every gamepad already present.
    ///
    /// On platforms gilrs does not implement the source reports itself unsupported.
    pub fn new() -> Result<Self> {
        let (gilrs, supported) = match Gilrs::new() {
            Ok(gilrs) => (gilrs, true),
            Err(gilrs::Error::NotImplemented(dummy)) => {
                log::warn!("gilrs has no backend for this platform");
                (dummy, false)
            }
            Err(e) => return Err(Error::Backend(e.to_string())),
        };

        let mut source = Self {
            gilrs,
            supported,
            known: HashSet::new(),
            pending: Vec::new(),
        };

        let present: Vec<RawDevice> = source
            .gilrs
            .gamepads()
            .map(|(id, pad)| raw_from(usize::from(id), &pad))
            .collect();
        for raw in present {
            log::debug!("gilrs: found {} at slot {}", raw.id, raw.index);
            source.known.insert(raw.index);
            source.pending.push(Hotplug::Connected(raw));
        }
        Ok(source)
    }

    fn drain_events(&mut self) {
        while let Some(gilrs::Event { id, event, .. }) = self.gilrs.next_event() {
            let index = usize::from(id);
            match event {
                EventType::Connected => {
                    if self.known.insert(index) {
                        let raw = raw_from(index, &self.gilrs.gamepad(id));
                        self.pending.push(Hotplug::Connected(raw));
                    }
                }
                EventType::Disconnected => {
                    if self.known.remove(&index) {
                        self.pending.push(Hotplug::Disconnected { index });
                    }
                }
                _ => {}
            }
        }
    }
}

impl SnapshotSource for GilrsSource {
    fn supported(&self) -> bool {
        self.supported
    }

    fn pushes_hotplug(&self) -> bool {
        true
    }

    fn snapshot(&mut self) -> Snapshot {
        if !self.supported {
            return Snapshot::default();
        }
        self.drain_events();

        let mut slots: Vec<Option<RawDevice>> = Vec::new();
        for (id, pad) in self.gilrs.gamepads() {
            let index = usize::from(id);
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index] = Some(raw_from(index, &pad));
        }
        Snapshot::from_slots(slots)
    }

    fn drain_hotplug(&mut self) -> Vec<Hotplug> {
        std::mem::take(&mut self.pending)
    }
}

fn raw_from(index: usize, pad: &Gamepad<'_>) -> RawDevice {
    let uuid: String = pad.uuid().iter().map(|b| format!("{b:02x}")).collect();
    RawDevice {
        connected: pad.is_connected(),
        id: format!("{} ({uuid})", pad.name()),
        index,
        buttons: BUTTONS
            .iter()
            .map(|&button| RawButton {
                value: pad.button_data(button).map_or(0.0, |data| data.value()),
            })
            .collect(),
        axes: AXES
            .iter()
            .map(|&axis| pad.axis_data(axis).map_or(0.0, |data| data.value()))
            .collect(),
    }
}
