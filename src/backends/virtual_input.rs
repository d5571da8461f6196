use crate::snapshot::{Hotplug, RawDevice, Snapshot, SnapshotSource};

/// In-memory controller slots that tests and demos drive by hand.
///
/// By default it behaves like a platform without connect notifications, so the manager
/// diffs slot presence. [`VirtualSource::with_hotplug`] queues a notification for every
/// plug and unplug instead.
#[derive(Debug, Clone)]
pub struct VirtualSource {
    slots: Vec<Option<RawDevice>>,
    supported: bool,
    hotplug: bool,
    pending: Vec<Hotplug>,
}

impl Default for VirtualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualSource {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            supported: true,
            hotplug: false,
            pending: Vec::new(),
        }
    }

    /// A source that pushes connect/disconnect notifications.
    pub fn with_hotplug() -> Self {
        Self {
            hotplug: true,
            ..Self::new()
        }
    }

    /// A platform without controller support.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Plugs a device with all controls at rest into `index`.
    pub fn plug(&mut self, index: usize, id: &str, num_buttons: usize, num_axes: usize) {
        self.plug_raw(RawDevice::new(index, id, num_buttons, num_axes));
    }

    /// Plugs a prepared record into the slot named by `raw.index`.
    pub fn plug_raw(&mut self, raw: RawDevice) {
        let index = raw.index;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        if self.hotplug {
            self.pending.push(Hotplug::Connected(raw.clone()));
        }
        self.slots[index] = Some(raw);
    }

    /// Empties slot `index`. The slot list keeps its length.
    pub fn unplug(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.take().is_some() && self.hotplug {
            self.pending.push(Hotplug::Disconnected { index });
        }
    }

    /// Shortens the slot list, dropping trailing slots silently.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn set_button(&mut self, index: usize, button: usize, value: f32) {
        if let Some(b) = self.raw_mut(index).and_then(|raw| raw.buttons.get_mut(button)) {
            b.value = value;
        }
    }

    pub fn set_axis(&mut self, index: usize, axis: usize, value: f32) {
        if let Some(a) = self.raw_mut(index).and_then(|raw| raw.axes.get_mut(axis)) {
            *a = value;
        }
    }

    pub fn set_connected(&mut self, index: usize, connected: bool) {
        if let Some(raw) = self.raw_mut(index) {
            raw.connected = connected;
        }
    }

    pub fn raw_mut(&mut self, index: usize) -> Option<&mut RawDevice> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }
}

impl SnapshotSource for VirtualSource {
    fn supported(&self) -> bool {
        self.supported
    }

    fn pushes_hotplug(&self) -> bool {
        self.hotplug
    }

    fn snapshot(&mut self) -> Snapshot {
        if !self.supported {
            return Snapshot::default();
        }
        Snapshot::from_slots(self.slots.clone())
    }

    fn drain_hotplug(&mut self) -> Vec<Hotplug> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_plugged_slots() {
        let mut src = VirtualSource::new();
        src.plug(2, "pad", 3, 2);
        src.set_button(2, 1, 0.5);
        src.set_axis(2, 0, -0.25);

        let snap = src.snapshot();
        assert_eq!(snap.len(), 3);
        assert!(snap.get(0).is_none());
        let raw = snap.get(2).unwrap();
        assert_eq!(raw.button(1), 0.5);
        assert_eq!(raw.axis(0), -0.25);
        assert!(src.drain_hotplug().is_empty());
    }

    #[test]
    fn hotplug_flavour_queues_notifications() {
        let mut src = VirtualSource::with_hotplug();
        src.plug(0, "pad", 1, 0);
        src.unplug(0);
        src.unplug(0);

        let notes = src.drain_hotplug();
        assert_eq!(notes.len(), 2);
        assert!(matches!(&notes[0], Hotplug::Connected(raw) if raw.id == "pad"));
        assert_eq!(notes[1], Hotplug::Disconnected { index: 0 });
        assert!(src.drain_hotplug().is_empty());
    }

    #[test]
    fn unsupported_source_reports_nothing() {
        let mut src = VirtualSource::unsupported();
        src.plug(0, "pad", 1, 1);
        assert!(!src.supported());
        assert!(src.snapshot().is_empty());
    }

    #[test]
    fn writes_to_missing_controls_are_ignored() {
        let mut src = VirtualSource::new();
        src.set_button(0, 0, 1.0);
        src.plug(0, "pad", 1, 1);
        src.set_button(0, 5, 1.0);
        src.set_axis(0, 5, 1.0);
        assert_eq!(src.snapshot().get(0).unwrap().button(0), 0.0);
    }
}
