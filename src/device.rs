//! One controller slot and its derived state.
//!
//! A [`Device`] never stores its raw record. Every read takes the latest [`Snapshot`]
//! and resolves the record by slot index, so a device whose slot is empty reads as all
//! zeros while keeping the identity captured when it was created. [`Pad`] bundles a
//! device with a snapshot and thresholds for argument-free reads.
//!
//! # Hold tracking
//! Each button and axis has a hold accumulator. [`Device::advance`] compares the current
//! pushed state with it:
//! - **rising edge**: fires a down event and starts the hold;
//! - **held**: adds `dt`;
//! - **falling edge**: fires an up event carrying the accumulated time and resets.
//!
//! Buttons add `dt` on the rising-edge tick as well. Axes do not: their accumulation
//! starts on the tick after the edge, so an axis reports a down time of 0 on the tick it
//! goes down.

use crate::config::Thresholds;
use crate::error::Result;
use crate::event::{Event, Target, AXIS_DOWN, AXIS_UP, BUTTON_DOWN, BUTTON_UP};
use crate::eventbus::{EventListener, ListenerId, Notifier};
use crate::metadata::DeviceInfo;
use crate::snapshot::{RawDevice, Snapshot};

#[derive(Debug)]
pub struct Device {
    info: DeviceInfo,
    /// `None` while released, `Some(accumulated)` while held.
    button_down_time: Vec<Option<f64>>,
    axis_down_time: Vec<Option<f64>>,
    /// Set by [`Device::did_disconnect`], cleared when the record is reused.
    retired: bool,
    notifier: Notifier,
}

impl Device {
    /// Creates the device for `index`, capturing identity and control counts from `raw`.
    pub fn new(index: usize, raw: &RawDevice) -> Self {
        Self {
            info: DeviceInfo {
                index,
                id: raw.id.clone(),
                num_buttons: raw.buttons.len(),
                num_axes: raw.axes.len(),
            },
            button_down_time: vec![None; raw.buttons.len()],
            axis_down_time: vec![None; raw.axes.len()],
            retired: false,
            notifier: Notifier::new(Target::Device(index)),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.info.index
    }

    #[inline]
    pub fn num_buttons(&self) -> usize {
        self.info.num_buttons
    }

    #[inline]
    pub fn num_axes(&self) -> usize {
        self.info.num_axes
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Whether the record was force-released by a disconnect and not reused since.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn revive(&mut self) {
        self.retired = false;
    }

    /// This device's raw record in `snapshot`, if its slot is populated.
    #[inline]
    pub fn raw<'s>(&self, snapshot: &'s Snapshot) -> Option<&'s RawDevice> {
        snapshot.get(self.info.index)
    }

    /// Connection flag of the current record; `false` when the slot is empty.
    pub fn connected(&self, snapshot: &Snapshot) -> bool {
        self.raw(snapshot).is_some_and(|raw| raw.connected)
    }

    /// Analog value of button `idx` in `[0, 1]`, 0 when absent.
    pub fn button(&self, snapshot: &Snapshot, idx: usize) -> f32 {
        self.raw(snapshot).map_or(0.0, |raw| raw.button(idx))
    }

    /// Raw value of axis `idx`, 0 when absent.
    pub fn axis(&self, snapshot: &Snapshot, idx: usize) -> f32 {
        self.raw(snapshot).map_or(0.0, |raw| raw.axis(idx))
    }

    pub fn is_button_pushed(&self, snapshot: &Snapshot, thresholds: &Thresholds, idx: usize) -> bool {
        self.button(snapshot, idx) > thresholds.button
    }

    /// Positive direction only: an axis pushed fully negative is not pushed.
    pub fn is_axis_pushed(&self, snapshot: &Snapshot, thresholds: &Thresholds, idx: usize) -> bool {
        self.axis(snapshot, idx) > thresholds.axis
    }

    /// How long button `idx` has been held, 0 when released.
    pub fn button_down_time(&self, idx: usize) -> f64 {
        self.button_down_time.get(idx).copied().flatten().unwrap_or(0.0)
    }

    /// How long axis `idx` has been held, 0 when released.
    pub fn axis_down_time(&self, idx: usize) -> f64 {
        self.axis_down_time.get(idx).copied().flatten().unwrap_or(0.0)
    }

    pub fn is_button_held(&self, idx: usize) -> bool {
        matches!(self.button_down_time.get(idx), Some(Some(_)))
    }

    pub fn is_axis_held(&self, idx: usize) -> bool {
        matches!(self.axis_down_time.get(idx), Some(Some(_)))
    }

    /// Registers a listener for one of this device's events.
    pub fn on(&mut self, name: impl Into<String>, listener: impl EventListener + 'static) -> ListenerId {
        self.notifier.register(name, listener)
    }

    pub fn off(&mut self, name: &str, id: ListenerId) {
        self.notifier.unregister(name, id);
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Recomputes hold state against `snapshot` and fires the resulting edge events.
    ///
    /// `dt` is in whatever unit the caller uses and is accumulated verbatim. Does nothing
    /// while the slot is empty; holds are kept until [`Device::did_disconnect`].
    /// Returns the events fired, in order.
    pub fn advance(&mut self, dt: f64, snapshot: &Snapshot, thresholds: &Thresholds) -> Result<Vec<Event>> {
        let Some(raw) = self.raw(snapshot) else {
            return Ok(Vec::new());
        };

        let mut events = Vec::new();

        for (i, hold) in self.button_down_time.iter_mut().enumerate() {
            let value = raw.button(i);
            let pushed = value > thresholds.button;
            match (pushed, *hold) {
                (true, None) => {
                    events.push(control_event(&self.info, BUTTON_DOWN, i, value, None));
                    *hold = Some(dt);
                }
                (true, Some(t)) => *hold = Some(t + dt),
                (false, Some(t)) => {
                    events.push(control_event(&self.info, BUTTON_UP, i, value, Some(t)));
                    *hold = None;
                }
                (false, None) => {}
            }
        }

        for (i, hold) in self.axis_down_time.iter_mut().enumerate() {
            let value = raw.axis(i);
            let pushed = value > thresholds.axis;
            match (pushed, *hold) {
                (true, None) => {
                    events.push(control_event(&self.info, AXIS_DOWN, i, value, None));
                    *hold = Some(0.0);
                }
                (true, Some(t)) => *hold = Some(t + dt),
                (false, Some(t)) => {
                    events.push(control_event(&self.info, AXIS_UP, i, value, Some(t)));
                    *hold = None;
                }
                (false, None) => {}
            }
        }

        self.fire_all(&events)?;
        Ok(events)
    }

    /// Force-releases every held control, firing an up event with its final time.
    ///
    /// Fires nothing when nothing is held. The reported value is 0 since the control is
    /// no longer readable.
    pub fn did_disconnect(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        for (i, hold) in self.button_down_time.iter_mut().enumerate() {
            if let Some(t) = hold.take() {
                events.push(control_event(&self.info, BUTTON_UP, i, 0.0, Some(t)));
            }
        }
        for (i, hold) in self.axis_down_time.iter_mut().enumerate() {
            if let Some(t) = hold.take() {
                events.push(control_event(&self.info, AXIS_UP, i, 0.0, Some(t)));
            }
        }
        self.retired = true;

        self.fire_all(&events)?;
        Ok(events)
    }

    fn fire_all(&self, events: &[Event]) -> Result<()> {
        for event in events {
            self.notifier.dispatch(event.clone())?;
        }
        Ok(())
    }
}

fn control_event(info: &DeviceInfo, name: &str, control: usize, value: f32, time: Option<f64>) -> Event {
    let mut event = Event::control(name, info.clone(), control, value, time);
    event.target = Some(Target::Device(info.index));
    event
}

/// A device read through a specific snapshot and threshold set.
#[derive(Clone, Copy, Debug)]
pub struct Pad<'a> {
    device: &'a Device,
    snapshot: &'a Snapshot,
    thresholds: Thresholds,
}

impl<'a> Pad<'a> {
    pub fn new(device: &'a Device, snapshot: &'a Snapshot, thresholds: Thresholds) -> Self {
        Self {
            device,
            snapshot,
            thresholds,
        }
    }

    pub fn device(&self) -> &'a Device {
        self.device
    }

    pub fn id(&self) -> &'a str {
        self.device.id()
    }

    pub fn index(&self) -> usize {
        self.device.index()
    }

    pub fn num_buttons(&self) -> usize {
        self.device.num_buttons()
    }

    pub fn num_axes(&self) -> usize {
        self.device.num_axes()
    }

    pub fn connected(&self) -> bool {
        self.device.connected(self.snapshot)
    }

    pub fn button(&self, idx: usize) -> f32 {
        self.device.button(self.snapshot, idx)
    }

    pub fn axis(&self, idx: usize) -> f32 {
        self.device.axis(self.snapshot, idx)
    }

    pub fn is_button_pushed(&self, idx: usize) -> bool {
        self.device.is_button_pushed(self.snapshot, &self.thresholds, idx)
    }

    pub fn is_axis_pushed(&self, idx: usize) -> bool {
        self.device.is_axis_pushed(self.snapshot, &self.thresholds, idx)
    }

    pub fn button_down_time(&self, idx: usize) -> f64 {
        self.device.button_down_time(idx)
    }

    pub fn axis_down_time(&self, idx: usize) -> f64 {
        self.device.axis_down_time(idx)
    }
}
