use crate::config::{check_threshold, DetectMode, ManagerConfig, Thresholds};
use crate::device::{Device, Pad};
use crate::error::Result;
use crate::event::{Event, Target, DEVICE_CONNECTED, DEVICE_DISCONNECTED};
use crate::eventbus::{EventListener, ListenerId, Notifier};
use crate::scheduler::{FrameScheduler, PollingToken};
use crate::snapshot::{Hotplug, RawDevice, Snapshot, SnapshotSource};

/// Slot presence as last seen by the poll-mode reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Presence {
    Unseen,
    Absent,
    Present,
}

/// Owns the devices of one snapshot source and turns its snapshots into events.
///
/// Drive it either with [`update`](Self::update) from your own frame loop, or let it
/// schedule itself with [`start_polling`](Self::start_polling) and [`pump`](Self::pump).
pub struct DeviceManager<S: SnapshotSource> {
    source: S,
    devices: Vec<Option<Device>>,
    snapshot: Snapshot,
    supported: bool,
    needs_poll: bool,
    last_presence: Vec<Presence>,
    thresholds: Thresholds,
    polling: PollingToken,
    last_frame_time: Option<f64>,
    scheduler: Option<Box<dyn FrameScheduler>>,
    notifier: Notifier,
}

impl<S: SnapshotSource> DeviceManager<S> {
    /// A manager with default thresholds and automatic connect detection.
    pub fn new(source: S) -> Self {
        Self::build(source, Thresholds::default(), DetectMode::Auto)
    }

    pub fn with_config(source: S, config: &ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(source, config.thresholds(), config.mode))
    }

    fn build(source: S, thresholds: Thresholds, mode: DetectMode) -> Self {
        let supported = source.supported();
        let needs_poll = match mode {
            DetectMode::Auto => !source.pushes_hotplug(),
            DetectMode::Poll => true,
            DetectMode::Push => {
                if !source.pushes_hotplug() {
                    log::warn!("push mode requested but the source sends no notifications");
                }
                false
            }
        };
        log::debug!("device manager ready (supported={supported}, needs_poll={needs_poll})");

        Self {
            source,
            devices: Vec::new(),
            snapshot: Snapshot::default(),
            supported,
            needs_poll,
            last_presence: Vec::new(),
            thresholds,
            polling: PollingToken::default(),
            last_frame_time: None,
            scheduler: None,
            notifier: Notifier::new(Target::Manager),
        }
    }

    /// Sets the frame scheduler used by self-driving mode.
    pub fn with_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn set_scheduler(&mut self, scheduler: impl FrameScheduler + 'static) {
        self.scheduler = Some(Box::new(scheduler));
    }

    // ---- properties ----

    pub fn supported(&self) -> bool {
        self.supported
    }

    /// Whether connects and disconnects are found by diffing slot presence.
    pub fn needs_poll(&self) -> bool {
        self.needs_poll
    }

    /// Whether self-driving mode is on.
    pub fn polling(&self) -> bool {
        self.polling.is_live()
    }

    /// Handle that stops self-driving mode when cancelled.
    pub fn polling_token(&self) -> PollingToken {
        self.polling.clone()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn axis_threshold(&self) -> f32 {
        self.thresholds.axis
    }

    /// Changes the axis cutoff for every device, effective on the next evaluation.
    pub fn set_axis_threshold(&mut self, value: f32) -> Result<()> {
        self.thresholds.axis = check_threshold("axis", value)?;
        Ok(())
    }

    pub fn button_threshold(&self) -> f32 {
        self.thresholds.button
    }

    /// Changes the button cutoff for every device, effective on the next evaluation.
    pub fn set_button_threshold(&mut self, value: f32) -> Result<()> {
        self.thresholds.button = check_threshold("button", value)?;
        Ok(())
    }

    // ---- devices ----

    /// Device bound to slot `idx`, including ones retained after a disconnect.
    pub fn get_device(&self, idx: usize) -> Option<&Device> {
        self.devices.get(idx).and_then(Option::as_ref)
    }

    /// Mutable access, for registering per-device listeners.
    pub fn device_mut(&mut self, idx: usize) -> Option<&mut Device> {
        self.devices.get_mut(idx).and_then(Option::as_mut)
    }

    /// All devices, aligned with snapshot slots. Slots never populated are `None`.
    pub fn devices(&self) -> &[Option<Device>] {
        &self.devices
    }

    /// Device at `idx` read through the latest snapshot.
    pub fn pad(&self, idx: usize) -> Option<Pad<'_>> {
        self.get_device(idx)
            .map(|device| Pad::new(device, &self.snapshot, self.thresholds))
    }

    /// Every device, read through the latest snapshot.
    pub fn pads(&self) -> impl Iterator<Item = Pad<'_>> {
        self.devices
            .iter()
            .flatten()
            .map(move |device| Pad::new(device, &self.snapshot, self.thresholds))
    }

    /// The snapshot fetched by the last tick.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // ---- listeners ----

    /// Registers a manager listener. Device events from every device are forwarded here.
    pub fn on(&mut self, name: impl Into<String>, listener: impl EventListener + 'static) -> ListenerId {
        self.notifier.register(name, listener)
    }

    pub fn off(&mut self, name: &str, id: ListenerId) {
        self.notifier.unregister(name, id);
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // ---- ticking ----

    /// Runs one tick with `dt` elapsed since the previous one, in any unit.
    ///
    /// Returns every event fired during the tick, in dispatch order. A no-op when the
    /// platform is unsupported.
    pub fn update(&mut self, dt: f64) -> Result<Vec<Event>> {
        if !self.supported {
            return Ok(Vec::new());
        }

        self.snapshot = self.source.snapshot();
        let mut events = Vec::new();

        if self.needs_poll {
            self.reconcile(&mut events)?;
        } else {
            for note in self.source.drain_hotplug() {
                match note {
                    Hotplug::Connected(raw) => self.add_device(raw.index, &raw, &mut events)?,
                    Hotplug::Disconnected { index } => self.remove_device(index, &mut events)?,
                }
            }
        }

        for device in self.devices.iter_mut().flatten() {
            let fired = device.advance(dt, &self.snapshot, &self.thresholds)?;
            for event in &fired {
                self.notifier.dispatch(event.clone())?;
            }
            events.extend(fired);
        }

        log::trace!("tick dt={dt} fired {} event(s)", events.len());
        Ok(events)
    }

    /// Enters self-driving mode: ticks once now with `dt = 0` and requests the next frame.
    ///
    /// A no-op when unsupported or already polling. Without a scheduler that accepts the
    /// request, polling switches itself off again after the first tick.
    pub fn start_polling(&mut self) -> Result<Vec<Event>> {
        if !self.supported || self.polling.is_live() {
            return Ok(Vec::new());
        }
        self.polling.arm();
        self.last_frame_time = None;

        let events = self.update(0.0)?;
        self.schedule_next_tick();
        Ok(events)
    }

    /// Leaves self-driving mode. A frame that is already scheduled still runs once.
    pub fn stop_polling(&mut self) {
        self.polling.cancel();
        self.last_frame_time = None;
    }

    /// Frame callback: ticks with the time since the previous frame and reschedules while
    /// polling. The first frame after starting has `dt = 0`.
    pub fn on_frame(&mut self, timestamp: f64) -> Result<Vec<Event>> {
        let dt = self.last_frame_time.map_or(0.0, |last| timestamp - last);
        self.last_frame_time = Some(timestamp);

        let events = self.update(dt)?;
        self.schedule_next_tick();
        Ok(events)
    }

    /// Waits for the scheduler's pending frame and runs it.
    ///
    /// Returns `Ok(false)` when no frame was pending, which is the case once polling has
    /// stopped and any trailing frame has run.
    pub fn pump(&mut self) -> Result<bool> {
        let Some(timestamp) = self.scheduler.as_mut().and_then(|s| s.next_frame()) else {
            return Ok(false);
        };
        self.on_frame(timestamp)?;
        Ok(true)
    }

    fn schedule_next_tick(&mut self) {
        if !self.polling.is_live() {
            return;
        }
        let accepted = self
            .scheduler
            .as_mut()
            .is_some_and(|scheduler| scheduler.request_frame());
        if !accepted {
            log::warn!("no frame scheduler available; self-driving polling disabled");
            self.polling.cancel();
        }
    }

    // ---- connect / disconnect ----

    /// Applies a platform connect notification.
    ///
    /// Ignored in poll mode, where slot presence in the snapshot decides connects.
    pub fn handle_connected(&mut self, raw: &RawDevice) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        if self.needs_poll {
            log::warn!("connect notification for slot {} ignored in poll mode", raw.index);
            return Ok(events);
        }
        self.add_device(raw.index, raw, &mut events)?;
        Ok(events)
    }

    /// Applies a platform disconnect notification. Ignored in poll mode.
    pub fn handle_disconnected(&mut self, index: usize) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        if self.needs_poll {
            log::warn!("disconnect notification for slot {index} ignored in poll mode");
            return Ok(events);
        }
        self.remove_device(index, &mut events)?;
        Ok(events)
    }

    fn reconcile(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let slots = self.snapshot.len().max(self.last_presence.len());
        self.last_presence.resize(slots, Presence::Unseen);

        for idx in 0..slots {
            let now = if self.snapshot.get(idx).is_some() {
                Presence::Present
            } else {
                Presence::Absent
            };
            if now == self.last_presence[idx] {
                continue;
            }
            self.last_presence[idx] = now;

            match self.snapshot.get(idx).cloned() {
                Some(raw) => self.add_device(idx, &raw, events)?,
                None => self.remove_device(idx, events)?,
            }
        }
        Ok(())
    }

    fn add_device(&mut self, idx: usize, raw: &RawDevice, events: &mut Vec<Event>) -> Result<()> {
        if self.devices.len() <= idx {
            self.devices.resize_with(idx + 1, || None);
        }

        let slot = &mut self.devices[idx];
        let mut replaced = None;
        match slot {
            Some(device) if device.id() == raw.id => device.revive(),
            Some(device) => {
                if device.is_retired() {
                    log::debug!("slot {idx}: \"{}\" replaced by \"{}\"", device.id(), raw.id);
                } else {
                    log::warn!(
                        "ID mismatch at slot {idx}: \"{}\" vs \"{}\"; replacing",
                        device.id(),
                        raw.id
                    );
                    replaced = Some(device.id().to_string());
                }
                *slot = Some(Device::new(idx, raw));
            }
            None => *slot = Some(Device::new(idx, raw)),
        }

        let Some(device) = slot.as_ref() else {
            return Ok(());
        };
        log::debug!("connected {}", device.info());
        let event = Event::device(DEVICE_CONNECTED, device.info().clone(), replaced);
        self.fire(event, events)
    }

    fn remove_device(&mut self, idx: usize, events: &mut Vec<Event>) -> Result<()> {
        let Some(device) = self.devices.get_mut(idx).and_then(Option::as_mut) else {
            return Ok(());
        };

        let released = device.did_disconnect()?;
        let info = device.info().clone();
        for event in released {
            self.fire(event, events)?;
        }

        log::debug!("disconnected {info}");
        self.fire(Event::device(DEVICE_DISCONNECTED, info, None), events)
    }

    fn fire(&self, mut event: Event, events: &mut Vec<Event>) -> Result<()> {
        event.target.get_or_insert(Target::Manager);
        self.notifier.dispatch(event.clone())?;
        events.push(event);
        Ok(())
    }
}

impl<S: SnapshotSource> std::fmt::Debug for DeviceManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("devices", &self.devices.iter().flatten().count())
            .field("supported", &self.supported)
            .field("needs_poll", &self.needs_poll)
            .field("polling", &self.polling.is_live())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}
