//! Frame scheduling for self-driving mode.
//!
//! When the manager polls on its own it asks a [`FrameScheduler`] for "one more frame"
//! after every tick, and the host pumps delivered frames back into
//! [`DeviceManager::pump`](crate::manager::DeviceManager::pump). Stopping is cooperative:
//! [`PollingToken::cancel`] only prevents the *next* request, so a frame that was already
//! requested still runs once.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Host primitive that runs a callback before the next frame.
pub trait FrameScheduler {
    /// Requests one frame. Returns `false` when this scheduler is unavailable.
    fn request_frame(&mut self) -> bool;

    /// Waits for the requested frame and returns its timestamp, or `None` when no frame
    /// is pending.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Shared on/off flag for self-driving mode.
///
/// Clones share state, so a listener can hold one and stop polling from inside a tick.
#[derive(Clone, Debug, Default)]
pub struct PollingToken(Rc<Cell<bool>>);

impl PollingToken {
    pub fn is_live(&self) -> bool {
        self.0.get()
    }

    pub fn cancel(&self) {
        self.0.set(false);
    }

    pub(crate) fn arm(&self) {
        self.0.set(true);
    }
}

/// Tries schedulers in a fixed order and uses the first one that accepts a request.
#[derive(Default)]
pub struct FallbackScheduler {
    candidates: Vec<Box<dyn FrameScheduler>>,
    active: Option<usize>,
}

impl FallbackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate with lower preference than those already added.
    pub fn or_else(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.candidates.push(Box::new(scheduler));
        self
    }

    /// Index of the candidate that accepted the last request.
    pub fn active(&self) -> Option<usize> {
        self.active
    }
}

impl FrameScheduler for FallbackScheduler {
    fn request_frame(&mut self) -> bool {
        self.active = self
            .candidates
            .iter_mut()
            .position(|candidate| candidate.request_frame());
        self.active.is_some()
    }

    fn next_frame(&mut self) -> Option<f64> {
        let idx = self.active?;
        self.candidates.get_mut(idx)?.next_frame()
    }
}

/// Sleeps the current thread until a fixed interval has passed.
///
/// Timestamps are milliseconds since the scheduler was created, so hold times come out in
/// milliseconds.
#[derive(Debug)]
pub struct IntervalScheduler {
    interval: Duration,
    origin: Instant,
    due: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            origin: Instant::now(),
            due: None,
        }
    }

    /// Roughly 60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }
}

impl FrameScheduler for IntervalScheduler {
    fn request_frame(&mut self) -> bool {
        self.due = Some(Instant::now() + self.interval);
        true
    }

    fn next_frame(&mut self) -> Option<f64> {
        let due = self.due.take()?;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        Some(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Delivers frames with pre-set timestamps. Deterministic; meant for tests and replays.
#[derive(Debug, Default)]
pub struct ScriptedScheduler {
    timestamps: VecDeque<f64>,
    pending: bool,
    refuse: bool,
    requests: usize,
}

impl ScriptedScheduler {
    pub fn new(timestamps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            timestamps: timestamps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A scheduler that turns down every request.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// How many requests were accepted.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl FrameScheduler for ScriptedScheduler {
    fn request_frame(&mut self) -> bool {
        if self.refuse {
            return false;
        }
        self.pending = true;
        self.requests += 1;
        true
    }

    fn next_frame(&mut self) -> Option<f64> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        self.timestamps.pop_front()
    }
}
