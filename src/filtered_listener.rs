use crate::event::Event;
use crate::eventbus::EventListener;

/// Wraps a listener and forwards only the events a predicate accepts.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&Event) -> bool>,
    inner: Box<dyn EventListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&Event) -> bool + 'static,
        inner: impl EventListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }

    /// Forwards only events concerning controller slot `index`.
    pub fn for_controller(index: usize, inner: impl EventListener + 'static) -> Self {
        Self::new(
            move |event: &Event| event.gamepad().is_some_and(|pad| pad.index == index),
            inner,
        )
    }
}

impl EventListener for FilteredListener {
    fn on_event(&mut self, event: &Event) {
        if (self.predicate)(event) {
            self.inner.on_event(event);
        }
    }
}
