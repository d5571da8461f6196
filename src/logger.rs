use crate::event::Event;
use crate::eventbus::EventListener;

/// A listener that writes every event it receives to the `log` facade as JSON.
pub struct LogListener {
    level: log::Level,
}

impl LogListener {
    pub fn new() -> Self {
        Self::with_level(log::Level::Info)
    }

    pub fn with_level(level: log::Level) -> Self {
        LogListener { level }
    }
}

impl Default for LogListener {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListener for LogListener {
    fn on_event(&mut self, event: &Event) {
        match event.to_json() {
            Ok(json) => log::log!(self.level, "[input] {json}"),
            Err(e) => log::log!(self.level, "[input] {event:?} (unserializable: {e})"),
        }
    }
}
