use crate::error::{Error, Result};
use crate::event::{Event, Target};
use std::cell::RefCell;
use std::collections::HashMap;

/// Trait for reacting to dispatched events.
pub trait EventListener {
    fn on_event(&mut self, event: &Event);
}

impl<F> EventListener for F
where
    F: FnMut(&Event),
{
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Handle returned by [`Notifier::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    listener: RefCell<Box<dyn EventListener>>,
}

/// Named-event registry with synchronous dispatch.
pub struct Notifier {
    owner: Target,
    next_id: u64,
    listeners: HashMap<String, Vec<ListenerEntry>>,
}

impl Notifier {
    /// A notifier whose dispatched events default their target to `owner`.
    pub fn new(owner: Target) -> Self {
        Self {
            owner,
            next_id: 0,
            listeners: HashMap::new(),
        }
    }

    /// Registers a listener for `name`. Listeners run in registration order.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        listener: impl EventListener + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(name.into())
            .or_default()
            .push(ListenerEntry {
                id,
                listener: RefCell::new(Box::new(listener)),
            });
        id
    }

    /// Unregisters a listener. Unknown ids are ignored.
    pub fn unregister(&mut self, name: &str, id: ListenerId) {
        if let Some(entries) = self.listeners.get_mut(name) {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
            }
            if entries.is_empty() {
                self.listeners.remove(name);
            }
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Dispatches an event to every listener registered for its name.
    ///
    /// Dispatch borrows the notifier, so the listener list cannot change while
    /// listeners run.
    pub fn dispatch(&self, event: impl Into<Event>) -> Result<()> {
        let mut event = event.into();
        if event.name.is_empty() {
            return Err(Error::MissingEventName);
        }
        if event.target.is_none() {
            event.target = Some(self.owner);
        }

        let Some(entries) = self.listeners.get(&event.name) else {
            return Ok(());
        };
        for entry in entries {
            entry.listener.borrow_mut().on_event(&event);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .listeners
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("Notifier")
            .field("owner", &self.owner)
            .field("listeners", &names)
            .finish()
    }
}
