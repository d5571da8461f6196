//! padwatch: controller events from polled device snapshots.
//!
//! Platforms typically expose controllers as a slot-indexed list of raw records that only
//! describe "what is pressed right now". padwatch diffs consecutive snapshots and turns
//! them into named events (`deviceconnected`, `devicedisconnected`, `buttondown`,
//! `buttonup`, `axisdown`, `axisup`) plus per-control hold times.
//!
//! ```
//! use padwatch::backends::virtual_input::VirtualSource;
//! use padwatch::{DeviceManager, Event, BUTTON_UP};
//!
//! let mut mgr = DeviceManager::new(VirtualSource::new());
//! mgr.on(BUTTON_UP, |ev: &Event| {
//!     let detail = ev.control_detail().unwrap();
//!     println!("button {} held for {:?}", detail.button, detail.time);
//! });
//!
//! mgr.source_mut().plug(0, "Virtual Pad", 4, 2);
//! mgr.update(16.0).unwrap(); // deviceconnected
//! mgr.source_mut().set_button(0, 0, 1.0);
//! mgr.update(16.0).unwrap(); // buttondown
//! mgr.source_mut().set_button(0, 0, 0.0);
//! let events = mgr.update(16.0).unwrap(); // buttonup after 16.0
//! assert_eq!(events[0].name, BUTTON_UP);
//! ```

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod scheduler;
pub mod snapshot;

pub use config::*;
pub use device::*;
pub use error::{Error, Result};
pub use event::*;
pub use eventbus::*;
pub use filtered_listener::FilteredListener;
pub use logger::LogListener;
pub use manager::*;
pub use metadata::DeviceInfo;
pub use scheduler::*;
pub use snapshot::*;
