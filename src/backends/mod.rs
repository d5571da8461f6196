//! Snapshot sources for `padwatch`.
//!
//! Implementations of [`SnapshotSource`](crate::snapshot::SnapshotSource) for concrete
//! input providers.
//!
//! # Feature flags
//! - **`gilrs`**: real controllers through the `gilrs` crate, with pushed
//!   connect/disconnect notifications.
//!
//! [`virtual_input::VirtualSource`] is always available; it is a scriptable in-memory
//! source used for tests, replays and demos.

pub mod virtual_input;

#[cfg(feature = "gilrs")]
#[cfg_attr(docsrs, doc(cfg(feature = "gilrs")))]
pub mod gilrs_input;
