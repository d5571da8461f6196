//! Events and their payloads.
//!
//! padwatch reports changes as named [`Event`] records dispatched through a
//! [`Notifier`](crate::eventbus::Notifier). Names are plain strings so callers can also
//! dispatch their own events; the ones the crate fires are listed as constants below.
//!
//! ## Manager level
//! - [`DEVICE_CONNECTED`] / [`DEVICE_DISCONNECTED`] carry a [`DeviceDetail`].
//!
//! ## Device level
//! - [`BUTTON_DOWN`] / [`BUTTON_UP`] / [`AXIS_DOWN`] / [`AXIS_UP`] carry a
//!   [`ControlDetail`]. Device events are re-dispatched on the manager after the device's
//!   own listeners have run.
//!
//! ### Payload naming
//! Axis events report the axis index in the field called `button`. The name is kept so
//! the serialized payload matches the historical wire shape; use
//! [`ControlDetail::control`] when reading it from Rust.

use crate::error::Result;
use crate::metadata::DeviceInfo;
use serde::Serialize;

pub const DEVICE_CONNECTED: &str = "deviceconnected";
pub const DEVICE_DISCONNECTED: &str = "devicedisconnected";
pub const BUTTON_DOWN: &str = "buttondown";
pub const BUTTON_UP: &str = "buttonup";
pub const AXIS_DOWN: &str = "axisdown";
pub const AXIS_UP: &str = "axisup";

/// Which object dispatched an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Manager,
    Device(usize),
}

/// Payload of `deviceconnected` / `devicedisconnected`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceDetail {
    pub gamepad: DeviceInfo,
    /// Id of a still-live record that was swapped out at the same slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<String>,
}

/// Payload of button and axis events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlDetail {
    pub gamepad: DeviceInfo,
    #[serde(rename = "controllerIndex")]
    pub controller_index: usize,
    /// Button index, or axis index for axis events.
    pub button: usize,
    /// Raw value at the time of the event.
    pub value: f32,
    /// How long the control was held, in the caller's `dt` unit. Up events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl ControlDetail {
    /// Index of the button or axis this event is about.
    #[inline]
    pub fn control(&self) -> usize {
        self.button
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Detail {
    None,
    Device(DeviceDetail),
    Control(ControlDetail),
}

/// A named event record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub name: String,
    /// Filled in by the dispatcher when left unset.
    pub target: Option<Target>,
    pub detail: Detail,
}

impl Event {
    /// A bare event with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            detail: Detail::None,
        }
    }

    pub fn with_detail(name: impl Into<String>, detail: Detail) -> Self {
        Self {
            name: name.into(),
            target: None,
            detail,
        }
    }

    pub(crate) fn device(name: &str, gamepad: DeviceInfo, replaced: Option<String>) -> Self {
        Self::with_detail(name, Detail::Device(DeviceDetail { gamepad, replaced }))
    }

    pub(crate) fn control(
        name: &str,
        gamepad: DeviceInfo,
        control: usize,
        value: f32,
        time: Option<f64>,
    ) -> Self {
        let controller_index = gamepad.index;
        Self::with_detail(
            name,
            Detail::Control(ControlDetail {
                gamepad,
                controller_index,
                button: control,
                value,
                time,
            }),
        )
    }

    /// The control payload, if this is a button or axis event.
    pub fn control_detail(&self) -> Option<&ControlDetail> {
        match &self.detail {
            Detail::Control(c) => Some(c),
            _ => None,
        }
    }

    /// The device payload, if this is a connect or disconnect event.
    pub fn device_detail(&self) -> Option<&DeviceDetail> {
        match &self.detail {
            Detail::Device(d) => Some(d),
            _ => None,
        }
    }

    /// The device this event concerns, whatever its kind.
    pub fn gamepad(&self) -> Option<&DeviceInfo> {
        match &self.detail {
            Detail::Device(d) => Some(&d.gamepad),
            Detail::Control(c) => Some(&c.gamepad),
            Detail::None => None,
        }
    }

    /// Serialize to JSON using the historical payload field names.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Event::new(name)
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Event::new(name)
    }
}
