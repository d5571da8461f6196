//! Drives a scripted virtual controller through self-driving mode.
//!
//! Run with `RUST_LOG=info cargo run --example virtual_pad`.

use padwatch::backends::virtual_input::VirtualSource;
use padwatch::{
    DeviceManager, FallbackScheduler, IntervalScheduler, LogListener, AXIS_DOWN, AXIS_UP,
    BUTTON_DOWN, BUTTON_UP, DEVICE_CONNECTED, DEVICE_DISCONNECTED,
};
use std::time::Duration;

fn main() -> padwatch::Result<()> {
    env_logger::init();

    let scheduler = FallbackScheduler::new()
        .or_else(IntervalScheduler::sixty_hz())
        .or_else(IntervalScheduler::new(Duration::from_millis(33)));
    let mut mgr = DeviceManager::new(VirtualSource::new()).with_scheduler(scheduler);

    for name in [
        DEVICE_CONNECTED,
        DEVICE_DISCONNECTED,
        BUTTON_DOWN,
        BUTTON_UP,
        AXIS_DOWN,
        AXIS_UP,
    ] {
        mgr.on(name, LogListener::new());
    }

    mgr.source_mut().plug(0, "Virtual Pad", 4, 2);
    mgr.start_polling()?;

    let mut frame = 0u32;
    while mgr.pump()? {
        frame += 1;
        if frame == 55 {
            mgr.stop_polling();
        }
        let src = mgr.source_mut();
        match frame {
            5 => src.set_button(0, 0, 1.0),
            20 => src.set_button(0, 0, 0.0),
            25 => src.set_axis(0, 1, 0.9),
            40 => src.set_axis(0, 1, 0.0),
            45 => src.set_button(0, 2, 0.8),
            50 => src.unplug(0),
            _ => {}
        }
    }

    println!("stopped after {frame} frames");
    Ok(())
}
