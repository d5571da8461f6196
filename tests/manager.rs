use padwatch::backends::virtual_input::VirtualSource;
use padwatch::{
    DetectMode, DeviceManager, Error, Event, ManagerConfig, RawDevice, ScriptedScheduler, Target,
    AXIS_DOWN, BUTTON_DOWN, BUTTON_UP, DEVICE_CONNECTED, DEVICE_DISCONNECTED,
};
use std::cell::RefCell;
use std::rc::Rc;

fn names(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.name.as_str()).collect()
}

fn connected_id(event: &Event) -> &str {
    &event.device_detail().unwrap().gamepad.id
}

#[test]
fn poll_mode_reconciles_slot_presence() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    assert!(mgr.needs_poll());

    // absent
    mgr.source_mut().plug(0, "A", 2, 2);
    mgr.source_mut().unplug(0);
    assert!(mgr.update(16.0).unwrap().is_empty());

    // present(A)
    mgr.source_mut().plug(0, "A", 2, 2);
    let events = mgr.update(16.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert_eq!(connected_id(&events[0]), "A");

    // present(A)
    assert!(mgr.update(16.0).unwrap().is_empty());

    // absent
    mgr.source_mut().unplug(0);
    let events = mgr.update(16.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_DISCONNECTED]);
    assert_eq!(connected_id(&events[0]), "A");
    assert_eq!(mgr.get_device(0).map(|d| d.id()), Some("A"));

    // present(B): the retired record is replaced without a warning
    mgr.source_mut().plug(0, "B", 2, 2);
    let events = mgr.update(16.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert_eq!(connected_id(&events[0]), "B");
    assert_eq!(events[0].device_detail().unwrap().replaced, None);
    assert_eq!(mgr.get_device(0).map(|d| d.id()), Some("B"));
}

#[test]
fn reconnect_with_same_id_reuses_record() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "A", 1, 0);
    mgr.update(1.0).unwrap();
    mgr.source_mut().unplug(0);
    mgr.update(1.0).unwrap();
    assert!(mgr.get_device(0).unwrap().is_retired());

    mgr.source_mut().plug(0, "A", 1, 0);
    let events = mgr.update(1.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert!(!mgr.get_device(0).unwrap().is_retired());
}

#[test]
fn push_mode_flags_a_live_swap() {
    let mut mgr = DeviceManager::new(VirtualSource::with_hotplug());
    assert!(!mgr.needs_poll());

    mgr.source_mut().plug(0, "A", 1, 1);
    assert_eq!(names(&mgr.update(1.0).unwrap()), vec![DEVICE_CONNECTED]);

    mgr.source_mut().plug(0, "B", 1, 1);
    let events = mgr.update(1.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    let detail = events[0].device_detail().unwrap();
    assert_eq!(detail.gamepad.id, "B");
    assert_eq!(detail.replaced.as_deref(), Some("A"));
}

#[test]
fn push_mode_disconnect_releases_held_controls_first() {
    let mut mgr = DeviceManager::new(VirtualSource::with_hotplug());
    mgr.source_mut().plug(0, "A", 1, 0);
    mgr.source_mut().set_button(0, 0, 1.0);
    assert_eq!(
        names(&mgr.update(16.0).unwrap()),
        vec![DEVICE_CONNECTED, BUTTON_DOWN]
    );

    mgr.source_mut().unplug(0);
    let events = mgr.update(16.0).unwrap();
    assert_eq!(names(&events), vec![BUTTON_UP, DEVICE_DISCONNECTED]);
    assert_eq!(events[0].control_detail().unwrap().time, Some(16.0));
    assert_eq!(mgr.get_device(0).unwrap().button_down_time(0), 0.0);
}

#[test]
fn direct_notifications_bypass_the_source() {
    let mut mgr = DeviceManager::new(VirtualSource::with_hotplug());
    let events = mgr.handle_connected(&RawDevice::new(3, "X", 1, 1)).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert_eq!(mgr.devices().len(), 4);
    assert!(mgr.devices()[..3].iter().all(Option::is_none));

    let events = mgr.handle_disconnected(3).unwrap();
    assert_eq!(names(&events), vec![DEVICE_DISCONNECTED]);
    assert!(mgr.handle_disconnected(9).unwrap().is_empty());
}

#[test]
fn direct_notifications_are_ignored_in_poll_mode() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    assert!(mgr.needs_poll());

    assert!(mgr.handle_connected(&RawDevice::new(0, "A", 1, 0)).unwrap().is_empty());
    assert!(mgr.get_device(0).is_none());

    mgr.source_mut().plug(0, "A", 1, 0);
    let events = mgr.update(1.0).unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert!(mgr.update(1.0).unwrap().is_empty());

    assert!(mgr.handle_disconnected(0).unwrap().is_empty());
    assert!(!mgr.get_device(0).unwrap().is_retired());
    assert!(mgr.update(1.0).unwrap().is_empty());
}

#[test]
fn button_scenario_through_the_manager() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "pad", 1, 0);
    let mut fired = Vec::new();

    for value in [0.0, 0.6, 0.6, 0.3] {
        mgr.source_mut().set_button(0, 0, value);
        let events = mgr.update(16.0).unwrap();
        let down_time = mgr.pad(0).unwrap().button_down_time(0);
        fired.push((events, down_time));
    }

    assert_eq!(names(&fired[0].0), vec![DEVICE_CONNECTED]);
    assert_eq!(names(&fired[1].0), vec![BUTTON_DOWN]);
    assert_eq!(fired[1].0[0].control_detail().unwrap().value, 0.6);
    assert_eq!(fired[1].1, 16.0);
    assert!(fired[2].0.is_empty());
    assert_eq!(fired[2].1, 32.0);
    assert_eq!(names(&fired[3].0), vec![BUTTON_UP]);
    assert_eq!(fired[3].0[0].control_detail().unwrap().time, Some(32.0));
    assert_eq!(fired[3].1, 0.0);
}

#[test]
fn axis_scenario_through_the_manager() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "pad", 0, 1);

    mgr.update(10.0).unwrap();
    mgr.source_mut().set_axis(0, 0, 0.9);
    let events = mgr.update(10.0).unwrap();
    assert_eq!(names(&events), vec![AXIS_DOWN]);
    assert_eq!(mgr.pad(0).unwrap().axis_down_time(0), 0.0);

    mgr.update(10.0).unwrap();
    assert_eq!(mgr.pad(0).unwrap().axis_down_time(0), 10.0);
}

#[test]
fn threshold_change_applies_to_all_devices_immediately() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    for slot in 0..2 {
        mgr.source_mut().plug(slot, "pad", 1, 0);
        mgr.source_mut().set_button(slot, 0, 0.4);
    }
    mgr.update(1.0).unwrap();
    assert!(mgr.pads().all(|pad| !pad.is_button_pushed(0)));

    mgr.set_button_threshold(0.3).unwrap();
    assert!(mgr.pads().all(|pad| pad.is_button_pushed(0)));
    let events = mgr.update(1.0).unwrap();
    assert_eq!(names(&events), vec![BUTTON_DOWN, BUTTON_DOWN]);
}

#[test]
fn thresholds_outside_unit_interval_are_rejected() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    assert!(matches!(
        mgr.set_axis_threshold(1.0),
        Err(Error::InvalidThreshold { which: "axis", .. })
    ));
    assert!(mgr.set_button_threshold(-0.1).is_err());
    assert_eq!(mgr.axis_threshold(), 0.75);
    assert_eq!(mgr.button_threshold(), 0.5);
}

#[test]
fn device_events_reach_device_then_manager_listeners() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "pad", 1, 0);
    mgr.update(1.0).unwrap();

    let sink = Rc::clone(&order);
    mgr.on(BUTTON_DOWN, move |ev: &Event| sink.borrow_mut().push(("manager", ev.target)));
    let sink = Rc::clone(&order);
    mgr.device_mut(0)
        .unwrap()
        .on(BUTTON_DOWN, move |ev: &Event| sink.borrow_mut().push(("device", ev.target)));

    mgr.source_mut().set_button(0, 0, 1.0);
    mgr.update(1.0).unwrap();
    assert_eq!(
        *order.borrow(),
        vec![
            ("device", Some(Target::Device(0))),
            ("manager", Some(Target::Device(0)))
        ]
    );
}

#[test]
fn connect_events_target_the_manager() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut mgr = DeviceManager::new(VirtualSource::new());
    let sink = Rc::clone(&seen);
    let id = mgr.on(DEVICE_CONNECTED, move |ev: &Event| sink.borrow_mut().push(ev.target));

    mgr.source_mut().plug(0, "pad", 0, 0);
    let events = mgr.update(1.0).unwrap();
    assert_eq!(events[0].target, Some(Target::Manager));
    assert_eq!(*seen.borrow(), vec![Some(Target::Manager)]);

    mgr.off(DEVICE_CONNECTED, id);
    mgr.source_mut().plug(1, "pad", 0, 0);
    mgr.update(1.0).unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn shrinking_snapshot_counts_as_disconnect() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(1, "pad", 0, 0);
    assert_eq!(names(&mgr.update(1.0).unwrap()), vec![DEVICE_CONNECTED]);

    mgr.source_mut().truncate(0);
    assert_eq!(names(&mgr.update(1.0).unwrap()), vec![DEVICE_DISCONNECTED]);
}

#[test]
fn empty_slot_reads_zero_but_keeps_identity() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "pad", 2, 1);
    mgr.source_mut().set_button(0, 1, 0.8);
    mgr.update(1.0).unwrap();
    assert!(mgr.pad(0).unwrap().connected());

    mgr.source_mut().unplug(0);
    mgr.update(1.0).unwrap();
    let pad = mgr.pad(0).unwrap();
    assert!(!pad.connected());
    assert_eq!(pad.button(1), 0.0);
    assert_eq!(pad.id(), "pad");
    assert_eq!(pad.num_buttons(), 2);
    assert_eq!(pad.num_axes(), 1);
    assert!(mgr.pad(5).is_none());
}

#[test]
fn unsupported_platform_makes_polling_a_no_op() {
    let mut mgr = DeviceManager::new(VirtualSource::unsupported())
        .with_scheduler(ScriptedScheduler::new([1.0]));
    mgr.source_mut().plug(0, "pad", 1, 1);

    assert!(!mgr.supported());
    assert!(mgr.update(1.0).unwrap().is_empty());
    assert!(mgr.start_polling().unwrap().is_empty());
    assert!(!mgr.polling());
    assert!(!mgr.pump().unwrap());
    assert!(mgr.devices().is_empty());
}

#[test]
fn self_driving_mode_measures_frame_deltas() {
    let mut mgr = DeviceManager::new(VirtualSource::new())
        .with_scheduler(ScriptedScheduler::new([100.0, 116.0, 150.0]));
    mgr.source_mut().plug(0, "pad", 1, 0);
    mgr.source_mut().set_button(0, 0, 1.0);

    let events = mgr.start_polling().unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED, BUTTON_DOWN]);
    assert!(mgr.polling());
    assert!(mgr.start_polling().unwrap().is_empty());

    assert!(mgr.pump().unwrap()); // first frame: dt = 0
    assert_eq!(mgr.pad(0).unwrap().button_down_time(0), 0.0);
    assert!(mgr.pump().unwrap()); // dt = 16
    assert_eq!(mgr.pad(0).unwrap().button_down_time(0), 16.0);

    mgr.stop_polling();
    assert!(!mgr.polling());
    assert!(mgr.pump().unwrap(), "the frame requested before stopping still runs");
    assert!(!mgr.pump().unwrap());
}

#[test]
fn listener_can_stop_polling_through_the_token() {
    let mut mgr = DeviceManager::new(VirtualSource::new())
        .with_scheduler(ScriptedScheduler::new([1.0, 2.0]));
    let token = mgr.polling_token();
    mgr.on(BUTTON_DOWN, move |_: &Event| token.cancel());
    mgr.source_mut().plug(0, "pad", 1, 0);
    mgr.source_mut().set_button(0, 0, 1.0);

    mgr.start_polling().unwrap();
    assert!(!mgr.polling());
    assert!(!mgr.pump().unwrap());
}

#[test]
fn polling_without_scheduler_turns_itself_off() {
    let mut mgr = DeviceManager::new(VirtualSource::new());
    mgr.source_mut().plug(0, "pad", 0, 0);
    let events = mgr.start_polling().unwrap();
    assert_eq!(names(&events), vec![DEVICE_CONNECTED]);
    assert!(!mgr.polling());

    let mut mgr = DeviceManager::new(VirtualSource::new())
        .with_scheduler(ScriptedScheduler::refusing());
    mgr.start_polling().unwrap();
    assert!(!mgr.polling());
    // update-driven mode keeps working
    mgr.source_mut().plug(0, "pad", 0, 0);
    assert_eq!(names(&mgr.update(1.0).unwrap()), vec![DEVICE_CONNECTED]);
}

#[test]
fn config_can_force_poll_mode() {
    let config = ManagerConfig {
        mode: DetectMode::Poll,
        axis_threshold: 0.5,
        ..ManagerConfig::default()
    };
    let mut mgr = DeviceManager::with_config(VirtualSource::with_hotplug(), &config).unwrap();
    assert!(mgr.needs_poll());
    assert_eq!(mgr.axis_threshold(), 0.5);

    mgr.source_mut().plug(0, "pad", 0, 1);
    mgr.source_mut().set_axis(0, 0, 0.6);
    assert_eq!(
        names(&mgr.update(1.0).unwrap()),
        vec![DEVICE_CONNECTED, AXIS_DOWN]
    );
}

#[test]
fn invalid_config_is_rejected() {
    let config = ManagerConfig {
        button_threshold: 2.0,
        ..ManagerConfig::default()
    };
    assert!(DeviceManager::with_config(VirtualSource::new(), &config).is_err());
}
