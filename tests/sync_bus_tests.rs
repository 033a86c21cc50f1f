//! Cross-instance sync behavior: two stores sharing one bus behave like two
//! browser tabs sharing a broadcast channel.

use std::sync::Arc;

use dockline::api::{BayId, CallKind, NewVehicle, QueueStatus, VehicleClass};
use dockline::bus::{Envelope, QueueEvent, SyncBus};
use dockline::config::default_bays;
use dockline::store::snapshot::MemorySnapshotStore;
use dockline::store::DockStore;

fn open_instance(bus: &SyncBus) -> DockStore {
    DockStore::open(
        Arc::new(MemorySnapshotStore::new()),
        bus.clone(),
        default_bays(),
    )
}

fn vehicle(plate: &str) -> NewVehicle {
    NewVehicle {
        vehicle_class: VehicleClass::Fg,
        plate_number: plate.to_string(),
        driver_name: String::new(),
        company_name: String::new(),
        dc_kind: None,
        destinations: Vec::new(),
    }
}

/// Deliver everything currently pending on `sub` to `store`.
fn pump(store: &DockStore, sub: &mut dockline::bus::Subscription) {
    while let Some(envelope) = sub.try_recv() {
        store.handle_envelope(envelope);
    }
}

#[test]
fn peer_instance_adopts_broadcast_state() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let b = open_instance(&bus);
    let mut b_sub = bus.subscribe();

    let item = a.register(vehicle("1กข-1234"));
    a.call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load);

    assert!(b.queue().is_empty());
    pump(&b, &mut b_sub);

    assert_eq!(b.state(), a.state());
    assert_eq!(b.queue()[0].status, QueueStatus::Called);
}

#[test]
fn own_broadcasts_are_skipped() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let mut a_sub = bus.subscribe();

    a.register(vehicle("1กข-1234"));
    let after_register = a.state();

    // Feeding the instance its own broadcast changes nothing.
    pump(&a, &mut a_sub);
    assert_eq!(a.state(), after_register);
}

#[test]
fn last_writer_wins_at_snapshot_granularity() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let b = open_instance(&bus);
    let mut a_sub = bus.subscribe();

    // Concurrent writes: A registers, and B registers before A's broadcast
    // reaches it. B's snapshot therefore does not contain A's entry.
    a.register(vehicle("from-a"));
    b.register(vehicle("from-b"));

    // B's later broadcast overwrites A's state wholesale; A's own
    // concurrent change is silently discarded. There is no merge.
    pump(&a, &mut a_sub);

    let plates: Vec<String> = a.queue().iter().map(|q| q.plate_number.clone()).collect();
    assert_eq!(plates, vec!["from-b".to_string()]);
}

#[test]
fn call_emits_alert_event_before_the_sync() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let mut sub = bus.subscribe();

    let item = a.register(vehicle("1กข-1234"));
    // Drain the registration sync.
    while sub.try_recv().is_some() {}

    a.call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load);

    let first = sub.try_recv().expect("call event");
    match first.event {
        QueueEvent::VehicleCalled { id, bay_id, kind } => {
            assert_eq!(id, item.id);
            assert_eq!(bay_id, Some(BayId::new("FG-13-1")));
            assert_eq!(kind, CallKind::Load);
        }
        other => panic!("expected call event, got {other:?}"),
    }

    let second = sub.try_recv().expect("state sync");
    assert!(matches!(second.event, QueueEvent::StateSync { .. }));
    assert!(sub.try_recv().is_none());
}

#[test]
fn recall_emits_only_the_alert_event() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let item = a.register(vehicle("1กข-1234"));
    a.call_vehicle(&item.id, None, CallKind::Bill);

    let mut sub = bus.subscribe();
    a.recall_vehicle(&item.id);

    let only = sub.try_recv().expect("recall event");
    assert!(matches!(only.event, QueueEvent::VehicleRecalled { .. }));
    assert!(sub.try_recv().is_none());
}

#[test]
fn mute_preference_is_not_broadcast() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let mut sub = bus.subscribe();

    assert!(a.toggle_mute());
    assert!(sub.try_recv().is_none());

    // And it stays local to the instance.
    let b = open_instance(&bus);
    assert!(!b.muted());
}

#[test]
fn alert_events_do_not_mutate_peer_state() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let before = a.state();

    a.handle_envelope(Envelope {
        origin: dockline::bus::InstanceId::generate(),
        event: QueueEvent::VehicleRecalled {
            id: dockline::api::QueueId::new("whatever"),
        },
    });
    assert_eq!(a.state(), before);
}

#[tokio::test]
async fn forwarder_applies_peer_broadcasts() {
    let bus = SyncBus::new();
    let a = open_instance(&bus);
    let b = Arc::new(open_instance(&bus));
    let handle = dockline::bus::spawn_forwarder(Arc::clone(&b), bus.subscribe());

    a.register(vehicle("1กข-1234"));

    // The forwarder runs on the runtime; give it a moment to drain.
    for _ in 0..50 {
        if !b.queue().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(b.queue().len(), 1);
    handle.abort();
}
