//! Durability: JSON snapshots round-trip across restarts, corrupt files fall
//! back to defaults, and a dead backend costs durability, not correctness.

use std::sync::Arc;

use dockline::api::{BayId, CallKind, NewVehicle, QueueStatus, VehicleClass};
use dockline::bus::SyncBus;
use dockline::config::default_bays;
use dockline::store::snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use dockline::store::DockStore;

fn vehicle(plate: &str) -> NewVehicle {
    NewVehicle {
        vehicle_class: VehicleClass::Fg,
        plate_number: plate.to_string(),
        driver_name: "คนขับ".to_string(),
        company_name: "ซัพพลายเออร์".to_string(),
        dc_kind: Some(dockline::api::DcKind::Cp),
        destinations: vec!["ชลบุรี".to_string(), "ขอนแก่น".to_string()],
    }
}

#[test]
fn file_snapshots_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let bus = SyncBus::new();

    let state_before = {
        let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
        let store = DockStore::open(snapshots, bus.clone(), default_bays());
        let item = store.register(vehicle("1กข-1234"));
        store.call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load);
        store.update_status(&item.id, QueueStatus::Loading, Some(&BayId::new("FG-13-1")));
        store.state()
    };

    let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
    let reopened = DockStore::open(snapshots, bus, default_bays());
    assert_eq!(reopened.state(), state_before);
}

#[test]
fn mute_preference_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let bus = SyncBus::new();

    {
        let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
        let store = DockStore::open(snapshots, bus.clone(), default_bays());
        assert!(store.toggle_mute());
    }

    let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
    let reopened = DockStore::open(snapshots, bus, default_bays());
    assert!(reopened.muted());
}

#[test]
fn corrupt_queue_file_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("queue.json"), b"{ not json").unwrap();
    std::fs::write(dir.path().join("bays.json"), b"also not json").unwrap();

    let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
    let store = DockStore::open(snapshots, SyncBus::new(), default_bays());

    assert!(store.queue().is_empty());
    assert_eq!(store.bays(), default_bays());
    assert!(!store.muted());
}

#[test]
fn missing_files_read_as_nothing_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = FileSnapshotStore::open(dir.path()).unwrap();
    assert!(snapshots.load_queue().unwrap().is_none());
    assert!(snapshots.load_bays().unwrap().is_none());
    assert!(snapshots.load_muted().unwrap().is_none());
}

#[test]
fn dead_backend_loses_durability_but_not_state() {
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let store = DockStore::open(
        Arc::clone(&snapshots) as Arc<dyn SnapshotStore>,
        SyncBus::new(),
        default_bays(),
    );

    snapshots.set_failing(true);

    // Mutations still apply in memory; nothing panics, nothing errors.
    let item = store.register(vehicle("1กข-1234"));
    let called = store
        .call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load)
        .unwrap();
    assert_eq!(called.status, QueueStatus::Called);
    assert!(store.toggle_mute());
    assert_eq!(store.queue().len(), 1);

    // But nothing reached the backend.
    snapshots.set_failing(false);
    assert!(snapshots.load_queue().unwrap().is_none());
    assert!(snapshots.load_muted().unwrap().is_none());
}

#[test]
fn wire_format_is_plain_json() {
    let dir = tempfile::tempdir().unwrap();
    {
        let snapshots = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
        let store = DockStore::open(snapshots, SyncBus::new(), default_bays());
        store.register(vehicle("1กข-1234"));
    }

    let raw = std::fs::read_to_string(dir.path().join("queue.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &parsed.as_array().unwrap()[0];
    assert_eq!(entry["status"], "WAITING");
    assert_eq!(entry["vehicle_class"], "FG");
    assert_eq!(entry["plate_number"], "1กข-1234");
    assert_eq!(entry["call_count"], 0);
}
