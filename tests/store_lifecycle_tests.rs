use std::sync::Arc;

use dockline::api::{BayId, BayStatus, CallKind, NewVehicle, QueueStatus, VehicleClass};
use dockline::bus::SyncBus;
use dockline::config::default_bays;
use dockline::store::snapshot::MemorySnapshotStore;
use dockline::store::DockStore;

fn open_store() -> DockStore {
    DockStore::open(
        Arc::new(MemorySnapshotStore::new()),
        SyncBus::new(),
        default_bays(),
    )
}

fn vehicle(class: VehicleClass, plate: &str) -> NewVehicle {
    NewVehicle {
        vehicle_class: class,
        plate_number: plate.to_string(),
        driver_name: "สมชาย".to_string(),
        company_name: "บริษัททดสอบ".to_string(),
        dc_kind: None,
        destinations: Vec::new(),
    }
}

#[test]
fn registration_preserves_order_and_id_uniqueness() {
    let store = open_store();
    let plates: Vec<String> = (0..20).map(|i| format!("plate-{i}")).collect();
    for plate in &plates {
        store.register(vehicle(VehicleClass::Fg, plate));
    }

    let queue = store.queue();
    let seen: Vec<&str> = queue.iter().map(|q| q.plate_number.as_str()).collect();
    assert_eq!(seen, plates.iter().map(String::as_str).collect::<Vec<_>>());

    let mut ids: Vec<&str> = queue.iter().map(|q| q.id.value()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), queue.len());
}

#[test]
fn registration_stamps_waiting_defaults() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Pk, "83-4455"));

    assert_eq!(item.status, QueueStatus::Waiting);
    assert_eq!(item.call_count, 0);
    assert!(!item.archived);
    assert!(item.bay_id.is_none());
    assert!(item.loading_started_at.is_none());
    assert!(item.loading_ended_at.is_none());
    assert!(item.exited_at.is_none());
}

#[test]
fn call_to_bay_marks_item_and_bay() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    let bay_id = BayId::new("FG-14-2");

    let called = store
        .call_vehicle(&item.id, Some(&bay_id), CallKind::Load)
        .unwrap();
    assert_eq!(called.status, QueueStatus::Called);
    assert_eq!(called.call_count, 1);
    assert_eq!(called.bay_id.as_ref(), Some(&bay_id));
    assert_eq!(called.last_call_kind, Some(CallKind::Load));

    let bay = store.find_bay(&bay_id).unwrap();
    assert_eq!(bay.status, BayStatus::Busy);
    assert_eq!(bay.current_queue_id.as_ref(), Some(&item.id));
}

#[test]
fn repeat_call_increments_counter_again() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    let bay_id = BayId::new("FG-13-2");

    store.call_vehicle(&item.id, Some(&bay_id), CallKind::Load);
    let again = store
        .call_vehicle(&item.id, Some(&bay_id), CallKind::Load)
        .unwrap();
    assert_eq!(again.status, QueueStatus::Called);
    assert_eq!(again.call_count, 2);
}

#[test]
fn call_for_unknown_id_is_a_silent_no_op() {
    let store = open_store();
    store.register(vehicle(VehicleClass::Rm, "10-9999"));
    let before = store.state();

    let result = store.call_vehicle(
        &dockline::api::QueueId::new("no-such-id"),
        Some(&BayId::new("RM-P1")),
        CallKind::Load,
    );
    assert!(result.is_none());
    assert_eq!(store.state(), before);
}

#[test]
fn billing_call_records_kind_without_touching_bays() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    let bays_before = store.bays();

    let called = store.call_vehicle(&item.id, None, CallKind::Bill).unwrap();
    assert_eq!(called.status, QueueStatus::Called);
    assert_eq!(called.last_call_kind, Some(CallKind::Bill));
    assert!(called.bay_id.is_none());
    assert_eq!(store.bays(), bays_before);
}

#[test]
fn finishing_releases_the_bay_but_not_the_item() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    let bay_id = BayId::new("FG-16-1");

    store.call_vehicle(&item.id, Some(&bay_id), CallKind::Load);
    store.update_status(&item.id, QueueStatus::Loading, Some(&bay_id));
    let finished = store
        .update_status(&item.id, QueueStatus::Finished, Some(&bay_id))
        .unwrap();

    assert_eq!(finished.status, QueueStatus::Finished);
    assert!(finished.loading_ended_at.is_some());

    // The bay is free for the next vehicle even though this one still
    // reads FINISHED.
    let bay = store.find_bay(&bay_id).unwrap();
    assert_eq!(bay.status, BayStatus::Idle);
    assert!(bay.current_queue_id.is_none());
}

#[test]
fn out_of_area_scan_clears_the_bay_without_a_bay_argument() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Pk, "83-4455"));
    let bay_id = BayId::new("PK-19-1");

    store.call_vehicle(&item.id, Some(&bay_id), CallKind::Load);
    store.update_status(&item.id, QueueStatus::Loading, Some(&bay_id));
    store.update_status(&item.id, QueueStatus::Finished, None);

    // Finishing without a bay argument leaves the bay claimed...
    let bay = store.find_bay(&bay_id).unwrap();
    assert_eq!(bay.current_queue_id.as_ref(), Some(&item.id));

    // ...but going out of area releases whatever still references the item.
    let released = store
        .update_status(&item.id, QueueStatus::OutOfArea, None)
        .unwrap();
    assert_eq!(released.status, QueueStatus::OutOfArea);
    assert!(released.exited_at.is_some());
    assert!(released.bay_id.is_none());

    let bay = store.find_bay(&bay_id).unwrap();
    assert_eq!(bay.status, BayStatus::Idle);
    assert!(bay.current_queue_id.is_none());
}

#[test]
fn recall_never_changes_state() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    store.call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load);
    let before = store.state();

    for _ in 0..5 {
        store.recall_vehicle(&item.id);
    }
    assert_eq!(store.state(), before);
}

#[test]
fn archive_flags_exactly_the_named_items() {
    let store = open_store();
    let a = store.register(vehicle(VehicleClass::Fg, "a"));
    let b = store.register(vehicle(VehicleClass::Pk, "b"));
    let c = store.register(vehicle(VehicleClass::Rm, "c"));

    let flagged = store.archive(&[a.id.clone(), b.id.clone()]);
    assert_eq!(flagged, 2);

    let queue = store.queue();
    let by_id = |id: &dockline::api::QueueId| queue.iter().find(|q| &q.id == id).unwrap();
    assert!(by_id(&a.id).archived);
    assert!(by_id(&b.id).archived);
    assert!(!by_id(&c.id).archived);

    // Nothing else moved.
    assert_eq!(by_id(&a.id).status, QueueStatus::Waiting);
    assert_eq!(by_id(&a.id).call_count, 0);
}

#[test]
fn clear_all_restores_the_seed_roster() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    store.call_vehicle(&item.id, Some(&BayId::new("FG-13-1")), CallKind::Load);

    store.clear_all();
    assert!(store.queue().is_empty());
    assert_eq!(store.bays(), default_bays());
}

#[test]
fn requeued_vehicle_keeps_its_entry_time() {
    let store = open_store();
    let item = store.register(vehicle(VehicleClass::Fg, "70-1122"));
    let bay_id = BayId::new("FG-13-1");
    store.call_vehicle(&item.id, Some(&bay_id), CallKind::Load);
    store.update_status(&item.id, QueueStatus::Loading, Some(&bay_id));
    store.update_status(&item.id, QueueStatus::Finished, Some(&bay_id));

    let back = store
        .update_status(&item.id, QueueStatus::Waiting, None)
        .unwrap();
    assert_eq!(back.status, QueueStatus::Waiting);
    assert_eq!(back.entered_at, item.entered_at);
    assert!(back.bay_id.is_none());
}

/// The full finished-goods walkthrough, end to end.
#[test]
fn fg_walkthrough_register_call_load_finish_exit() {
    let store = open_store();
    let bay_id = BayId::new("FG-13-1");

    let item = store.register(vehicle(VehicleClass::Fg, "1กข-1234"));
    assert_eq!(item.status, QueueStatus::Waiting);
    assert_eq!(item.call_count, 0);

    let called = store
        .call_vehicle(&item.id, Some(&bay_id), CallKind::Load)
        .unwrap();
    assert_eq!(called.status, QueueStatus::Called);
    assert_eq!(called.call_count, 1);
    assert_eq!(store.find_bay(&bay_id).unwrap().status, BayStatus::Busy);

    let loading = store
        .update_status(&item.id, QueueStatus::Loading, Some(&bay_id))
        .unwrap();
    assert_eq!(loading.status, QueueStatus::Loading);
    assert!(loading.loading_started_at.is_some());
    assert_eq!(store.find_bay(&bay_id).unwrap().status, BayStatus::Loading);

    let finished = store
        .update_status(&item.id, QueueStatus::Finished, Some(&bay_id))
        .unwrap();
    assert_eq!(finished.status, QueueStatus::Finished);
    assert!(finished.loading_ended_at.is_some());
    assert_eq!(store.find_bay(&bay_id).unwrap().status, BayStatus::Idle);

    let out = store
        .update_status(&item.id, QueueStatus::OutOfArea, None)
        .unwrap();
    assert_eq!(out.status, QueueStatus::OutOfArea);
    assert!(out.exited_at.is_some());
}
