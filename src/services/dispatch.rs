//! Staff dispatch actions with the guard checks the store leaves out.
//!
//! Mirrors the rules the staff console enforces before touching shared
//! state: a loading call needs an idle bay of the vehicle's class, billing
//! calls exist only for finished-goods vehicles, and only FG/PK vehicles
//! have a re-entry path back into the queue.

use crate::api::{BayId, CallKind, QueueId, QueueItem, QueueStatus, VehicleClass};
use crate::store::DockStore;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// User-visible rejections. These never come out of the store itself.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("vehicle {0} not found")]
    UnknownVehicle(QueueId),

    #[error("bay {0} not found")]
    UnknownBay(BayId),

    #[error("a bay must be selected for a loading call")]
    BaySelectionRequired,

    #[error("bay {0} is occupied")]
    BayOccupied(BayId),

    #[error("bay {bay} serves {bay_class} vehicles, not {vehicle_class}")]
    ClassMismatch {
        bay: BayId,
        bay_class: VehicleClass,
        vehicle_class: VehicleClass,
    },

    #[error("vehicle {id} is {actual}, expected {expected}")]
    WrongStatus {
        id: QueueId,
        actual: QueueStatus,
        expected: QueueStatus,
    },

    #[error("billing calls are limited to finished-goods vehicles")]
    BillingUnavailable,

    #[error("status {0} cannot be requested directly")]
    UnsupportedTarget(QueueStatus),

    #[error("{0} vehicles have no re-entry path")]
    ReentryUnavailable(VehicleClass),
}

fn lookup(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    store
        .find_vehicle(id)
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

fn expect_status(item: &QueueItem, expected: QueueStatus) -> DispatchResult<()> {
    if item.status == expected {
        Ok(())
    } else {
        Err(DispatchError::WrongStatus {
            id: item.id.clone(),
            actual: item.status,
            expected,
        })
    }
}

/// Call a waiting vehicle to a bay.
///
/// The bay must exist, be idle and serve the vehicle's class. A repeat call
/// for a vehicle already `Called` is allowed (the counter moves again).
pub fn call_to_bay(store: &DockStore, id: &QueueId, bay_id: &BayId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    if !matches!(item.status, QueueStatus::Waiting | QueueStatus::Called) {
        return Err(DispatchError::WrongStatus {
            id: item.id,
            actual: item.status,
            expected: QueueStatus::Waiting,
        });
    }

    let bay = store
        .find_bay(bay_id)
        .ok_or_else(|| DispatchError::UnknownBay(bay_id.clone()))?;
    if !bay.is_idle() && bay.current_queue_id.as_ref() != Some(id) {
        return Err(DispatchError::BayOccupied(bay.id));
    }
    if bay.vehicle_class != item.vehicle_class {
        return Err(DispatchError::ClassMismatch {
            bay: bay.id,
            bay_class: bay.vehicle_class,
            vehicle_class: item.vehicle_class,
        });
    }

    store
        .call_vehicle(id, Some(bay_id), CallKind::Load)
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// Call a finished-goods vehicle for billing paperwork. No bay involved.
pub fn call_for_billing(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    if item.vehicle_class != VehicleClass::Fg {
        return Err(DispatchError::BillingUnavailable);
    }
    if !matches!(item.status, QueueStatus::Waiting | QueueStatus::Called) {
        return Err(DispatchError::WrongStatus {
            id: item.id,
            actual: item.status,
            expected: QueueStatus::Waiting,
        });
    }

    store
        .call_vehicle(id, None, CallKind::Bill)
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// Re-trigger the call alert for a vehicle that is already called.
pub fn recall(store: &DockStore, id: &QueueId) -> DispatchResult<()> {
    let item = lookup(store, id)?;
    expect_status(&item, QueueStatus::Called)?;
    store.recall_vehicle(id);
    Ok(())
}

/// Loading has begun at the vehicle's bay.
pub fn start_loading(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    expect_status(&item, QueueStatus::Called)?;
    store
        .update_status(id, QueueStatus::Loading, item.bay_id.as_ref())
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// Loading is done; the bay frees up while the vehicle settles paperwork.
pub fn finish_loading(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    expect_status(&item, QueueStatus::Loading)?;
    store
        .update_status(id, QueueStatus::Finished, item.bay_id.as_ref())
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// The vehicle has left the controlled area.
pub fn release_vehicle(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    expect_status(&item, QueueStatus::Finished)?;
    store
        .update_status(id, QueueStatus::OutOfArea, None)
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// Put a finished or departed vehicle back in the queue for another pass.
/// FG and PK only; raw material trucks make a single visit.
pub fn requeue(store: &DockStore, id: &QueueId) -> DispatchResult<QueueItem> {
    let item = lookup(store, id)?;
    if item.vehicle_class == VehicleClass::Rm {
        return Err(DispatchError::ReentryUnavailable(item.vehicle_class));
    }
    if !matches!(item.status, QueueStatus::Finished | QueueStatus::OutOfArea) {
        return Err(DispatchError::WrongStatus {
            id: item.id,
            actual: item.status,
            expected: QueueStatus::Finished,
        });
    }
    store
        .update_status(id, QueueStatus::Waiting, None)
        .ok_or_else(|| DispatchError::UnknownVehicle(id.clone()))
}

/// Route a target-status request to the matching staff action.
///
/// The HTTP status endpoint speaks in target statuses, same as the store;
/// this keeps the guard rules in force for that surface too.
pub fn advance(
    store: &DockStore,
    id: &QueueId,
    next: QueueStatus,
) -> DispatchResult<QueueItem> {
    match next {
        QueueStatus::Loading => start_loading(store, id),
        QueueStatus::Finished => finish_loading(store, id),
        QueueStatus::OutOfArea => release_vehicle(store, id),
        QueueStatus::Waiting => requeue(store, id),
        // Calls go through the call operations; nothing produces Completed.
        QueueStatus::Called | QueueStatus::Completed => {
            Err(DispatchError::UnsupportedTarget(next))
        }
    }
}
