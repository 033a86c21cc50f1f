//! Display-board view model.
//!
//! The hall screen shows three sections (FG, PK, RM), each section's bays
//! grouped by door in roster order, a short waiting list and the vehicles
//! currently called for billing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Bay, BayId, BayStatus, CallKind, QueueStatus, StateSnapshot, VehicleClass};
use crate::store::DockStore;

/// Waiting entries shown before the list is cut off.
pub const WAITING_LIMIT: usize = 8;
/// Billing calls shown before the list is cut off.
pub const BILLING_LIMIT: usize = 3;

/// What the slot tells the driver whose plate it shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotNotice {
    /// Called: please proceed to the bay.
    EnterBay,
    /// Loading in progress.
    Loading,
}

/// One bay cell on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaySlot {
    pub bay_id: BayId,
    pub label: String,
    pub status: BayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<SlotNotice>,
}

/// Bays sharing one physical door.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorGroup {
    pub door: String,
    pub slots: Vec<BaySlot>,
}

/// One vehicle-class section of the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSection {
    pub vehicle_class: VehicleClass,
    pub doors: Vec<DoorGroup>,
}

/// A row in the waiting-queue strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingEntry {
    pub plate_number: String,
    pub vehicle_class: VehicleClass,
    pub entered_at: DateTime<Utc>,
}

/// A row in the billing-call strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEntry {
    pub plate_number: String,
    pub call_count: u32,
}

/// Everything the display board renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub sections: Vec<BoardSection>,
    pub waiting: Vec<WaitingEntry>,
    pub billing_calls: Vec<BillingEntry>,
    pub generated_at: DateTime<Utc>,
}

/// Build the board from the store's current state.
pub fn board_snapshot(store: &DockStore) -> BoardSnapshot {
    build_board(&store.state(), Utc::now())
}

fn build_board(state: &StateSnapshot, now: DateTime<Utc>) -> BoardSnapshot {
    let sections = [VehicleClass::Fg, VehicleClass::Pk, VehicleClass::Rm]
        .into_iter()
        .map(|class| BoardSection {
            vehicle_class: class,
            doors: door_groups(state, class),
        })
        .collect();

    let waiting = state
        .queue
        .iter()
        .filter(|q| q.status == QueueStatus::Waiting)
        .take(WAITING_LIMIT)
        .map(|q| WaitingEntry {
            plate_number: q.plate_number.clone(),
            vehicle_class: q.vehicle_class,
            entered_at: q.entered_at,
        })
        .collect();

    let billing_calls = state
        .queue
        .iter()
        .filter(|q| q.status == QueueStatus::Called && q.last_call_kind == Some(CallKind::Bill))
        .take(BILLING_LIMIT)
        .map(|q| BillingEntry {
            plate_number: q.plate_number.clone(),
            call_count: q.call_count,
        })
        .collect();

    BoardSnapshot {
        sections,
        waiting,
        billing_calls,
        generated_at: now,
    }
}

fn door_groups(state: &StateSnapshot, class: VehicleClass) -> Vec<DoorGroup> {
    let class_bays: Vec<&Bay> = state
        .bays
        .iter()
        .filter(|b| b.vehicle_class == class)
        .collect();

    // Door order follows roster order, first occurrence wins.
    let mut doors: Vec<String> = Vec::new();
    for bay in &class_bays {
        if !doors.contains(&bay.door) {
            doors.push(bay.door.clone());
        }
    }

    doors
        .into_iter()
        .map(|door| DoorGroup {
            slots: class_bays
                .iter()
                .filter(|b| b.door == door)
                .map(|b| slot(state, b))
                .collect(),
            door,
        })
        .collect()
}

fn slot(state: &StateSnapshot, bay: &Bay) -> BaySlot {
    let occupant = bay
        .current_queue_id
        .as_ref()
        .and_then(|id| state.queue.iter().find(|q| &q.id == id));
    BaySlot {
        bay_id: bay.id.clone(),
        label: bay.label.clone(),
        status: bay.status,
        plate_number: occupant.map(|q| q.plate_number.clone()),
        notice: occupant.map(|q| {
            if q.status == QueueStatus::Called {
                SlotNotice::EnterBay
            } else {
                SlotNotice::Loading
            }
        }),
    }
}
