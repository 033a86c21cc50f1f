//! Public domain types for the dock queue backend.
//!
//! This file consolidates the types shared by the store, the guard layer,
//! the view models and the HTTP API. All types derive Serialize/Deserialize
//! so they travel through snapshots, the sync bus and JSON responses
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue entry identifier.
///
/// Opaque and unique within a deployment; generated from a UUID at
/// registration time. Not meant to be cryptographically unpredictable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueId(pub String);

/// Loading bay identifier, fixed by the roster (e.g. `FG-13-1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BayId(pub String);

impl QueueId {
    pub fn new(value: impl Into<String>) -> Self {
        QueueId(value.into())
    }

    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        QueueId(uuid::Uuid::new_v4().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl BayId {
    pub fn new(value: impl Into<String>) -> Self {
        BayId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for BayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vehicle handling category. A bay serves exactly one class for its whole
/// lifetime; a vehicle keeps its class for the whole visit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleClass {
    /// Finished goods pickup.
    Fg,
    /// Package handling.
    Pk,
    /// Raw material delivery.
    Rm,
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VehicleClass::Fg => "FG",
            VehicleClass::Pk => "PK",
            VehicleClass::Rm => "RM",
        };
        write!(f, "{}", s)
    }
}

/// Visit lifecycle status.
///
/// `Completed` is a reserved value: it deserializes fine for forward
/// compatibility, but no operation produces it and no transition reaches it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Waiting,
    Called,
    Loading,
    Finished,
    Completed,
    OutOfArea,
}

impl QueueStatus {
    /// Whether moving from `self` to `next` is a legal lifecycle step.
    ///
    /// `Called -> Called` is the repeat-call loop (the call counter moves,
    /// nothing else does). The `* -> Waiting` edges are the re-queue loops;
    /// whether a given vehicle class may take them is the guard layer's
    /// concern, not the table's.
    pub fn can_transition(self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Waiting, Called)
                | (Called, Called)
                | (Called, Loading)
                | (Loading, Finished)
                | (Finished, Waiting)
                | (Finished, OutOfArea)
                | (OutOfArea, Waiting)
        )
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QueueStatus::Waiting => "WAITING",
            QueueStatus::Called => "CALLED",
            QueueStatus::Loading => "LOADING",
            QueueStatus::Finished => "FINISHED",
            QueueStatus::Completed => "COMPLETED",
            QueueStatus::OutOfArea => "OUT_OF_AREA",
        };
        write!(f, "{}", s)
    }
}

/// What a vehicle was called for: a bay slot or billing paperwork.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallKind {
    Load,
    Bill,
}

/// Destination-center kind for finished-goods runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DcKind {
    #[serde(rename = "CP")]
    Cp,
    General,
}

/// Bay occupancy status. `Idle` if and only if no queue entry is referenced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BayStatus {
    Idle,
    Busy,
    Loading,
}

/// One vehicle's visit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueId,
    pub vehicle_class: VehicleClass,
    pub plate_number: String,
    pub driver_name: String,
    pub company_name: String,
    /// Destination-center kind, when the registration captured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc_kind: Option<DcKind>,
    /// Destination DCs / customers selected at registration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<String>,
    /// Set exactly once, at registration. Never cleared.
    pub entered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<DateTime<Utc>>,
    pub status: QueueStatus,
    /// Present only while the vehicle occupies a bay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bay_id: Option<BayId>,
    /// Number of times the vehicle has been called. Monotonic.
    pub call_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_call_kind: Option<CallKind>,
    /// Moved from the daily report view into the monthly one.
    #[serde(default)]
    pub archived: bool,
}

/// Registration fields for a new visit. Everything the kiosk form collects;
/// the store fills in identity, timestamps and lifecycle fields itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
    pub vehicle_class: VehicleClass,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub dc_kind: Option<DcKind>,
    #[serde(default)]
    pub destinations: Vec<String>,
}

/// One physical loading/unloading position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bay {
    pub id: BayId,
    /// Door or location label (e.g. `13`, `โรงA`).
    pub door: String,
    /// Display label for the board (e.g. `ช่อง 1`).
    pub label: String,
    pub vehicle_class: VehicleClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_queue_id: Option<QueueId>,
    pub status: BayStatus,
}

impl Bay {
    pub fn is_idle(&self) -> bool {
        self.status == BayStatus::Idle
    }
}

/// Read-only snapshot of the whole shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub queue: Vec<QueueItem>,
    pub bays: Vec<Bay>,
}
