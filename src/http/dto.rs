//! Data Transfer Objects for the HTTP API.
//!
//! Domain types already derive Serialize/Deserialize and go over the wire
//! as they are; what lives here are the request envelopes and the few
//! response wrappers that exist only for the API.

use serde::{Deserialize, Serialize};

use crate::api::{CallKind, DcKind, QueueItem, QueueStatus, VehicleClass};

// Re-export the shapes handlers respond with.
pub use crate::api::{NewVehicle, StateSnapshot};
pub use crate::views::board::BoardSnapshot;
pub use crate::views::report::{ExportOutcome, ReportPeriod, ReportRow};

/// Request body for calling a vehicle forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    /// Target bay. Required for loading calls, absent for billing calls.
    #[serde(default)]
    pub bay_id: Option<String>,
    #[serde(default = "default_call_kind")]
    pub kind: CallKind,
}

fn default_call_kind() -> CallKind {
    CallKind::Load
}

/// Request body for advancing a vehicle's lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: QueueStatus,
}

/// Request body for archiving a batch of queue entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub ids: Vec<String>,
}

/// Response for an archive request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub archived: usize,
}

/// Query parameters for the report endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
    /// Optional vehicle-class filter.
    #[serde(default)]
    pub class: Option<VehicleClass>,
}

/// Request body for the export-and-archive action.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportRequest {
    #[serde(default)]
    pub class: Option<VehicleClass>,
}

/// Query parameters for the destination presets endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationsQuery {
    pub kind: DcKind,
}

/// Destination presets for the registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub kind: DcKind,
    pub destinations: Vec<String>,
}

/// Registration response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub item: QueueItem,
}

/// Mute preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteResponse {
    pub muted: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Identity of this instance on the sync bus
    pub instance: String,
}
