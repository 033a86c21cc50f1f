//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint. Staff actions go through
//! the dispatch guard layer; reads come straight off the store.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    ArchiveRequest, ArchiveResponse, BoardSnapshot, CallRequest, DestinationsQuery,
    DestinationsResponse, ExportOutcome, ExportRequest, HealthResponse, MuteResponse, NewVehicle,
    RegisterResponse, ReportQuery, ReportRow, StateSnapshot, StatusRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BayId, CallKind, QueueId, QueueItem};
use crate::services::dispatch;
use crate::views::{board, report};
use crate::config;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        instance: state.store.instance_id().to_string(),
    }))
}

// =============================================================================
// Shared state reads
// =============================================================================

/// GET /v1/state
///
/// Full queue + bay snapshot; the staff console renders from this.
pub async fn get_state(State(state): State<AppState>) -> HandlerResult<StateSnapshot> {
    Ok(Json(state.store.state()))
}

/// GET /v1/board
///
/// Display-board view model for the hall screen.
pub async fn get_board(State(state): State<AppState>) -> HandlerResult<BoardSnapshot> {
    Ok(Json(board::board_snapshot(&state.store)))
}

/// GET /v1/destinations?kind=CP|General
///
/// Destination presets for the registration form.
pub async fn get_destinations(
    Query(query): Query<DestinationsQuery>,
) -> HandlerResult<DestinationsResponse> {
    let presets: &[&str] = match query.kind {
        crate::api::DcKind::Cp => config::CP_DESTINATIONS,
        crate::api::DcKind::General => config::GENERAL_CUSTOMERS,
    };
    Ok(Json(DestinationsResponse {
        kind: query.kind,
        destinations: presets.iter().map(|s| s.to_string()).collect(),
    }))
}

// =============================================================================
// Registration
// =============================================================================

/// POST /v1/queue
///
/// Register a vehicle at the end of the queue.
pub async fn register_vehicle(
    State(state): State<AppState>,
    Json(request): Json<NewVehicle>,
) -> Result<(axum::http::StatusCode, Json<RegisterResponse>), AppError> {
    let item = state.store.register(request);
    Ok((
        axum::http::StatusCode::CREATED,
        Json(RegisterResponse { item }),
    ))
}

// =============================================================================
// Staff actions
// =============================================================================

/// POST /v1/queue/{id}/call
///
/// Call a vehicle to a bay (`kind = LOAD`, bay required) or for billing
/// paperwork (`kind = BILL`, finished-goods only, no bay).
pub async fn call_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CallRequest>,
) -> HandlerResult<QueueItem> {
    let id = QueueId::new(id);
    let item = match request.kind {
        CallKind::Load => {
            let bay_id = request
                .bay_id
                .ok_or(AppError::Dispatch(
                    crate::services::DispatchError::BaySelectionRequired,
                ))?;
            dispatch::call_to_bay(&state.store, &id, &BayId::new(bay_id))?
        }
        CallKind::Bill => {
            if request.bay_id.is_some() {
                return Err(AppError::BadRequest(
                    "billing calls take no bay".to_string(),
                ));
            }
            dispatch::call_for_billing(&state.store, &id)?
        }
    };
    Ok(Json(item))
}

/// POST /v1/queue/{id}/recall
///
/// Re-trigger the call alert. No state changes.
pub async fn recall_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<serde_json::Value> {
    let id = QueueId::new(id);
    dispatch::recall(&state.store, &id)?;
    Ok(Json(serde_json::json!({ "recalled": id.value() })))
}

/// POST /v1/queue/{id}/status
///
/// Advance a vehicle's lifecycle status through the guard layer.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> HandlerResult<QueueItem> {
    let id = QueueId::new(id);
    let item = dispatch::advance(&state.store, &id, request.status)?;
    Ok(Json(item))
}

/// POST /v1/queue/archive
///
/// Flag a batch of entries as archived (daily -> monthly view).
pub async fn archive_queue(
    State(state): State<AppState>,
    Json(request): Json<ArchiveRequest>,
) -> HandlerResult<ArchiveResponse> {
    let ids: Vec<QueueId> = request.ids.into_iter().map(QueueId::new).collect();
    let archived = state.store.archive(&ids);
    Ok(Json(ArchiveResponse { archived }))
}

// =============================================================================
// Reports
// =============================================================================

/// GET /v1/reports?period=daily|monthly&class=FG
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<Vec<ReportRow>> {
    Ok(Json(report::report_rows(
        &state.store,
        query.period,
        query.class,
    )))
}

/// POST /v1/reports/export
///
/// Hand out the daily rows and archive exactly those entries.
pub async fn export_report(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> HandlerResult<ExportOutcome> {
    Ok(Json(report::export_daily(&state.store, request.class)))
}

// =============================================================================
// Preferences and administration
// =============================================================================

/// GET /v1/mute
pub async fn get_mute(State(state): State<AppState>) -> HandlerResult<MuteResponse> {
    Ok(Json(MuteResponse {
        muted: state.store.muted(),
    }))
}

/// POST /v1/mute/toggle
pub async fn toggle_mute(State(state): State<AppState>) -> HandlerResult<MuteResponse> {
    Ok(Json(MuteResponse {
        muted: state.store.toggle_mute(),
    }))
}

/// POST /v1/admin/reset
///
/// Full reset: empty queue, seed bay roster. The console confirms intent
/// before calling this; the server does not ask twice.
pub async fn reset_all(State(state): State<AppState>) -> axum::http::StatusCode {
    state.store.clear_all();
    axum::http::StatusCode::NO_CONTENT
}

// =============================================================================
// Live event feed
// =============================================================================

/// GET /v1/events
///
/// Server-Sent Events feed of bus traffic. The audible-alert collaborator
/// listens for `call` / `recall` events; board views may watch `sync` to
/// refresh without polling.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.bus.subscribe();
    let stream = async_stream::stream! {
        while let Some(envelope) = subscription.recv().await {
            let name = envelope.event.kind();
            let data = serde_json::to_string(&envelope.event).unwrap_or_default();
            yield Ok(Event::default().event(name).data(data));
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
