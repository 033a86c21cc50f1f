//! Entry/exit report rows and the export-and-archive action.
//!
//! The daily view shows everything not yet exported; exporting hands the
//! rows to the caller and flags them archived, which moves them to the
//! monthly view without deleting history. Rendering the rows to CSV or
//! print is the front end's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{QueueItem, VehicleClass};
use crate::store::DockStore;

/// Which slice of history the report covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Entries not yet exported.
    #[default]
    Daily,
    /// Entries already exported (archived).
    Monthly,
}

/// One report row, in queue order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub row: usize,
    pub plate_number: String,
    pub vehicle_class: VehicleClass,
    pub driver_name: String,
    pub company_name: String,
    pub entered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<DateTime<Utc>>,
    /// Entry to exit, whole minutes. Present once the vehicle has left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_on_site: Option<i64>,
}

/// Result of a daily export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub rows: Vec<ReportRow>,
    /// How many queue entries were newly archived by this export.
    pub archived: usize,
}

fn matches_filter(item: &QueueItem, period: ReportPeriod, class: Option<VehicleClass>) -> bool {
    let period_ok = match period {
        ReportPeriod::Daily => !item.archived,
        ReportPeriod::Monthly => item.archived,
    };
    period_ok && class.map_or(true, |c| item.vehicle_class == c)
}

fn to_row(row: usize, item: &QueueItem) -> ReportRow {
    ReportRow {
        row,
        plate_number: item.plate_number.clone(),
        vehicle_class: item.vehicle_class,
        driver_name: item.driver_name.clone(),
        company_name: item.company_name.clone(),
        entered_at: item.entered_at,
        loading_started_at: item.loading_started_at,
        loading_ended_at: item.loading_ended_at,
        exited_at: item.exited_at,
        minutes_on_site: item
            .exited_at
            .map(|exit| (exit - item.entered_at).num_minutes()),
    }
}

/// Report rows for the requested period, optionally limited to one class.
pub fn report_rows(
    store: &DockStore,
    period: ReportPeriod,
    class: Option<VehicleClass>,
) -> Vec<ReportRow> {
    store
        .queue()
        .iter()
        .filter(|item| matches_filter(item, period, class))
        .enumerate()
        .map(|(i, item)| to_row(i + 1, item))
        .collect()
}

/// Export the daily rows and archive exactly those entries.
pub fn export_daily(store: &DockStore, class: Option<VehicleClass>) -> ExportOutcome {
    let queue = store.queue();
    let exported: Vec<&QueueItem> = queue
        .iter()
        .filter(|item| matches_filter(item, ReportPeriod::Daily, class))
        .collect();
    let rows = exported
        .iter()
        .enumerate()
        .map(|(i, item)| to_row(i + 1, item))
        .collect();
    let ids: Vec<_> = exported.iter().map(|item| item.id.clone()).collect();
    let archived = if ids.is_empty() {
        0
    } else {
        store.archive(&ids)
    };
    ExportOutcome { rows, archived }
}
