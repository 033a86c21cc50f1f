//! Shared queue/bay store.
//!
//! Single in-process authority for the vehicle queue and the bay roster.
//! Every mutation runs synchronously to completion, then persists a full
//! snapshot and broadcasts to peer instances over the sync bus. The store
//! itself never returns an error: unknown ids and illegal lifecycle steps
//! are logged no-ops, and a failed snapshot write costs durability for the
//! session, not correctness of the in-memory state.
//!
//! User-facing validation (bay category matching, re-entry rules and the
//! like) lives in [`crate::services::dispatch`]; the store applies what it
//! is told, subject only to the lifecycle transition table.

pub mod snapshot;

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::api::{
    Bay, BayId, BayStatus, CallKind, NewVehicle, QueueId, QueueItem, QueueStatus, StateSnapshot,
};
use crate::bus::{Envelope, InstanceId, QueueEvent, SyncBus};
use self::snapshot::SnapshotStore;

struct Shared {
    queue: Vec<QueueItem>,
    bays: Vec<Bay>,
    muted: bool,
}

/// The shared queue/bay store for one running instance.
///
/// Constructed once per process/session and passed by `Arc` to whatever
/// needs it; there is deliberately no ambient global.
pub struct DockStore {
    state: RwLock<Shared>,
    seed_bays: Vec<Bay>,
    snapshots: Arc<dyn SnapshotStore>,
    bus: SyncBus,
    origin: InstanceId,
}

impl DockStore {
    /// Open a store from whatever the snapshot backend holds, falling back
    /// to an empty queue, the seed roster and unmuted on missing or corrupt
    /// entries.
    pub fn open(snapshots: Arc<dyn SnapshotStore>, bus: SyncBus, seed_bays: Vec<Bay>) -> Self {
        Self::open_at(Utc::now(), snapshots, bus, seed_bays)
    }

    /// Clock-injected variant of [`DockStore::open`].
    ///
    /// On the first day of a month, archived entries are purged from the
    /// loaded queue. Once, here, not on a timer.
    pub fn open_at(
        now: DateTime<Utc>,
        snapshots: Arc<dyn SnapshotStore>,
        bus: SyncBus,
        seed_bays: Vec<Bay>,
    ) -> Self {
        let queue = match snapshots.load_queue() {
            Ok(Some(queue)) => queue,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "queue snapshot unreadable; starting empty");
                Vec::new()
            }
        };
        let bays = match snapshots.load_bays() {
            Ok(Some(bays)) => bays,
            Ok(None) => seed_bays.clone(),
            Err(e) => {
                warn!(error = %e, "bay snapshot unreadable; using seed roster");
                seed_bays.clone()
            }
        };
        let muted = match snapshots.load_muted() {
            Ok(Some(muted)) => muted,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "mute snapshot unreadable; defaulting to unmuted");
                false
            }
        };

        let store = Self {
            state: RwLock::new(Shared { queue, bays, muted }),
            seed_bays,
            snapshots,
            bus,
            origin: InstanceId::generate(),
        };

        if now.day() == 1 {
            let purged = {
                let mut state = store.state.write();
                let before = state.queue.len();
                state.queue.retain(|item| !item.archived);
                before - state.queue.len()
            };
            if purged > 0 {
                info!(purged, "month start: purged archived queue entries");
                store.persist_and_sync();
            }
        }

        {
            let state = store.state.read();
            info!(
                instance = %store.origin,
                queue = state.queue.len(),
                bays = state.bays.len(),
                "dock store opened"
            );
        }
        store
    }

    pub fn instance_id(&self) -> InstanceId {
        self.origin
    }

    pub fn bus(&self) -> &SyncBus {
        &self.bus
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn queue(&self) -> Vec<QueueItem> {
        self.state.read().queue.clone()
    }

    pub fn bays(&self) -> Vec<Bay> {
        self.state.read().bays.clone()
    }

    pub fn state(&self) -> StateSnapshot {
        let state = self.state.read();
        StateSnapshot {
            queue: state.queue.clone(),
            bays: state.bays.clone(),
        }
    }

    pub fn find_vehicle(&self, id: &QueueId) -> Option<QueueItem> {
        self.state.read().queue.iter().find(|q| &q.id == id).cloned()
    }

    pub fn find_bay(&self, id: &BayId) -> Option<Bay> {
        self.state.read().bays.iter().find(|b| &b.id == id).cloned()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Register a new visit at the end of the queue.
    pub fn register(&self, fields: NewVehicle) -> QueueItem {
        let item = QueueItem {
            id: QueueId::generate(),
            vehicle_class: fields.vehicle_class,
            plate_number: fields.plate_number,
            driver_name: fields.driver_name,
            company_name: fields.company_name,
            dc_kind: fields.dc_kind,
            destinations: fields.destinations,
            entered_at: Utc::now(),
            loading_started_at: None,
            loading_ended_at: None,
            exited_at: None,
            status: QueueStatus::Waiting,
            bay_id: None,
            call_count: 0,
            last_call_kind: None,
            archived: false,
        };
        self.state.write().queue.push(item.clone());
        self.persist_and_sync();
        item
    }

    /// Call a vehicle forward, optionally to a bay.
    ///
    /// The bay, when given, is claimed blindly; existence checks and
    /// category matching are the caller's responsibility. Emits a dedicated
    /// call event (the audible-alert trigger) ahead of the state sync.
    pub fn call_vehicle(
        &self,
        id: &QueueId,
        bay_id: Option<&BayId>,
        kind: CallKind,
    ) -> Option<QueueItem> {
        let updated = {
            let mut state = self.state.write();
            let Some(idx) = state.queue.iter().position(|q| &q.id == id) else {
                debug!(%id, "call for unknown queue id ignored");
                return None;
            };
            let current = state.queue[idx].status;
            if !current.can_transition(QueueStatus::Called) {
                warn!(%id, from = %current, "rejected call: not callable from this status");
                return None;
            }

            {
                let item = &mut state.queue[idx];
                item.status = QueueStatus::Called;
                item.bay_id = bay_id.cloned();
                item.call_count += 1;
                item.last_call_kind = Some(kind);
            }
            if let Some(bay_id) = bay_id {
                if let Some(bay) = state.bays.iter_mut().find(|b| &b.id == bay_id) {
                    bay.current_queue_id = Some(id.clone());
                    bay.status = BayStatus::Busy;
                }
            }
            state.queue[idx].clone()
        };

        self.bus.publish(Envelope {
            origin: self.origin,
            event: QueueEvent::VehicleCalled {
                id: id.clone(),
                bay_id: bay_id.cloned(),
                kind,
            },
        });
        self.persist_and_sync();
        Some(updated)
    }

    /// Re-trigger the call alert for a vehicle. Pure signal: no queue or
    /// bay state changes, nothing is persisted, any number of repeats is
    /// harmless.
    pub fn recall_vehicle(&self, id: &QueueId) {
        self.bus.publish(Envelope {
            origin: self.origin,
            event: QueueEvent::VehicleRecalled { id: id.clone() },
        });
    }

    /// Advance a vehicle's lifecycle status.
    ///
    /// Timestamps are stamped per target status; bay occupancy follows the
    /// rules described on [`crate::api::QueueStatus`]'s transition table.
    /// Steps outside the table are rejected as logged no-ops.
    pub fn update_status(
        &self,
        id: &QueueId,
        next: QueueStatus,
        bay_id: Option<&BayId>,
    ) -> Option<QueueItem> {
        let now = Utc::now();
        let updated = {
            let mut state = self.state.write();
            let Some(idx) = state.queue.iter().position(|q| &q.id == id) else {
                debug!(%id, "status update for unknown queue id ignored");
                return None;
            };
            let current = state.queue[idx].status;
            if !current.can_transition(next) {
                warn!(%id, from = %current, to = %next, "rejected illegal status transition");
                return None;
            }

            {
                let item = &mut state.queue[idx];
                item.status = next;
                match next {
                    QueueStatus::Loading => item.loading_started_at = Some(now),
                    QueueStatus::Finished => item.loading_ended_at = Some(now),
                    QueueStatus::OutOfArea => item.exited_at = Some(now),
                    _ => {}
                }
                if next == QueueStatus::OutOfArea {
                    // A vehicle out of the area occupies nothing.
                    item.bay_id = None;
                } else if let Some(bay_id) = bay_id {
                    item.bay_id = Some(bay_id.clone());
                } else if next == QueueStatus::Waiting {
                    // Sent back to the queue with no bay: the slot claim ends.
                    item.bay_id = None;
                }
            }

            match next {
                QueueStatus::Called | QueueStatus::Loading => {
                    if let Some(bay_id) = bay_id {
                        if let Some(bay) = state.bays.iter_mut().find(|b| &b.id == bay_id) {
                            bay.current_queue_id = Some(id.clone());
                            bay.status = if next == QueueStatus::Loading {
                                BayStatus::Loading
                            } else {
                                BayStatus::Busy
                            };
                        }
                    }
                }
                QueueStatus::Finished => {
                    // The bay frees up even though the vehicle still reads
                    // FINISHED; release is decoupled from the visit record.
                    if let Some(bay_id) = bay_id {
                        if let Some(bay) = state.bays.iter_mut().find(|b| &b.id == bay_id) {
                            bay.current_queue_id = None;
                            bay.status = BayStatus::Idle;
                        }
                    }
                }
                QueueStatus::OutOfArea => {
                    // Scan-and-clear: whatever bay still references this
                    // vehicle is released, bay argument or not.
                    for bay in state
                        .bays
                        .iter_mut()
                        .filter(|b| b.current_queue_id.as_ref() == Some(id))
                    {
                        bay.current_queue_id = None;
                        bay.status = BayStatus::Idle;
                    }
                }
                _ => {}
            }

            state.queue[idx].clone()
        };

        self.persist_and_sync();
        Some(updated)
    }

    /// Flag the named entries as archived (daily view -> monthly view).
    /// Returns how many entries were newly flagged.
    pub fn archive(&self, ids: &[QueueId]) -> usize {
        let flagged = {
            let mut state = self.state.write();
            let mut flagged = 0;
            for item in state.queue.iter_mut() {
                if ids.contains(&item.id) && !item.archived {
                    item.archived = true;
                    flagged += 1;
                }
            }
            flagged
        };
        self.persist_and_sync();
        flagged
    }

    /// Reset everything: empty queue, seed bay roster. Confirmation is the
    /// caller's job; this layer does not ask twice.
    pub fn clear_all(&self) {
        {
            let mut state = self.state.write();
            state.queue.clear();
            state.bays = self.seed_bays.clone();
        }
        info!("queue and bay state reset");
        self.persist_and_sync();
    }

    /// Flip the audible-alert mute preference. Per-instance: persisted
    /// under its own key and never broadcast.
    pub fn toggle_mute(&self) -> bool {
        let muted = {
            let mut state = self.state.write();
            state.muted = !state.muted;
            state.muted
        };
        if let Err(e) = self.snapshots.save_muted(muted) {
            warn!(error = %e, "mute preference not persisted");
        }
        muted
    }

    pub fn muted(&self) -> bool {
        self.state.read().muted
    }

    // ------------------------------------------------------------------
    // Bus integration
    // ------------------------------------------------------------------

    /// Apply one inbound bus message.
    ///
    /// Own-origin envelopes are skipped (a publisher never applies its own
    /// broadcast). A state sync overwrites queue and bays wholesale
    /// (last-writer-wins) and is persisted but not re-broadcast. Call and
    /// recall events carry no state and are left to alert collaborators.
    pub fn handle_envelope(&self, envelope: Envelope) {
        if envelope.origin == self.origin {
            return;
        }
        match envelope.event {
            QueueEvent::StateSync { queue, bays } => {
                {
                    let mut state = self.state.write();
                    state.queue = queue;
                    state.bays = bays;
                }
                debug!(origin = %envelope.origin, "applied peer state sync");
                self.persist_only();
            }
            QueueEvent::VehicleCalled { .. } | QueueEvent::VehicleRecalled { .. } => {}
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn persist_only(&self) {
        let (queue, bays) = {
            let state = self.state.read();
            (state.queue.clone(), state.bays.clone())
        };
        if let Err(e) = self.snapshots.save_queue(&queue) {
            warn!(error = %e, "queue snapshot not persisted; durability lost for this session");
        }
        if let Err(e) = self.snapshots.save_bays(&bays) {
            warn!(error = %e, "bay snapshot not persisted; durability lost for this session");
        }
    }

    fn persist_and_sync(&self) {
        let (queue, bays) = {
            let state = self.state.read();
            (state.queue.clone(), state.bays.clone())
        };
        if let Err(e) = self.snapshots.save_queue(&queue) {
            warn!(error = %e, "queue snapshot not persisted; durability lost for this session");
        }
        if let Err(e) = self.snapshots.save_bays(&bays) {
            warn!(error = %e, "bay snapshot not persisted; durability lost for this session");
        }
        self.bus.publish(Envelope {
            origin: self.origin,
            event: QueueEvent::StateSync { queue, bays },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::snapshot::MemorySnapshotStore;
    use super::*;
    use crate::api::VehicleClass;
    use chrono::TimeZone;

    fn seed() -> Vec<Bay> {
        crate::config::default_bays()
    }

    fn open_store() -> DockStore {
        DockStore::open(
            Arc::new(MemorySnapshotStore::new()),
            SyncBus::new(),
            seed(),
        )
    }

    fn fg_vehicle(plate: &str) -> NewVehicle {
        NewVehicle {
            vehicle_class: VehicleClass::Fg,
            plate_number: plate.to_string(),
            driver_name: "driver".to_string(),
            company_name: "company".to_string(),
            dc_kind: None,
            destinations: Vec::new(),
        }
    }

    #[test]
    fn illegal_transition_is_a_no_op() {
        let store = open_store();
        let item = store.register(fg_vehicle("70-1122"));

        // Waiting -> Finished is not in the table.
        assert!(store
            .update_status(&item.id, QueueStatus::Finished, None)
            .is_none());
        let unchanged = store.find_vehicle(&item.id).unwrap();
        assert_eq!(unchanged.status, QueueStatus::Waiting);
        assert!(unchanged.loading_ended_at.is_none());
    }

    #[test]
    fn nothing_ever_reaches_completed() {
        let store = open_store();
        let item = store.register(fg_vehicle("70-1122"));
        assert!(store
            .update_status(&item.id, QueueStatus::Completed, None)
            .is_none());
        assert_eq!(
            store.find_vehicle(&item.id).unwrap().status,
            QueueStatus::Waiting
        );
    }

    #[test]
    fn month_start_purges_archived_entries() {
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
        let bus = SyncBus::new();
        {
            let store = DockStore::open(Arc::clone(&snapshots), bus.clone(), seed());
            store.register(fg_vehicle("keep"));
            let archived = store.register(fg_vehicle("drop"));
            store.archive(&[archived.id]);
            assert_eq!(store.queue().len(), 2);
        }

        let first_of_month = Utc.with_ymd_and_hms(2025, 11, 1, 6, 0, 0).unwrap();
        let reopened = DockStore::open_at(first_of_month, Arc::clone(&snapshots), bus, seed());
        let queue = reopened.queue();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].plate_number, "keep");
    }

    #[test]
    fn mid_month_startup_keeps_archived_entries() {
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
        let bus = SyncBus::new();
        {
            let store = DockStore::open(Arc::clone(&snapshots), bus.clone(), seed());
            let item = store.register(fg_vehicle("kept"));
            store.archive(&[item.id]);
        }

        let mid_month = Utc.with_ymd_and_hms(2025, 11, 15, 6, 0, 0).unwrap();
        let reopened = DockStore::open_at(mid_month, Arc::clone(&snapshots), bus, seed());
        assert_eq!(reopened.queue().len(), 1);
    }
}
