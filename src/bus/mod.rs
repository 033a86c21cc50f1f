//! Best-effort sync bus between concurrently running instances.
//!
//! Each UI instance owns an independent in-memory copy of the shared state;
//! the bus is how a mutation in one instance reaches the others. The channel
//! is unordered across senders, at-most-once and unacknowledged: a slow
//! subscriber that overruns the buffer simply loses messages. Consistency
//! between instances is last-writer-wins at full-snapshot granularity: the
//! instance that broadcasts its state last overwrites everyone else's copy
//! wholesale. That is a documented limitation, not an accident; nothing here
//! merges fields or orders writes.
//!
//! Message identity comes from the envelope alone: every message carries the
//! origin instance id, and receivers skip their own broadcasts (a publisher
//! never hears itself).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::api::{Bay, BayId, CallKind, QueueId, QueueItem};
use crate::store::DockStore;

/// Default per-subscriber buffer before overruns start dropping messages.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Identity of one running instance. Generated at store construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(uuid::Uuid);

impl InstanceId {
    pub fn generate() -> Self {
        InstanceId(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages carried by the bus.
///
/// The two call shapes carry no state at all; they exist purely to trigger
/// the audible alert in listening instances. `StateSync` replaces the
/// receiver's entire queue and bay state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    #[serde(rename = "CALL_VEHICLE")]
    VehicleCalled {
        id: QueueId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bay_id: Option<BayId>,
        kind: CallKind,
    },
    #[serde(rename = "RECALL_VEHICLE")]
    VehicleRecalled { id: QueueId },
    #[serde(rename = "SYNC_STATE")]
    StateSync {
        queue: Vec<QueueItem>,
        bays: Vec<Bay>,
    },
}

impl QueueEvent {
    /// Short label for logs and the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            QueueEvent::VehicleCalled { .. } => "call",
            QueueEvent::VehicleRecalled { .. } => "recall",
            QueueEvent::StateSync { .. } => "sync",
        }
    }
}

/// A bus message plus the identity of the instance that sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: InstanceId,
    pub event: QueueEvent,
}

/// Handle to the shared broadcast channel. Cheap to clone.
#[derive(Clone)]
pub struct SyncBus {
    sender: broadcast::Sender<Envelope>,
}

impl SyncBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber. Returns the number of receivers
    /// the message reached; zero means it was dropped on the floor, which is
    /// within contract.
    pub fn publish(&self, envelope: Envelope) -> usize {
        let kind = envelope.event.kind();
        match self.sender.send(envelope) {
            Ok(receivers) => {
                debug!(kind, receivers, "bus message published");
                receivers
            }
            Err(_) => {
                debug!(kind, "bus message dropped (no receivers)");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Wait for the next message. `None` once every sender is gone.
    /// Overruns are skipped silently; lost messages are within contract.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "bus subscriber lagged; messages lost");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drain one pending message without waiting, if there is one.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "bus subscriber lagged; messages lost");
                }
                Err(_) => return None,
            }
        }
    }
}

/// Feed every inbound bus message to a store for the lifetime of the
/// process. Long-running deployments use this; tests usually drive
/// [`DockStore::handle_envelope`] by hand for determinism.
pub fn spawn_forwarder(
    store: Arc<DockStore>,
    mut subscription: Subscription,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(envelope) = subscription.recv().await {
            store.handle_envelope(envelope);
        }
    })
}
