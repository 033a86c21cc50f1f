//! Snapshot persistence for the shared queue/bay state.
//!
//! The durable format is deliberately plain: three independently written
//! JSON values under fixed names, one for the queue, one for the bay roster
//! and one for the mute preference. There is no schema version; the files
//! hold whatever the in-memory shapes serialize to. A missing value is not
//! an error at the store level (it reads as "nothing persisted yet"), so the
//! trait reports it as `Ok(None)` and reserves `Err` for real failures.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{Bay, QueueItem};

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error type for snapshot operations.
///
/// The store swallows and logs every one of these; they exist so the
/// backends can say precisely what went wrong in that log line.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("snapshot write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("snapshot encode/decode failed: {0}")]
    Codec(#[from] serde_json::Error),

    /// Backend refused the operation (used by the in-memory backend's
    /// failure mode to exercise durability-loss paths).
    #[error("snapshot backend unavailable")]
    Unavailable,
}

/// Abstract persistence seam for the store.
///
/// Load methods return `Ok(None)` when nothing has been persisted under the
/// key yet; the store supplies its own defaults in that case. All methods
/// are synchronous: store mutations run to completion without suspending.
pub trait SnapshotStore: Send + Sync {
    fn load_queue(&self) -> SnapshotResult<Option<Vec<QueueItem>>>;
    fn save_queue(&self, queue: &[QueueItem]) -> SnapshotResult<()>;

    fn load_bays(&self) -> SnapshotResult<Option<Vec<Bay>>>;
    fn save_bays(&self, bays: &[Bay]) -> SnapshotResult<()>;

    fn load_muted(&self) -> SnapshotResult<Option<bool>>;
    fn save_muted(&self, muted: bool) -> SnapshotResult<()>;
}

/// File names inside the data directory. Fixed, unversioned.
const QUEUE_FILE: &str = "queue.json";
const BAYS_FILE: &str = "bays.json";
const MUTED_FILE: &str = "muted.json";

/// JSON-file snapshot backend.
///
/// One file per persisted value under a single data directory. Writes are
/// whole-file replacements; the last writer wins, which matches the
/// consistency model of the rest of the system.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open (and create, if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> SnapshotResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(SnapshotError::Write)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> SnapshotResult<Option<T>> {
        let path = self.dir.join(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SnapshotError::Read(e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> SnapshotResult<()> {
        let bytes = serde_json::to_vec(value)?;
        std::fs::write(self.dir.join(name), bytes).map_err(SnapshotError::Write)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load_queue(&self) -> SnapshotResult<Option<Vec<QueueItem>>> {
        self.read_json(QUEUE_FILE)
    }

    fn save_queue(&self, queue: &[QueueItem]) -> SnapshotResult<()> {
        self.write_json(QUEUE_FILE, &queue)
    }

    fn load_bays(&self) -> SnapshotResult<Option<Vec<Bay>>> {
        self.read_json(BAYS_FILE)
    }

    fn save_bays(&self, bays: &[Bay]) -> SnapshotResult<()> {
        self.write_json(BAYS_FILE, &bays)
    }

    fn load_muted(&self) -> SnapshotResult<Option<bool>> {
        self.read_json(MUTED_FILE)
    }

    fn save_muted(&self, muted: bool) -> SnapshotResult<()> {
        self.write_json(MUTED_FILE, &muted)
    }
}

#[derive(Default)]
struct MemorySlots {
    queue: Option<String>,
    bays: Option<String>,
    muted: Option<String>,
}

/// In-memory snapshot backend for tests and ephemeral runs.
///
/// Values are held as serialized JSON strings so a load really does
/// round-trip through the wire format. `set_failing(true)` makes every
/// subsequent operation return [`SnapshotError::Unavailable`], which is how
/// tests exercise the "durability silently lost" path.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slots: Mutex<MemorySlots>,
    failing: std::sync::atomic::AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> SnapshotResult<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            Err(SnapshotError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn load_slot<T: DeserializeOwned>(
        &self,
        pick: impl Fn(&MemorySlots) -> Option<String>,
    ) -> SnapshotResult<Option<T>> {
        self.check_available()?;
        match pick(&self.slots.lock()) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_slot<T: Serialize>(
        &self,
        value: &T,
        put: impl Fn(&mut MemorySlots, String),
    ) -> SnapshotResult<()> {
        self.check_available()?;
        let raw = serde_json::to_string(value)?;
        put(&mut self.slots.lock(), raw);
        Ok(())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_queue(&self) -> SnapshotResult<Option<Vec<QueueItem>>> {
        self.load_slot(|s| s.queue.clone())
    }

    fn save_queue(&self, queue: &[QueueItem]) -> SnapshotResult<()> {
        self.save_slot(&queue, |s, raw| s.queue = Some(raw))
    }

    fn load_bays(&self) -> SnapshotResult<Option<Vec<Bay>>> {
        self.load_slot(|s| s.bays.clone())
    }

    fn save_bays(&self, bays: &[Bay]) -> SnapshotResult<()> {
        self.save_slot(&bays, |s, raw| s.bays = Some(raw))
    }

    fn load_muted(&self) -> SnapshotResult<Option<bool>> {
        self.load_slot(|s| s.muted.clone())
    }

    fn save_muted(&self, muted: bool) -> SnapshotResult<()> {
        self.save_slot(&muted, |s, raw| s.muted = Some(raw))
    }
}
