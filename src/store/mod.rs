pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::db::models::{ControlState, NewReading, Reading};
use crate::error::Result;

/// Append-only, time-ordered collection of telemetry readings.
///
/// Ordering key is `recorded_at`, ties broken by insertion sequence, so the
/// newest-first ordering is a strict total order and history reconstruction
/// is deterministic. No update or delete is exposed.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Store one whole reading atomically and return it with its record id.
    async fn append(&self, reading: NewReading) -> Result<Reading>;

    /// The `limit` most recent readings, newest first.
    async fn latest(&self, limit: i64) -> Result<Vec<Reading>>;

    /// Every reading, newest first.
    async fn all(&self) -> Result<Vec<Reading>>;
}

/// Before/after images of one atomic control-register update.
#[derive(Debug, Clone)]
pub struct ControlSwap {
    pub before: ControlState,
    pub after: ControlState,
}

/// Mutation applied atomically against the current control state.
pub type Mutator = Box<dyn FnOnce(&mut ControlState) + Send>;

/// The singleton control document.
///
/// `update` is the only write path and runs the mutator as a single
/// read-modify-write step (one lock hold, or one row transaction). A naive
/// read-then-separate-write here would let a concurrent calibration request
/// be silently dropped between a poller's read and its clear.
#[async_trait]
pub trait ControlRegister: Send + Sync {
    /// Current state, or defaults if the document does not exist yet.
    async fn get(&self) -> Result<ControlState>;

    /// Apply `mutate` atomically; returns the pre- and post-images.
    async fn update(&self, mutate: Mutator) -> Result<ControlSwap>;
}
