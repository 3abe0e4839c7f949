use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::db::models::{ControlState, NewReading, Reading};
use crate::error::Result;
use crate::store::{ControlRegister, ControlSwap, Mutator, ReadingStore};

/// In-memory `ReadingStore` for tests and database-less deployments.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Readings are kept in insertion order; the vector index is the insertion
/// sequence that breaks `recorded_at` ties.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first: stable sort by timestamp keeps insertion order among
    /// ties, so after reversing, the later-inserted reading wins.
    fn newest_first(mut readings: Vec<Reading>) -> Vec<Reading> {
        readings.sort_by_key(|r| r.recorded_at);
        readings.reverse();
        readings
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn append(&self, reading: NewReading) -> Result<Reading> {
        let stored = Reading {
            id: Uuid::new_v4(),
            recorded_at: reading.recorded_at,
            distance_cm: reading.distance_cm,
            level_label: reading.level_label,
            capacity_percent: reading.capacity_percent,
            pump_on: reading.pump_on,
            tank_height_cm: reading.tank_height_cm,
        };
        self.inner.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Reading>> {
        let mut rows = Self::newest_first(self.inner.read().await.clone());
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn all(&self) -> Result<Vec<Reading>> {
        Ok(Self::newest_first(self.inner.read().await.clone()))
    }
}

/// In-memory `ControlRegister`: the mutex hold is the atomic step.
#[derive(Clone, Default)]
pub struct MemoryControlRegister {
    inner: Arc<Mutex<ControlState>>,
}

impl MemoryControlRegister {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlRegister for MemoryControlRegister {
    async fn get(&self) -> Result<ControlState> {
        Ok(self.inner.lock().await.clone())
    }

    async fn update(&self, mutate: Mutator) -> Result<ControlSwap> {
        let mut state = self.inner.lock().await;
        let before = state.clone();
        mutate(&mut state);
        Ok(ControlSwap {
            before,
            after: state.clone(),
        })
    }
}
