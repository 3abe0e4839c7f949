use std::sync::Arc;

use chrono::FixedOffset;

use crate::db::models::Reading;
use crate::error::{Error, Result};
use crate::projection::{self, HistoryView, TankStatus};
use crate::store::ReadingStore;

/// Serves the current-state, history and full-dump views by running the
/// projection over the reading store.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn ReadingStore>,
    /// Window size used when the caller does not pass a limit.
    default_limit: i64,
    /// Canonical display offset for all rendered timestamps.
    display_offset: FixedOffset,
}

impl QueryService {
    pub fn new(store: Arc<dyn ReadingStore>, default_limit: i64, display_offset: FixedOffset) -> Self {
        Self {
            store,
            default_limit,
            display_offset,
        }
    }

    /// Current-state view over the most recent `limit` readings.
    /// `NoData` when the store is empty.
    pub async fn current(&self, limit: Option<i64>) -> Result<TankStatus> {
        let rows = self.store.latest(self.effective_limit(limit)?).await?;
        projection::project_status(&rows, self.display_offset)
    }

    /// Just the aligned chronological history sequences.
    pub async fn history(&self, limit: Option<i64>) -> Result<HistoryView> {
        let rows = self.store.latest(self.effective_limit(limit)?).await?;
        projection::project_history(&rows, self.display_offset)
    }

    /// Every stored reading, newest first, all fields.
    pub async fn all(&self) -> Result<Vec<Reading>> {
        self.store.all().await
    }

    fn effective_limit(&self, limit: Option<i64>) -> Result<i64> {
        match limit {
            None => Ok(self.default_limit),
            Some(n) if n > 0 => Ok(n),
            Some(n) => Err(Error::InvalidArgument(format!(
                "limit must be a positive integer, got {n}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ingest::IngestService;
    use crate::store::memory::MemoryReadingStore;

    fn services() -> (QueryService, IngestService) {
        let store: Arc<dyn ReadingStore> = Arc::new(MemoryReadingStore::new());
        (
            QueryService::new(store.clone(), 15, FixedOffset::east_opt(0).unwrap()),
            IngestService::new(store),
        )
    }

    async fn submit(ingest: &IngestService, level: &str, capacity: i32) {
        ingest
            .submit(json!({ "levelLabel": level, "capacityPercent": capacity }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_store_yields_no_data() {
        let (query, _) = services();
        assert!(matches!(query.current(None).await, Err(Error::NoData)));
        assert!(matches!(query.history(None).await, Err(Error::NoData)));
        assert!(query.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_limit_is_rejected() {
        let (query, ingest) = services();
        submit(&ingest, "LOW", 10).await;

        for bad in [0, -3] {
            assert!(matches!(
                query.current(Some(bad)).await,
                Err(Error::InvalidArgument(_))
            ));
            assert!(matches!(
                query.history(Some(bad)).await,
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn rising_tank_scenario() {
        let (query, ingest) = services();
        submit(&ingest, "LOW", 10).await;
        submit(&ingest, "MEDIUM", 40).await;
        submit(&ingest, "FULL", 90).await;

        let status = query.current(None).await.unwrap();
        assert_eq!(status.capacity_percent, Some(90));
        assert_eq!(status.level_label.as_deref(), Some("FULL"));
        assert_eq!(
            status.history.levels,
            vec![
                Some("LOW".to_owned()),
                Some("MEDIUM".to_owned()),
                Some("FULL".to_owned())
            ]
        );
        assert_eq!(status.history.times.len(), status.history.levels.len());
    }

    #[tokio::test]
    async fn limit_bounds_the_window() {
        let (query, ingest) = services();
        submit(&ingest, "LOW", 10).await;
        submit(&ingest, "MEDIUM", 40).await;
        submit(&ingest, "FULL", 90).await;

        let status = query.current(Some(2)).await.unwrap();
        assert_eq!(status.table.len(), 2);
        // Window keeps the newest readings.
        assert_eq!(
            status.history.levels,
            vec![Some("MEDIUM".to_owned()), Some("FULL".to_owned())]
        );
    }

    #[tokio::test]
    async fn all_returns_every_reading_newest_first() {
        let (query, ingest) = services();
        for i in 0..20 {
            submit(&ingest, "LOW", i).await;
        }
        let rows = query.all().await.unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].capacity_percent, Some(19));
        assert!(rows.windows(2).all(|w| w[0].recorded_at >= w[1].recorded_at));
    }
}
