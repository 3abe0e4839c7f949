use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::models::{ControlState, NewReading, Reading};
use crate::error::{Error, Result};
use crate::store::{ControlRegister, ControlSwap, Mutator, ReadingStore};

const READING_COLUMNS: &str =
    "id, recorded_at, distance_cm, level_label, capacity_percent, pump_on, tank_height_cm";

/// Postgres-backed `ReadingStore`.
///
/// `seq` (BIGSERIAL) is the insertion sequence breaking `recorded_at` ties;
/// it never leaves the adapter.
#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn append(&self, reading: NewReading) -> Result<Reading> {
        let row = sqlx::query_as::<_, Reading>(
            "INSERT INTO readings \
                 (id, recorded_at, distance_cm, level_label, capacity_percent, pump_on, tank_height_cm) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, recorded_at, distance_cm, level_label, capacity_percent, pump_on, tank_height_cm",
        )
        .bind(Uuid::new_v4())
        .bind(reading.recorded_at)
        .bind(reading.distance_cm)
        .bind(reading.level_label)
        .bind(reading.capacity_percent)
        .bind(reading.pump_on)
        .bind(reading.tank_height_cm)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Reading>> {
        let rows = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {READING_COLUMNS} FROM readings \
             ORDER BY recorded_at DESC, seq DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all(&self) -> Result<Vec<Reading>> {
        let rows = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {READING_COLUMNS} FROM readings \
             ORDER BY recorded_at DESC, seq DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, FromRow)]
struct ControlRow {
    mode: String,
    manual_pump_request: bool,
    calibration_pending: bool,
}

impl TryFrom<ControlRow> for ControlState {
    type Error = Error;

    fn try_from(row: ControlRow) -> Result<Self> {
        let mode = row
            .mode
            .parse()
            .map_err(|e: String| Error::InvariantViolation(format!("control row: {e}")))?;
        Ok(ControlState {
            mode,
            manual_pump_request: row.manual_pump_request,
            calibration_pending: row.calibration_pending,
        })
    }
}

/// Postgres-backed `ControlRegister`.
///
/// `update` runs `SELECT … FOR UPDATE` and the write inside one transaction,
/// so concurrent device polls and operator writes serialize on the row and
/// the calibration latch is cleared by exactly one observer.
#[derive(Clone)]
pub struct PgControlRegister {
    pool: PgPool,
}

impl PgControlRegister {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ControlRegister for PgControlRegister {
    async fn get(&self) -> Result<ControlState> {
        let row = sqlx::query_as::<_, ControlRow>(
            "SELECT mode, manual_pump_request, calibration_pending \
             FROM control_state WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Ok(ControlState::default()),
        }
    }

    async fn update(&self, mutate: Mutator) -> Result<ControlSwap> {
        let defaults = ControlState::default();
        let mut tx = self.pool.begin().await?;

        // Create the document lazily so the row lock below always has a row.
        sqlx::query(
            "INSERT INTO control_state (id, mode, manual_pump_request, calibration_pending) \
             VALUES (1, $1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(defaults.mode.to_string())
        .bind(defaults.manual_pump_request)
        .bind(defaults.calibration_pending)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, ControlRow>(
            "SELECT mode, manual_pump_request, calibration_pending \
             FROM control_state WHERE id = 1 FOR UPDATE",
        )
        .fetch_one(&mut *tx)
        .await?;
        let before: ControlState = row.try_into()?;

        let mut after = before.clone();
        mutate(&mut after);

        if after != before {
            sqlx::query(
                "UPDATE control_state \
                 SET mode = $1, manual_pump_request = $2, calibration_pending = $3 \
                 WHERE id = 1",
            )
            .bind(after.mode.to_string())
            .bind(after.manual_pump_request)
            .bind(after.calibration_pending)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ControlSwap { before, after })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    use super::*;
    use crate::db::models::Mode;

    fn make_reading(offset_secs: i64, capacity: i32) -> NewReading {
        NewReading {
            recorded_at: Utc::now() + Duration::seconds(offset_secs),
            distance_cm: Some(12.5),
            level_label: Some("MEDIUM".to_owned()),
            capacity_percent: Some(capacity),
            pump_on: Some(false),
            tank_height_cm: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_orders_newest_first(pool: PgPool) {
        let store = PgReadingStore::new(pool);
        store.append(make_reading(20, 40)).await.unwrap();
        store.append(make_reading(0, 10)).await.unwrap();
        store.append(make_reading(40, 90)).await.unwrap();

        let rows = store.latest(15).await.unwrap();
        let capacities: Vec<_> = rows.iter().map(|r| r.capacity_percent.unwrap()).collect();
        assert_eq!(capacities, vec![90, 40, 10]);
        assert_eq!(store.latest(2).await.unwrap().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn equal_timestamps_break_ties_by_insertion_sequence(pool: PgPool) {
        let store = PgReadingStore::new(pool);
        let at = Utc::now();
        for capacity in [10, 40, 90] {
            let mut r = make_reading(0, capacity);
            r.recorded_at = at;
            store.append(r).await.unwrap();
        }

        let rows = store.all().await.unwrap();
        let capacities: Vec<_> = rows.iter().map(|r| r.capacity_percent.unwrap()).collect();
        assert_eq!(capacities, vec![90, 40, 10]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn append_round_trips_every_field(pool: PgPool) {
        let store = PgReadingStore::new(pool);
        let mut reading = make_reading(0, 97);
        reading.tank_height_cm = Some(118.5);
        reading.pump_on = Some(true);

        let stored = store.append(reading).await.unwrap();
        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, stored.id);
        assert_eq!(rows[0].distance_cm, Some(12.5));
        assert_eq!(rows[0].capacity_percent, Some(97));
        assert_eq!(rows[0].pump_on, Some(true));
        assert_eq!(rows[0].tank_height_cm, Some(118.5));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn register_defaults_when_row_absent(pool: PgPool) {
        let register = PgControlRegister::new(pool);
        assert_eq!(register.get().await.unwrap(), ControlState::default());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_returns_before_and_after_images(pool: PgPool) {
        let register = PgControlRegister::new(pool);
        let swap = register
            .update(Box::new(|s| {
                s.mode = Mode::Manual;
                s.manual_pump_request = true;
            }))
            .await
            .unwrap();

        assert_eq!(swap.before, ControlState::default());
        assert_eq!(swap.after.mode, Mode::Manual);
        assert!(swap.after.manual_pump_request);
        assert_eq!(register.get().await.unwrap(), swap.after);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn calibration_latch_clears_in_the_same_transaction(pool: PgPool) {
        let register = PgControlRegister::new(pool);
        register
            .update(Box::new(|s| s.calibration_pending = true))
            .await
            .unwrap();

        let first = register
            .update(Box::new(|s| s.calibration_pending = false))
            .await
            .unwrap();
        assert!(first.before.calibration_pending);
        assert!(!first.after.calibration_pending);

        let second = register
            .update(Box::new(|s| s.calibration_pending = false))
            .await
            .unwrap();
        assert!(!second.before.calibration_pending);
    }
}
