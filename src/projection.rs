//! Pure projection of a newest-first reading slice into the display views.
//!
//! Nothing here touches storage; the query gateway feeds it the slice it
//! got from `ReadingStore::latest`. All timestamps are rendered in the one
//! canonical display offset configured for the deployment.

use chrono::{DateTime, FixedOffset, Utc};

use crate::db::models::Reading;
use crate::error::{Error, Result};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Current-state view derived from the newest reading, plus the history and
/// table views over the whole slice.
#[derive(Debug, Clone)]
pub struct TankStatus {
    pub level_label: Option<String>,
    pub distance_cm: Option<f64>,
    pub capacity_percent: Option<i32>,
    /// `"ON"` / `"OFF"`, derived from the newest reading's `pump_on`.
    pub pump_status: &'static str,
    pub tank_height_cm: Option<f64>,
    pub last_updated: String,
    pub history: HistoryView,
    pub table: Vec<TableRow>,
}

/// Two parallel, index-aligned sequences in chronological (oldest-first)
/// order. Equal length is a hard invariant.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub times: Vec<String>,
    pub levels: Vec<Option<String>>,
}

/// One fully serialized reading for tabular display, newest first.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub recorded_at: String,
    pub distance_cm: Option<f64>,
    pub level_label: Option<String>,
    pub capacity_percent: Option<i32>,
    pub pump_on: Option<bool>,
    pub tank_height_cm: Option<f64>,
}

fn localize(at: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    at.with_timezone(&offset)
}

/// Project the chronological history sequences from a newest-first slice.
///
/// Fails with `NoData` on an empty slice — the system reports "no data"
/// rather than fabricating a default view.
pub fn project_history(newest_first: &[Reading], offset: FixedOffset) -> Result<HistoryView> {
    if newest_first.is_empty() {
        return Err(Error::NoData);
    }

    let mut times = Vec::with_capacity(newest_first.len());
    let mut levels = Vec::with_capacity(newest_first.len());
    for reading in newest_first.iter().rev() {
        times.push(localize(reading.recorded_at, offset).format(TIME_FORMAT).to_string());
        levels.push(reading.level_label.clone());
    }

    if times.len() != levels.len() {
        return Err(Error::InvariantViolation(format!(
            "history sequences diverged: {} times vs {} levels",
            times.len(),
            levels.len()
        )));
    }

    Ok(HistoryView { times, levels })
}

/// Project the full current-state view from a newest-first slice.
pub fn project_status(newest_first: &[Reading], offset: FixedOffset) -> Result<TankStatus> {
    let history = project_history(newest_first, offset)?;
    // project_history already rejected the empty slice.
    let newest = &newest_first[0];

    let table = newest_first
        .iter()
        .map(|r| TableRow {
            recorded_at: localize(r.recorded_at, offset).format(DATE_TIME_FORMAT).to_string(),
            distance_cm: r.distance_cm,
            level_label: r.level_label.clone(),
            capacity_percent: r.capacity_percent,
            pump_on: r.pump_on,
            tank_height_cm: r.tank_height_cm,
        })
        .collect();

    Ok(TankStatus {
        level_label: newest.level_label.clone(),
        distance_cm: newest.distance_cm,
        capacity_percent: newest.capacity_percent,
        pump_status: if newest.pump_on == Some(true) { "ON" } else { "OFF" },
        tank_height_cm: newest.tank_height_cm,
        last_updated: localize(newest.recorded_at, offset)
            .format(DATE_TIME_FORMAT)
            .to_string(),
        history,
        table,
    })
}
