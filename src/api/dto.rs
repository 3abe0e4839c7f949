use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{ControlState, Mode, Reading};
use crate::projection::{HistoryView, TableRow, TankStatus};

/// One stored reading, all fields, timestamp as a zone-aware instant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub distance_cm: Option<f64>,
    pub level_label: Option<String>,
    pub capacity_percent: Option<i32>,
    pub pump_on: Option<bool>,
    pub tank_height_cm: Option<f64>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            recorded_at: r.recorded_at,
            distance_cm: r.distance_cm,
            level_label: r.level_label,
            capacity_percent: r.capacity_percent,
            pump_on: r.pump_on,
            tank_height_cm: r.tank_height_cm,
        }
    }
}

/// Response for `GET /api/data`: the current tank state plus the aligned
/// history sequences and the newest-first table.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TankStatusDto {
    pub level_label: Option<String>,
    pub distance_cm: Option<f64>,
    pub capacity_percent: Option<i32>,
    /// `"ON"` or `"OFF"`.
    pub pump_status: String,
    pub tank_height_cm: Option<f64>,
    /// Localized `YYYY-MM-DD HH:MM:SS` in the deployment's display zone.
    pub last_updated: String,
    /// Time-of-day strings, oldest first. Index-aligned with `historyLevels`.
    pub history_times: Vec<String>,
    /// Level labels, oldest first. Index-aligned with `historyTimes`.
    pub history_levels: Vec<Option<String>>,
    pub table: Vec<TableRowDto>,
}

impl From<TankStatus> for TankStatusDto {
    fn from(s: TankStatus) -> Self {
        Self {
            level_label: s.level_label,
            distance_cm: s.distance_cm,
            capacity_percent: s.capacity_percent,
            pump_status: s.pump_status.to_owned(),
            tank_height_cm: s.tank_height_cm,
            last_updated: s.last_updated,
            history_times: s.history.times,
            history_levels: s.history.levels,
            table: s.table.into_iter().map(Into::into).collect(),
        }
    }
}

/// One table row; timestamp localized for display.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableRowDto {
    pub recorded_at: String,
    pub distance_cm: Option<f64>,
    pub level_label: Option<String>,
    pub capacity_percent: Option<i32>,
    pub pump_on: Option<bool>,
    pub tank_height_cm: Option<f64>,
}

impl From<TableRow> for TableRowDto {
    fn from(r: TableRow) -> Self {
        Self {
            recorded_at: r.recorded_at,
            distance_cm: r.distance_cm,
            level_label: r.level_label,
            capacity_percent: r.capacity_percent,
            pump_on: r.pump_on,
            tank_height_cm: r.tank_height_cm,
        }
    }
}

/// Response for `GET /api/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryDto {
    pub times: Vec<String>,
    pub levels: Vec<Option<String>>,
}

impl From<HistoryView> for HistoryDto {
    fn from(h: HistoryView) -> Self {
        Self {
            times: h.times,
            levels: h.levels,
        }
    }
}

/// Control state as returned by every control endpoint. For the device
/// poll, `calibrationPending` is the pre-clear snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlStateDto {
    pub mode: Mode,
    pub manual_pump_request: bool,
    pub calibration_pending: bool,
}

impl From<ControlState> for ControlStateDto {
    fn from(s: ControlState) -> Self {
        Self {
            mode: s.mode,
            manual_pump_request: s.manual_pump_request,
            calibration_pending: s.calibration_pending,
        }
    }
}

/// Request body for `POST /api/control/manual`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualModeRequest {
    /// Desired pump state while in MANUAL mode.
    pub pump_on: bool,
}
