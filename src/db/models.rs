use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One immutable telemetry sample from the tank sensor.
///
/// `recorded_at` is assigned server-side at ingestion; the device clock is
/// never trusted. Optional fields stay `None` when the device omitted them —
/// a tank can legitimately report 0 % capacity, so "unknown" must stay
/// distinguishable from "measured zero".
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Raw ultrasonic distance to the water surface, centimetres.
    pub distance_cm: Option<f64>,
    /// Discrete fill classification as reported by the device
    /// (e.g. "LOW", "MEDIUM", "FULL").
    pub level_label: Option<String>,
    /// Tank fill percentage, 0–100.
    pub capacity_percent: Option<i32>,
    /// Pump state at the moment of the reading, as reported by the device.
    /// Distinct from the control mode.
    pub pump_on: Option<bool>,
    /// Calibrated tank height, present once calibration has occurred.
    pub tank_height_cm: Option<f64>,
}

/// A reading as accepted by the ingest gateway, before the store assigns
/// its record id.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub recorded_at: DateTime<Utc>,
    pub distance_cm: Option<f64>,
    pub level_label: Option<String>,
    pub capacity_percent: Option<i32>,
    pub pump_on: Option<bool>,
    pub tank_height_cm: Option<f64>,
}

/// Pump operating mode. Wire representation is `"AUTO"` / `"MANUAL"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Auto,
    Manual,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Auto => "AUTO",
            Mode::Manual => "MANUAL",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(Mode::Auto),
            "MANUAL" => Ok(Mode::Manual),
            other => Err(format!("unknown mode: {other:?}")),
        }
    }
}

/// The singleton control document.
///
/// Append-only readings and this read-modify-write register have
/// fundamentally different write patterns; they are deliberately separate
/// entities and must not be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub mode: Mode,
    /// The operator's desired pump state while in MANUAL mode.
    /// Meaningless in AUTO mode but still stored.
    pub manual_pump_request: bool,
    /// Edge-triggered latch: set by an operator action, cleared exactly once
    /// when a device poll observes it true.
    pub calibration_pending: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            manual_pump_request: false,
            calibration_pending: false,
        }
    }
}
