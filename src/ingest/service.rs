use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::db::models::{NewReading, Reading};
use crate::error::{Error, Result};
use crate::store::ReadingStore;

/// Device telemetry contract. Every field is optional: absent fields are
/// stored as absent, never defaulted, so "unknown" stays distinguishable
/// from "measured zero".
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPayload {
    /// Raw ultrasonic distance to the water surface, centimetres.
    pub distance_cm: Option<f64>,
    /// Fill classification computed on the device, e.g. "LOW".
    pub level_label: Option<String>,
    /// Tank fill percentage, 0–100.
    pub capacity_percent: Option<i32>,
    pub pump_on: Option<bool>,
    /// Calibrated tank height, reported after a calibration run.
    pub tank_height_cm: Option<f64>,
}

/// Validates and normalizes incoming telemetry and appends it to the store.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn ReadingStore>,
}

impl IngestService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Accept one raw telemetry submission.
    ///
    /// The timestamp is assigned here, at the moment of acceptance — a
    /// client-supplied timestamp is never trusted, so ordering stays sane
    /// against the server's own clock.
    pub async fn submit(&self, raw: serde_json::Value) -> Result<Reading> {
        if !raw.is_object() {
            return Err(Error::InvalidPayload(
                "payload must be a JSON object".to_owned(),
            ));
        }

        let payload: TelemetryPayload = serde_json::from_value(raw)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?;

        if let Some(capacity) = payload.capacity_percent {
            if !(0..=100).contains(&capacity) {
                return Err(Error::InvalidPayload(format!(
                    "capacityPercent must be within 0..=100, got {capacity}"
                )));
            }
        }

        let reading = self
            .store
            .append(NewReading {
                recorded_at: Utc::now(),
                distance_cm: payload.distance_cm,
                level_label: payload.level_label,
                capacity_percent: payload.capacity_percent,
                pump_on: payload.pump_on,
                tank_height_cm: payload.tank_height_cm,
            })
            .await?;

        info!(
            id = %reading.id,
            capacity_percent = ?reading.capacity_percent,
            level = ?reading.level_label,
            "Telemetry reading stored"
        );
        Ok(reading)
    }
}
