mod service;

pub use service::{IngestService, TelemetryPayload};
