use anyhow::{ensure, Context, Result};
use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Absent selects the in-memory backend.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    /// Default history window for the current-state and history views.
    pub history_limit: i64,
    /// Canonical offset used for every rendered timestamp, e.g. `-05:00`.
    pub display_utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let history_limit: i64 = optional("HISTORY_LIMIT", "15")
            .parse()
            .context("HISTORY_LIMIT must be an integer")?;
        ensure!(history_limit > 0, "HISTORY_LIMIT must be positive");

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            history_limit,
            display_utc_offset: parse_display_offset(&optional("DISPLAY_UTC_OFFSET", "+00:00"))?,
        })
    }
}

/// Parse an offset like `"+02:00"` or `"-05:00"`.
fn parse_display_offset(raw: &str) -> Result<FixedOffset> {
    raw.parse()
        .ok()
        .with_context(|| format!("DISPLAY_UTC_OFFSET must look like \"+02:00\", got {raw:?}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
