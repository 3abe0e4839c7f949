use thiserror::Error;

/// Error taxonomy of the telemetry core.
///
/// The HTTP boundary (`api::errors`) maps each variant to a status code;
/// nothing in the core retries or swallows these.
#[derive(Debug, Error)]
pub enum Error {
    /// Ingestion payload is not a JSON object, has a wrongly typed field,
    /// or carries an out-of-range capacity.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Bad query parameter, e.g. a non-positive history limit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Query against an empty store. Never answered with a zeroed view.
    #[error("no readings recorded yet")]
    NoData,

    /// Backend unreachable or a read/write failed. Surfaced to the caller,
    /// who decides whether to retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// A condition that must never occur, e.g. history time/level sequences
    /// of mismatched length. Fail loudly.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_are_stable() {
        // The HTTP boundary surfaces these verbatim; clients match on them.
        assert_eq!(Error::NoData.to_string(), "no readings recorded yet");
        assert_eq!(
            Error::InvalidPayload("payload must be a JSON object".into()).to_string(),
            "invalid payload: payload must be a JSON object"
        );
        assert_eq!(
            Error::InvalidArgument("limit must be a positive integer, got 0".into()).to_string(),
            "invalid argument: limit must be a positive integer, got 0"
        );
        assert!(Error::InvariantViolation("boom".into())
            .to_string()
            .starts_with("internal invariant violated"));
    }

    #[test]
    fn sqlx_errors_convert_to_storage_unavailable() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, Error::StorageUnavailable(_)));
        assert!(err.to_string().starts_with("storage unavailable"));
    }
}
