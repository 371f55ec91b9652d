//! Conversions between `sqlx` and domain values.

use httpsms_core::error::DomainError;
use tracing::error;

pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    error!(error = %err, "database error");
    DomainError::Infrastructure(err.to_string())
}

/// Page bounds as `BIGINT` parameters.
pub(crate) fn page(skip: u32, limit: u32) -> (i64, i64) {
    (i64::from(skip), i64::from(limit))
}

/// Parses a stored enum column, reporting bad data as infrastructure.
pub(crate) fn parse_column<T>(value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    value.parse().map_err(|err| match err {
        infra @ DomainError::Infrastructure(_) => infra,
        other => DomainError::Infrastructure(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use httpsms_core::event::EventType;
    use httpsms_core::listener_log::ListenerStatus;

    use super::*;

    #[test]
    fn test_parse_column_reads_known_value() {
        let status = parse_column::<ListenerStatus>("success").unwrap();

        assert_eq!(status, ListenerStatus::Success);
    }

    #[test]
    fn test_parse_column_keeps_infrastructure_error_message() {
        let err = parse_column::<ListenerStatus>("exploded").unwrap_err();

        assert!(
            matches!(err, DomainError::Infrastructure(ref msg) if msg == "unknown listener status: exploded")
        );
    }

    #[test]
    fn test_parse_column_reports_validation_error_as_infrastructure() {
        let err = parse_column::<EventType>("message.unknown").unwrap_err();

        assert!(
            matches!(err, DomainError::Infrastructure(ref msg) if msg.contains("unknown event type"))
        );
    }
}
