use thiserror::Error;

/// Failures surfaced by the stores and the portal façade. The CLI turns these
/// into messages; nothing in the core retries.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    ConstraintViolation(String),

    #[error("You have already applied for this job.")]
    DuplicateApplication { job_id: i64, jobseeker_id: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Storage(#[source] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn not_found(what: impl Into<String>) -> Self {
        PortalError::NotFound(what.into())
    }
}

impl From<rusqlite::Error> for PortalError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => PortalError::ConstraintViolation(err.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::ReadOnly,
            ) => PortalError::Connectivity(err.to_string()),
            _ => PortalError::Storage(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: std::os::raw::c_int, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), Some(message.to_string()))
    }

    #[test]
    fn test_unique_failure_maps_to_constraint_violation() {
        let err: PortalError = sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: employer.company",
        )
        .into();
        match err {
            PortalError::ConstraintViolation(msg) => assert!(msg.contains("employer.company")),
            other => panic!("expected constraint violation, got {other:?}"),
        }
    }

    #[test]
    fn test_busy_failure_maps_to_connectivity() {
        let err: PortalError = sqlite_failure(rusqlite::ffi::SQLITE_BUSY, "database is locked").into();
        assert!(matches!(err, PortalError::Connectivity(_)));
    }

    #[test]
    fn test_other_failures_are_storage_errors() {
        let err: PortalError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, PortalError::Storage(_)));
    }

    #[test]
    fn test_duplicate_application_has_friendly_message() {
        let err = PortalError::DuplicateApplication { job_id: 1, jobseeker_id: 2 };
        assert_eq!(err.to_string(), "You have already applied for this job.");
    }
}
