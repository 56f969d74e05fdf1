use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unknown link type '{0}'")]
    UnknownLinkType(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Raised by `testing::FaultInjectingClient`.
    #[cfg(feature = "testing")]
    #[error("Injected fault: {0}")]
    InjectedFault(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Older SQLite builds only report the primary result code, so fall
            // back to the message text.
            if db_err.is_unique_violation() || db_err.message().contains("UNIQUE constraint failed")
            {
                return Self::ConstraintViolation(db_err.message().to_string());
            }
        }
        Self::Database(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_a_constraint_violation() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_constraint_violation());
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_display_messages() {
        let err = StoreError::UnknownLinkType("podcast".into());
        assert_eq!(err.to_string(), "Unknown link type 'podcast'");

        let err = StoreError::ConstraintViolation("UNIQUE constraint failed: talks.stub".into());
        assert!(err.is_constraint_violation());
        assert!(err.to_string().starts_with("Constraint violation"));
    }
}
