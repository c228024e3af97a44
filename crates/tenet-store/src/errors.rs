//! Error handling for tenet-store
//!
//! Wraps tenet-core GovernanceError with store-specific helpers

use tenet_core::errors::GovernanceError;

/// Result type alias using GovernanceError
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> GovernanceError {
    GovernanceError::Storage {
        op: "migration".to_string(),
        message: format!("Migration {} failed: {}", migration_id, reason),
    }
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> GovernanceError {
    GovernanceError::Storage {
        op: "sqlite".to_string(),
        message: err.to_string(),
    }
}
