use thiserror::Error;

/// Result type alias using GovernanceError
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Flat error classification
///
/// Three kinds cover every failure the engine can return. None of them is
/// retried automatically; a caller that wants retry re-issues the whole
/// logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input (blank name, duplicate name, cycle, bad percent)
    Validation,
    /// A referenced framework/control/document/exception id does not exist
    NotFound,
    /// Underlying storage failure; the enclosing transaction rolled back
    Storage,
}

/// Error taxonomy for governance operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GovernanceError {
    // ===== Not-found =====
    /// Framework not found in store
    #[error("Framework not found: {framework_id}")]
    FrameworkNotFound { framework_id: i64 },

    /// Control not found in store
    #[error("Control not found: {control_id}")]
    ControlNotFound { control_id: i64 },

    /// Document not found in store
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: i64 },

    /// Exception not found in store
    #[error("Exception not found: {exception_id}")]
    ExceptionNotFound { exception_id: i64 },

    // ===== Validation =====
    /// Name is blank or otherwise unusable
    #[error("Invalid framework name: {reason}")]
    InvalidName { reason: String },

    /// Another framework already carries this name
    #[error("A framework named \"{name}\" already exists")]
    DuplicateName { name: String },

    /// Requested reparent would make the framework its own ancestor
    #[error(
        "Circular reference: parent {proposed_parent} is in the ancestry of framework {framework_id}"
    )]
    CircularParent {
        framework_id: i64,
        proposed_parent: i64,
    },

    /// Mitigation percent outside 0-100
    #[error("Mitigation percent must be within 0-100, got {value}")]
    InvalidMitigationPercent { value: i64 },

    // ===== Storage =====
    /// Storage engine failure; surfaced after the transaction rolled back
    #[error("Storage failure in {op}: {message}")]
    Storage { op: String, message: String },
}

impl GovernanceError {
    /// Get the flat classification for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::FrameworkNotFound { .. }
            | GovernanceError::ControlNotFound { .. }
            | GovernanceError::DocumentNotFound { .. }
            | GovernanceError::ExceptionNotFound { .. } => ErrorKind::NotFound,
            GovernanceError::InvalidName { .. }
            | GovernanceError::DuplicateName { .. }
            | GovernanceError::CircularParent { .. }
            | GovernanceError::InvalidMitigationPercent { .. } => ErrorKind::Validation,
            GovernanceError::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::FrameworkNotFound { .. } => "ERR_FRAMEWORK_NOT_FOUND",
            GovernanceError::ControlNotFound { .. } => "ERR_CONTROL_NOT_FOUND",
            GovernanceError::DocumentNotFound { .. } => "ERR_DOCUMENT_NOT_FOUND",
            GovernanceError::ExceptionNotFound { .. } => "ERR_EXCEPTION_NOT_FOUND",
            GovernanceError::InvalidName { .. } => "ERR_INVALID_NAME",
            GovernanceError::DuplicateName { .. } => "ERR_DUPLICATE_NAME",
            GovernanceError::CircularParent { .. } => "ERR_CIRCULAR_PARENT",
            GovernanceError::InvalidMitigationPercent { .. } => "ERR_INVALID_MITIGATION_PERCENT",
            GovernanceError::Storage { .. } => "ERR_STORAGE",
        }
    }
}
