use serde::{Deserialize, Serialize};

/// Actor - the acting user identity passed into every mutating operation
///
/// Carried explicitly rather than read from ambient session state; audit
/// messages name `username`, audit records key on `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub username: String,
}

impl Actor {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Identity used by internal maintenance callers.
    pub fn system() -> Self {
        Self::new(0, "system")
    }
}
