use serde::{Deserialize, Serialize};

/// Activation state of a framework node.
///
/// Stored as an integer in the `frameworks` table: 1 = active, 2 = inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameworkStatus {
    Active,
    Inactive,
}

impl FrameworkStatus {
    /// Integer representation used by the persisted layout.
    pub const fn as_i64(self) -> i64 {
        match self {
            FrameworkStatus::Active => 1,
            FrameworkStatus::Inactive => 2,
        }
    }

    /// Decode the persisted integer, rejecting anything but 1 or 2.
    pub const fn from_i64(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(FrameworkStatus::Active),
            2 => Some(FrameworkStatus::Inactive),
            _ => None,
        }
    }
}

/// Framework - a named compliance standard organized as a parent-pointer tree
///
/// Frameworks form a forest: `parent == 0` marks a root. The parent graph must
/// stay acyclic; every walk over it in this crate carries a visited-set so that
/// even corrupt data cannot loop an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    /// Surrogate key (the `value` column)
    pub id: i64,

    /// Display name (held decoded in memory; the store encodes at rest)
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Parent framework id, 0 for roots
    pub parent: i64,

    /// Activation state
    pub status: FrameworkStatus,

    /// Display sequence among siblings of equal status (not required unique)
    pub order: i64,
}

impl Framework {
    /// Create a framework record with the given id and name
    ///
    /// Starts as an active root with order 0.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            parent: 0,
            status: FrameworkStatus::Active,
            order: 0,
        }
    }

    /// Check if this framework is a root (parent == 0)
    pub fn is_root(&self) -> bool {
        self.parent == 0
    }

    /// Check if this framework is in the active state
    pub fn is_active(&self) -> bool {
        self.status == FrameworkStatus::Active
    }
}

/// Input shape for creating a framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFramework {
    pub name: String,
    pub description: String,
    pub parent: i64,
    pub status: FrameworkStatus,
}

impl NewFramework {
    /// New active root framework with the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parent: 0,
            status: FrameworkStatus::Active,
        }
    }

    /// Place the framework under the given parent.
    pub fn under(mut self, parent: i64) -> Self {
        self.parent = parent;
        self
    }

    /// Create the framework in the given state.
    pub fn with_status(mut self, status: FrameworkStatus) -> Self {
        self.status = status;
        self
    }
}

/// Input shape for updating a framework.
///
/// `name` is always required; `description` and `parent` are only written when
/// supplied, otherwise the stored values are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkPatch {
    pub name: String,
    pub description: Option<String>,
    pub parent: Option<i64>,
}

impl FrameworkPatch {
    /// Rename-only patch keeping description and parent untouched.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parent: None,
        }
    }

    /// Also replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Also move the framework under the given parent (0 re-roots it).
    pub fn with_parent(mut self, parent: i64) -> Self {
        self.parent = Some(parent);
        self
    }
}
