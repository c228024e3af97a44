use serde::{Deserialize, Serialize};

/// ControlMapping - one control-to-framework association row
///
/// Unique per `(control_id, framework_id)`; `reference_name` is the control's
/// reference code within that particular framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMapping {
    pub control_id: i64,
    pub framework_id: i64,
    pub reference_name: String,
}

/// Input pair for the replace-all mapping operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub framework_id: i64,
    pub reference_name: String,
}

impl MappingEntry {
    pub fn new(framework_id: i64, reference_name: impl Into<String>) -> Self {
        Self {
            framework_id,
            reference_name: reference_name.into(),
        }
    }
}

/// Mapping row joined with its framework's decoded display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedFramework {
    pub control_id: i64,
    pub framework_id: i64,
    pub reference_name: String,
    pub framework_name: String,
    pub framework_description: String,
}
