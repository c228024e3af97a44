use serde::{Deserialize, Serialize};

use crate::errors::{GovernanceError, Result};

/// FrameworkControl - an individual compliance requirement
///
/// Controls are flat records; their framework memberships live in the mapping
/// table. Classification attributes (`control_owner`, `control_class`, ...)
/// reference external vocabularies by id, with `None` meaning unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkControl {
    pub id: i64,
    pub short_name: String,
    pub long_name: String,
    pub description: String,
    pub supplemental_guidance: String,

    /// Reference code within the control's own numbering scheme
    pub control_number: String,

    pub control_owner: Option<i64>,
    pub control_class: Option<i64>,
    pub control_phase: Option<i64>,
    pub control_priority: Option<i64>,
    pub family: Option<i64>,

    /// Current maturity rating (ordinal)
    pub control_maturity: i64,

    /// Desired maturity rating (ordinal)
    pub desired_maturity: i64,

    /// 0-100
    pub mitigation_percent: i64,

    /// Tombstone flag; soft-deleted controls stay out of every query surface
    pub deleted: bool,
}

impl FrameworkControl {
    /// Check if this control is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Gap between desired and current maturity (negative when ahead)
    pub fn maturity_gap(&self) -> i64 {
        self.desired_maturity - self.control_maturity
    }
}

/// Write shape shared by control create and full-record update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlRecord {
    pub short_name: String,
    pub long_name: String,
    pub description: String,
    pub supplemental_guidance: String,
    pub control_number: String,
    pub control_owner: Option<i64>,
    pub control_class: Option<i64>,
    pub control_phase: Option<i64>,
    pub control_priority: Option<i64>,
    pub family: Option<i64>,
    pub control_maturity: i64,
    pub desired_maturity: i64,
    pub mitigation_percent: i64,
}

impl ControlRecord {
    /// Minimal record with a short name and control number.
    pub fn new(short_name: impl Into<String>, control_number: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            control_number: control_number.into(),
            ..Self::default()
        }
    }

    /// Validate the record before it is written.
    pub fn validate(&self) -> Result<()> {
        if !(0..=100).contains(&self.mitigation_percent) {
            return Err(GovernanceError::InvalidMitigationPercent {
                value: self.mitigation_percent,
            });
        }
        Ok(())
    }
}

/// Outcome of a control deletion.
///
/// A control referenced by at least one audit/test record is tombstoned
/// instead of removed, so historical audits keep resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlDeletion {
    SoftDeleted,
    HardDeleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_percent_bounds() {
        let mut record = ControlRecord::new("AC-1", "AC-1");
        record.mitigation_percent = 0;
        assert!(record.validate().is_ok());
        record.mitigation_percent = 100;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_percent() {
        let mut record = ControlRecord::new("AC-1", "AC-1");
        record.mitigation_percent = 101;
        let err = record.validate().unwrap_err();
        assert_eq!(
            err,
            GovernanceError::InvalidMitigationPercent { value: 101 }
        );
        record.mitigation_percent = -5;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_maturity_gap() {
        let control = FrameworkControl {
            id: 1,
            short_name: "AC-2".into(),
            long_name: String::new(),
            description: String::new(),
            supplemental_guidance: String::new(),
            control_number: "AC-2".into(),
            control_owner: None,
            control_class: None,
            control_phase: None,
            control_priority: None,
            family: None,
            control_maturity: 2,
            desired_maturity: 4,
            mitigation_percent: 0,
            deleted: false,
        };
        assert_eq!(control.maturity_gap(), 2);
    }
}
