//! Record Status
//!
//! Workflow status of a record. `Pending` is the only non-terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Awaiting review by the owner
    #[default]
    Pending,
    /// Accepted and processed
    Processed,
    /// Rejected
    Rejected,
}

impl RecordStatus {
    /// All statuses, in display order
    pub const ALL: [RecordStatus; 3] = [
        RecordStatus::Pending,
        RecordStatus::Processed,
        RecordStatus::Rejected,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Processed => "processed",
            RecordStatus::Rejected => "rejected",
        }
    }

    /// Terminal statuses admit no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }

    /// Check whether `self -> target` is a legal transition
    pub fn can_transition_to(&self, target: RecordStatus) -> bool {
        matches!(
            (self, target),
            (RecordStatus::Pending, RecordStatus::Processed)
                | (RecordStatus::Pending, RecordStatus::Rejected)
        )
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "processed" => Ok(RecordStatus::Processed),
            "rejected" => Ok(RecordStatus::Rejected),
            other => Err(format!("unknown record status: {}", other)),
        }
    }
}
