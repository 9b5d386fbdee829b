use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AbsenceSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceBlock {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub reason: String,
    pub label: String,
    pub source: AbsenceSource,
    pub created_at: DateTime<Utc>,
}

impl AbsenceBlock {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Outcome of an absence lookup for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStatus {
    pub blocked: bool,
    pub absence_id: Option<Uuid>,
    pub reason: Option<String>,
    pub label: Option<String>,
    pub source: Option<AbsenceSource>,
}

impl BlockStatus {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn from_block(block: &AbsenceBlock) -> Self {
        Self {
            blocked: true,
            absence_id: Some(block.id),
            reason: Some(block.reason.clone()),
            label: Some(block.label.clone()),
            source: Some(block.source),
        }
    }
}
