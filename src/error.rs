use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::BookingStatus;

/// Why a requested slot was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotRejection {
    DayClosed { day_of_week: u8 },
    OutsideHours { start: String, end: String },
    Absent { reason: String },
    ServiceRestricted,
    ServiceInactive,
}

impl fmt::Display for SlotRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayClosed { day_of_week } => write!(f, "weekday {day_of_week} is closed"),
            Self::OutsideHours { start, end } => write!(f, "outside opening hours {start}-{end}"),
            Self::Absent { reason } if reason.is_empty() => f.write_str("professional is absent"),
            Self::Absent { reason } => write!(f, "professional is absent ({reason})"),
            Self::ServiceRestricted => f.write_str("service not offered on this weekday"),
            Self::ServiceInactive => f.write_str("service is no longer offered"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(SlotRejection),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Persistence failure: {0}")]
    Persistence(DatabaseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl AgendaError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Validation failures the caller should re-prompt on.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SlotUnavailable(_) | Self::InvalidTransition { .. } | Self::InvalidInput(_)
        )
    }
}

impl From<DatabaseError> for AgendaError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Persistence(other),
        }
    }
}
