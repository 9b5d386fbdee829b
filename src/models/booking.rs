use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Actor, BookingOrigin, BookingStatus};

/// Duration used when neither the request nor the service gives one.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Longest booking accepted: one full day.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub client_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub address: String,
    pub notes: Option<String>,
    pub client: Option<ClientContact>,
    pub price_ht: f64,
    pub price_ttc: f64,
    pub status: BookingStatus,
    pub origin: BookingOrigin,
    pub last_actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Minutes since midnight of the start and end, for overlap checks.
    pub fn minute_span(&self) -> (u32, u32) {
        let start = self.time.hour() * 60 + self.time.minute();
        (start, start.saturating_add(self.duration_minutes))
    }

    /// Day the work was finished: the completion stamp, else the booked date.
    pub fn completion_date(&self) -> NaiveDate {
        self.completed_at
            .map(|at| at.date_naive())
            .unwrap_or(self.date)
    }
}

/// Booking requested by a client through the public booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: Option<u32>,
    pub address: String,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
    pub client: Option<ClientContact>,
    pub price_ht: Option<f64>,
    pub price_ttc: Option<f64>,
}

/// Booking entered by the professional in their own calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualBookingRequest {
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: Option<u32>,
    pub address: String,
    pub notes: Option<String>,
    pub client: Option<ClientContact>,
    pub price_ht: Option<f64>,
    pub price_ttc: Option<f64>,
}
