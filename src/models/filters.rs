use chrono::NaiveDate;
use uuid::Uuid;

use super::enums::BookingStatus;

#[derive(Debug, Default)]
pub struct BookingFilter {
    pub professional_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn for_professional(professional_id: Uuid) -> Self {
        Self {
            professional_id: Some(professional_id),
            ..Self::default()
        }
    }

    pub fn for_client(client_id: Uuid) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }
}
