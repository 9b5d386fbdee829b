use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidence captured on site when an intervention is finished.
/// Produced by the field app; the agenda only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofOfWork {
    pub booking_id: Uuid,
    pub before_photos: u32,
    pub after_photos: u32,
    pub has_signature: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl ProofOfWork {
    pub fn photo_count(&self) -> u32 {
        self.before_photos + self.after_photos
    }

    pub fn has_geo_stamp(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
