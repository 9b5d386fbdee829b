use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::classify::{classify_service, next_maintenance, warranty_for, Warranty};
use super::score::{health_by_property, health_score, maintenance_timeline, punctuality, PropertyHealth, Punctuality, TimelineEntry};
use crate::db::{CatalogRepository, ProofRepository};
use crate::error::AgendaError;
use crate::models::*;

/// Compliance view of one completed intervention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRecord {
    pub booking_id: Uuid,
    pub address: String,
    pub service_name: String,
    pub category: WorkCategory,
    pub completed_on: NaiveDate,
    pub has_proof: bool,
    pub photo_count: u32,
    pub has_signature: bool,
    pub has_geo_stamp: bool,
    pub warranty: Warranty,
    pub next_maintenance_date: NaiveDate,
}

impl ComplianceRecord {
    /// Build a record from a booking and its proof of work, if any.
    pub fn build(booking: &Booking, service_name: &str, proof: Option<&ProofOfWork>) -> Self {
        let completed_on = booking.completion_date();
        let category = classify_service(service_name);

        Self {
            booking_id: booking.id,
            address: booking.address.clone(),
            service_name: service_name.to_string(),
            category,
            completed_on,
            has_proof: proof.is_some(),
            photo_count: proof.map(ProofOfWork::photo_count).unwrap_or(0),
            has_signature: proof.is_some_and(|p| p.has_signature),
            has_geo_stamp: proof.is_some_and(ProofOfWork::has_geo_stamp),
            warranty: warranty_for(category, completed_on),
            next_maintenance_date: next_maintenance(completed_on),
        }
    }
}

/// Everything the compliance dashboard shows for one professional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub health_score: u8,
    pub properties: Vec<PropertyHealth>,
    pub punctuality: Punctuality,
    pub timeline: Vec<TimelineEntry>,
    pub records: Vec<ComplianceRecord>,
}

/// Builds compliance records from the completed-booking feed, looking up
/// service names in the catalog and evidence in the proof store.
pub struct ComplianceScorer<'r, R: CatalogRepository + ProofRepository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: CatalogRepository + ProofRepository + ?Sized> ComplianceScorer<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Records for the completed bookings in `bookings`; others are skipped.
    pub fn records(&self, bookings: &[Booking]) -> Result<Vec<ComplianceRecord>, AgendaError> {
        let mut records = Vec::new();
        for booking in bookings.iter().filter(|b| b.status == BookingStatus::Completed) {
            let service_name = self.service_name(booking)?;
            let proof = self.repo.find_proof(&booking.id)?;
            records.push(ComplianceRecord::build(booking, &service_name, proof.as_ref()));
        }
        tracing::debug!(records = records.len(), "Compliance records built");
        Ok(records)
    }

    pub fn report(&self, bookings: &[Booking], today: NaiveDate) -> Result<ComplianceReport, AgendaError> {
        let records = self.records(bookings)?;
        Ok(ComplianceReport {
            health_score: health_score(&records, today),
            properties: health_by_property(&records, today),
            punctuality: punctuality(bookings),
            timeline: maintenance_timeline(&records, today),
            records,
        })
    }

    /// Catalog name, else the booking notes for entries made without a
    /// service. A service removed from the catalog classifies as other.
    fn service_name(&self, booking: &Booking) -> Result<String, AgendaError> {
        if let Some(id) = booking.service_id {
            if let Some(service) = self.repo.find_service(&id)? {
                return Ok(service.name);
            }
        }
        Ok(booking.notes.clone().unwrap_or_default())
    }
}
