//! Repository layer: entity-scoped database operations plus the
//! persistence traits the agenda components are built against.
//!
//! Components never touch SQL directly. They receive something that
//! implements the traits below; `rusqlite::Connection` is the production
//! implementation, tests may substitute their own.

mod absence;
mod availability;
mod booking;
mod profile;
mod proof;
mod service;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::*;

pub use absence::*;
pub use availability::*;
pub use booking::*;
pub use profile::*;
pub use proof::*;
pub use service::*;

// ═══════════════════════════════════════════
// Persistence boundary
// ═══════════════════════════════════════════

pub trait AvailabilityRepository {
    fn load_availability(&self, professional_id: &Uuid) -> Result<Vec<AvailabilityRule>, DatabaseError>;
    /// Insert or replace the row for the rule's (professional, weekday).
    fn save_availability_rule(&self, rule: &AvailabilityRule) -> Result<(), DatabaseError>;
    fn load_absences(&self, professional_id: &Uuid) -> Result<Vec<AbsenceBlock>, DatabaseError>;
    fn insert_absence(&self, block: &AbsenceBlock) -> Result<(), DatabaseError>;
    fn delete_absence(&self, id: &Uuid) -> Result<(), DatabaseError>;
}

pub trait BookingRepository {
    fn load_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DatabaseError>;
    fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, DatabaseError>;
    fn insert_booking(&self, booking: &Booking) -> Result<(), DatabaseError>;
    fn update_booking(&self, booking: &Booking) -> Result<(), DatabaseError>;
}

/// Read-only service catalog.
pub trait CatalogRepository {
    fn find_service(&self, id: &Uuid) -> Result<Option<ServiceOffering>, DatabaseError>;
    fn list_services(&self, professional_id: &Uuid) -> Result<Vec<ServiceOffering>, DatabaseError>;
}

/// Read-only proof-of-work lookup. `None` is a valid answer (no proof).
pub trait ProofRepository {
    fn find_proof(&self, booking_id: &Uuid) -> Result<Option<ProofOfWork>, DatabaseError>;
}

pub trait ProfileRepository {
    fn load_profile(&self, id: &Uuid) -> Result<Option<ProfessionalProfile>, DatabaseError>;
    fn save_profile(&self, profile: &ProfessionalProfile) -> Result<(), DatabaseError>;
}

/// Everything the agenda needs from one store.
pub trait AgendaRepository:
    AvailabilityRepository + BookingRepository + CatalogRepository + ProofRepository + ProfileRepository
{
}

impl<T> AgendaRepository for T where
    T: AvailabilityRepository + BookingRepository + CatalogRepository + ProofRepository + ProfileRepository
{
}

// ═══════════════════════════════════════════
// SQLite implementation
// ═══════════════════════════════════════════

impl AvailabilityRepository for Connection {
    fn load_availability(&self, professional_id: &Uuid) -> Result<Vec<AvailabilityRule>, DatabaseError> {
        get_availability(self, professional_id)
    }

    fn save_availability_rule(&self, rule: &AvailabilityRule) -> Result<(), DatabaseError> {
        upsert_availability_rule(self, rule)
    }

    fn load_absences(&self, professional_id: &Uuid) -> Result<Vec<AbsenceBlock>, DatabaseError> {
        get_absences(self, professional_id)
    }

    fn insert_absence(&self, block: &AbsenceBlock) -> Result<(), DatabaseError> {
        insert_absence_row(self, block)
    }

    fn delete_absence(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_absence_row(self, id)
    }
}

impl BookingRepository for Connection {
    fn load_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DatabaseError> {
        list_bookings(self, filter)
    }

    fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, DatabaseError> {
        get_booking_row(self, id)
    }

    fn insert_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        insert_booking_row(self, booking)
    }

    fn update_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        update_booking_row(self, booking)
    }
}

impl CatalogRepository for Connection {
    fn find_service(&self, id: &Uuid) -> Result<Option<ServiceOffering>, DatabaseError> {
        get_service(self, id)
    }

    fn list_services(&self, professional_id: &Uuid) -> Result<Vec<ServiceOffering>, DatabaseError> {
        get_services_for_professional(self, professional_id)
    }
}

impl ProofRepository for Connection {
    fn find_proof(&self, booking_id: &Uuid) -> Result<Option<ProofOfWork>, DatabaseError> {
        get_proof(self, booking_id)
    }
}

impl ProfileRepository for Connection {
    fn load_profile(&self, id: &Uuid) -> Result<Option<ProfessionalProfile>, DatabaseError> {
        get_profile(self, id)
    }

    fn save_profile(&self, profile: &ProfessionalProfile) -> Result<(), DatabaseError> {
        upsert_profile(self, profile)
    }
}

// ═══════════════════════════════════════════
// Column decoding helpers
// ═══════════════════════════════════════════

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn invalid_column(idx: usize, field: &str, value: &str) -> rusqlite::Error {
    conversion_error(
        idx,
        DatabaseError::InvalidValue {
            field: field.into(),
            value: value.into(),
        },
    )
}

pub(crate) fn uuid_col(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_uuid_col(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => Uuid::parse_str(&raw)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn date_col(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub(crate) fn time_col(row: &Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    parse_clock(&raw).ok_or_else(|| invalid_column(idx, "time", &raw))
}

pub(crate) fn datetime_col(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_datetime_col(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn enum_col<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_enum_col<T>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = DatabaseError>,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => T::from_str(&raw)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}
