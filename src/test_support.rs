//! Shared fixtures for the in-module test suites.

use std::cell::Cell;

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::*;
use crate::models::*;

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn seed_professional(conn: &Connection) -> Uuid {
    let profile = ProfessionalProfile::new(ProfileKind::Artisan, "Dupont Plomberie");
    upsert_profile(conn, &profile).unwrap();
    profile.id
}

pub fn seed_service(conn: &Connection, professional_id: Uuid, name: &str, duration_minutes: u32) -> ServiceOffering {
    let service = ServiceOffering {
        id: Uuid::new_v4(),
        professional_id,
        name: name.to_string(),
        description: None,
        duration_minutes,
        price_range: PriceRange {
            min: 80.0,
            max: 150.0,
            unit: PricingUnit::Flat,
        },
        price_ht: 100.0,
        price_ttc: 120.0,
        active: true,
    };
    insert_service(conn, &service).unwrap();
    service
}

/// Pending client booking, not persisted.
pub fn booking(professional_id: Uuid, date: NaiveDate, time: NaiveTime) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        professional_id,
        client_id: None,
        service_id: None,
        date,
        time,
        duration_minutes: DEFAULT_DURATION_MINUTES,
        address: "3 place Bellecour, Lyon".into(),
        notes: None,
        client: None,
        price_ht: 0.0,
        price_ttc: 0.0,
        status: BookingStatus::Pending,
        origin: BookingOrigin::ClientRequest,
        last_actor: Some(Actor::Client),
        created_at: Utc::now(),
        confirmed_at: None,
        cancelled_at: None,
        completed_at: None,
    }
}

/// Connection wrapper whose writes can be switched to fail, for checking
/// that components leave their memory untouched on persistence errors.
pub struct FailingStore {
    conn: Connection,
    fail: Cell<bool>,
}

pub fn failing_store(conn: Connection) -> FailingStore {
    FailingStore {
        conn,
        fail: Cell::new(false),
    }
}

impl FailingStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn write_guard(&self) -> Result<(), DatabaseError> {
        if self.fail.get() {
            Err(DatabaseError::Unavailable("write refused by test".into()))
        } else {
            Ok(())
        }
    }
}

impl AvailabilityRepository for FailingStore {
    fn load_availability(&self, professional_id: &Uuid) -> Result<Vec<AvailabilityRule>, DatabaseError> {
        self.conn.load_availability(professional_id)
    }

    fn save_availability_rule(&self, rule: &AvailabilityRule) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.save_availability_rule(rule)
    }

    fn load_absences(&self, professional_id: &Uuid) -> Result<Vec<AbsenceBlock>, DatabaseError> {
        self.conn.load_absences(professional_id)
    }

    fn insert_absence(&self, block: &AbsenceBlock) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.insert_absence(block)
    }

    fn delete_absence(&self, id: &Uuid) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.delete_absence(id)
    }
}

impl BookingRepository for FailingStore {
    fn load_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DatabaseError> {
        self.conn.load_bookings(filter)
    }

    fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, DatabaseError> {
        self.conn.get_booking(id)
    }

    fn insert_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.insert_booking(booking)
    }

    fn update_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.update_booking(booking)
    }
}

impl CatalogRepository for FailingStore {
    fn find_service(&self, id: &Uuid) -> Result<Option<ServiceOffering>, DatabaseError> {
        self.conn.find_service(id)
    }

    fn list_services(&self, professional_id: &Uuid) -> Result<Vec<ServiceOffering>, DatabaseError> {
        self.conn.list_services(professional_id)
    }
}

impl ProofRepository for FailingStore {
    fn find_proof(&self, booking_id: &Uuid) -> Result<Option<ProofOfWork>, DatabaseError> {
        self.conn.find_proof(booking_id)
    }
}

impl ProfileRepository for FailingStore {
    fn load_profile(&self, id: &Uuid) -> Result<Option<ProfessionalProfile>, DatabaseError> {
        self.conn.load_profile(id)
    }

    fn save_profile(&self, profile: &ProfessionalProfile) -> Result<(), DatabaseError> {
        self.write_guard()?;
        self.conn.save_profile(profile)
    }
}
