use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

const SERVICE_COLUMNS: &str = "id, professional_id, name, description, duration_minutes,
    price_min, price_max, pricing_unit, price_ht, price_ttc, active";

fn service_from_row(row: &Row) -> rusqlite::Result<ServiceOffering> {
    Ok(ServiceOffering {
        id: uuid_col(row, 0)?,
        professional_id: uuid_col(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        duration_minutes: row.get(4)?,
        price_range: PriceRange {
            min: row.get(5)?,
            max: row.get(6)?,
            unit: enum_col(row, 7)?,
        },
        price_ht: row.get(8)?,
        price_ttc: row.get(9)?,
        active: row.get::<_, i32>(10)? != 0,
    })
}

pub fn get_service(conn: &Connection, id: &Uuid) -> Result<Option<ServiceOffering>, DatabaseError> {
    let service = conn
        .query_row(
            &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
            params![id.to_string()],
            service_from_row,
        )
        .optional()?;
    Ok(service)
}

pub fn get_services_for_professional(
    conn: &Connection,
    professional_id: &Uuid,
) -> Result<Vec<ServiceOffering>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE professional_id = ?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![professional_id.to_string()], service_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Catalog writes belong to the motif editor; exposed for embedding apps and tests.
pub fn insert_service(conn: &Connection, service: &ServiceOffering) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO services (id, professional_id, name, description, duration_minutes,
                               price_min, price_max, pricing_unit, price_ht, price_ttc, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            service.id.to_string(),
            service.professional_id.to_string(),
            service.name,
            service.description,
            service.duration_minutes,
            service.price_range.min,
            service.price_range.max,
            service.price_range.unit.as_str(),
            service.price_ht,
            service.price_ttc,
            service.active as i32,
        ],
    )?;
    Ok(())
}
