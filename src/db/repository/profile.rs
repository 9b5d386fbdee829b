use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{enum_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

pub fn get_profile(conn: &Connection, id: &Uuid) -> Result<Option<ProfessionalProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, kind, display_name, auto_accept FROM professionals WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(ProfessionalProfile {
                    id: uuid_col(row, 0)?,
                    kind: enum_col(row, 1)?,
                    display_name: row.get(2)?,
                    auto_accept: row.get::<_, i32>(3)? != 0,
                })
            },
        )
        .optional()?;
    Ok(profile)
}

pub fn upsert_profile(conn: &Connection, profile: &ProfessionalProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO professionals (id, kind, display_name, auto_accept)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           kind = excluded.kind,
           display_name = excluded.display_name,
           auto_accept = excluded.auto_accept",
        params![
            profile.id.to_string(),
            profile.kind.as_str(),
            profile.display_name,
            profile.auto_accept as i32,
        ],
    )?;
    Ok(())
}
