use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{datetime_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

pub fn get_proof(conn: &Connection, booking_id: &Uuid) -> Result<Option<ProofOfWork>, DatabaseError> {
    let proof = conn
        .query_row(
            "SELECT booking_id, before_photos, after_photos, has_signature, latitude, longitude, recorded_at
             FROM proofs WHERE booking_id = ?1",
            params![booking_id.to_string()],
            |row| {
                Ok(ProofOfWork {
                    booking_id: uuid_col(row, 0)?,
                    before_photos: row.get(1)?,
                    after_photos: row.get(2)?,
                    has_signature: row.get::<_, i32>(3)? != 0,
                    latitude: row.get(4)?,
                    longitude: row.get(5)?,
                    recorded_at: datetime_col(row, 6)?,
                })
            },
        )
        .optional()?;
    Ok(proof)
}

/// Written by the field-evidence collaborator; exposed for embedding apps and tests.
pub fn insert_proof(conn: &Connection, proof: &ProofOfWork) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO proofs (booking_id, before_photos, after_photos, has_signature,
                                        latitude, longitude, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            proof.booking_id.to_string(),
            proof.before_photos,
            proof.after_photos,
            proof.has_signature as i32,
            proof.latitude,
            proof.longitude,
            proof.recorded_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}
