use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::*;

/// Look up an identity by external id within one role's table.
///
/// The table is chosen from a fixed pair of statements; the external id is
/// always a bound parameter.
pub fn find_identity(
    conn: &Connection,
    external_id: &str,
    role: Role,
) -> Result<Option<Identity>, DatabaseError> {
    let sql = match role {
        Role::Doctor => "SELECT id, user_id, full_name FROM doctors WHERE user_id = ?1",
        Role::Patient => "SELECT id, user_id, full_name FROM patients WHERE user_id = ?1",
    };

    let identity = conn
        .query_row(sql, params![external_id], |row| {
            Ok(Identity {
                internal_id: row.get(0)?,
                external_id: row.get(1)?,
                role,
                display_name: row.get(2)?,
            })
        })
        .optional()?;
    Ok(identity)
}

pub fn get_display_name(
    conn: &Connection,
    internal_id: i64,
    role: Role,
) -> Result<Option<String>, DatabaseError> {
    let sql = match role {
        Role::Doctor => "SELECT full_name FROM doctors WHERE id = ?1",
        Role::Patient => "SELECT full_name FROM patients WHERE id = ?1",
    };
    let name = conn
        .query_row(sql, params![internal_id], |row| row.get::<_, String>(0))
        .optional()?;
    Ok(name)
}

const DOCTOR_COLUMNS: &str =
    "id, user_id, full_name, email, specialization, experience_years, rating, bio";

pub fn list_doctors(conn: &Connection) -> Result<Vec<DoctorProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY rating DESC, full_name ASC"
    ))?;
    let rows = stmt.query_map([], doctor_from_row)?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(row?);
    }
    Ok(doctors)
}

pub fn get_doctor_by_user_id(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<DoctorProfile>, DatabaseError> {
    let doctor = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE user_id = ?1"),
            params![user_id],
            doctor_from_row,
        )
        .optional()?;
    Ok(doctor)
}

fn doctor_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DoctorProfile> {
    Ok(DoctorProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        specialization: row.get(4)?,
        experience_years: row.get(5)?,
        rating: row.get(6)?,
        bio: row.get(7)?,
    })
}
