use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::StaffMember;

use crate::error::{DbError, DbErrorCode};

/// Credential row joined with the owning staff member, for `/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRow {
    pub staff_id: i64,
    pub login: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StaffUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub login: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub new: usize,
    pub updated: usize,
    pub total: usize,
}

pub fn list_staff(conn: &Connection) -> Result<Vec<StaffMember>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.first_name, s.last_name, s.phone, c.login, c.password
         FROM staff s JOIN credentials c ON c.staff_id = s.id
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StaffMember {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            phone: row.get(3)?,
            email: None,
            login: row.get(4)?,
            password_hash: row.get(5)?,
            is_active: true,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

pub fn find_credentials(conn: &Connection, login: &str) -> Result<Option<CredentialRow>, DbError> {
    conn.query_row(
        "SELECT c.staff_id, c.login, c.password, s.first_name, s.last_name
         FROM credentials c LEFT JOIN staff s ON s.id = c.staff_id
         WHERE c.login = ?1",
        params![login],
        |row| {
            Ok(CredentialRow {
                staff_id: row.get(0)?,
                login: row.get(1)?,
                password: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(DbError::from)
}

pub fn create_staff(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
    phone: &str,
    login: &str,
    password_hash: &str,
) -> Result<i64, DbError> {
    let next_number: i64 = conn.query_row(
        "SELECT COALESCE(MAX(staff_number), 0) + 1 FROM staff",
        [],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO staff (staff_number, first_name, last_name, phone) VALUES (?1, ?2, ?3, ?4)",
        params![next_number, first_name, last_name, phone],
    )?;
    let staff_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO credentials (staff_id, login, password) VALUES (?1, ?2, ?3)",
        params![staff_id, login, password_hash],
    )?;
    Ok(staff_id)
}

pub fn update_staff(conn: &Connection, staff_id: i64, update: &StaffUpdate) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM staff WHERE id = ?1", params![staff_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Staff not found"));
    }

    if let Some(first_name) = &update.first_name {
        conn.execute(
            "UPDATE staff SET first_name = ?2 WHERE id = ?1",
            params![staff_id, first_name],
        )?;
    }
    if let Some(last_name) = &update.last_name {
        conn.execute(
            "UPDATE staff SET last_name = ?2 WHERE id = ?1",
            params![staff_id, last_name],
        )?;
    }
    if let Some(phone) = &update.phone {
        conn.execute(
            "UPDATE staff SET phone = ?2 WHERE id = ?1",
            params![staff_id, phone],
        )?;
    }
    if let Some(login) = &update.login {
        conn.execute(
            "UPDATE credentials SET login = ?2 WHERE staff_id = ?1",
            params![staff_id, login],
        )?;
    }
    if let Some(password_hash) = &update.password_hash {
        conn.execute(
            "UPDATE credentials SET password = ?2 WHERE staff_id = ?1",
            params![staff_id, password_hash],
        )?;
    }
    Ok(())
}

/// Deleting staff with existing orders is a conflict; the waiter row and
/// credentials go first, then the staff row.
pub fn delete_staff(conn: &Connection, staff_id: i64) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM staff WHERE id = ?1", params![staff_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Staff not found"));
    }

    let waiter_id: Option<i64> = conn
        .query_row(
            "SELECT id FROM waiters WHERE staff_id = ?1",
            params![staff_id],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(waiter_id) = waiter_id {
        let has_orders: bool = conn
            .query_row(
                "SELECT 1 FROM orders WHERE waiter_id = ?1 LIMIT 1",
                params![waiter_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if has_orders {
            return Err(DbError::new(
                DbErrorCode::Conflict,
                "Cannot delete staff with existing orders",
            )
            .with_detail_code("HAS_ORDERS"));
        }
        conn.execute("DELETE FROM waiter_zones WHERE waiter_id = ?1", params![waiter_id])?;
        conn.execute("DELETE FROM waiters WHERE id = ?1", params![waiter_id])?;
    }

    conn.execute("DELETE FROM credentials WHERE staff_id = ?1", params![staff_id])?;
    conn.execute("DELETE FROM staff WHERE id = ?1", params![staff_id])?;
    Ok(())
}

/// Upsert-by-id sync from the desktop client's staff export.
pub fn sync_staff(conn: &Connection, items: &[StaffMember]) -> Result<SyncStats, DbError> {
    let mut stats = SyncStats {
        new: 0,
        updated: 0,
        total: 0,
    };
    for item in items {
        if item.id <= 0 {
            continue;
        }
        stats.total += 1;

        let exists: bool = conn
            .query_row("SELECT 1 FROM staff WHERE id = ?1", params![item.id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if exists {
            conn.execute(
                "UPDATE staff SET first_name = ?2, last_name = ?3, phone = ?4 WHERE id = ?1",
                params![item.id, item.first_name, item.last_name, item.phone],
            )?;
            stats.updated += 1;
        } else {
            conn.execute(
                "INSERT INTO staff (id, staff_number, first_name, last_name, phone)
                 VALUES (?1, ?1, ?2, ?3, ?4)",
                params![item.id, item.first_name, item.last_name, item.phone],
            )?;
            stats.new += 1;
        }

        let has_credentials: bool = conn
            .query_row(
                "SELECT 1 FROM credentials WHERE staff_id = ?1",
                params![item.id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if has_credentials {
            conn.execute(
                "UPDATE credentials SET login = ?2, password = ?3 WHERE staff_id = ?1",
                params![item.id, item.login, item.password_hash],
            )?;
        } else {
            conn.execute(
                "INSERT INTO credentials (staff_id, login, password) VALUES (?1, ?2, ?3)",
                params![item.id, item.login, item.password_hash],
            )?;
        }
    }
    Ok(stats)
}

pub fn change_password(
    conn: &Connection,
    staff_id: i64,
    old_hash: &str,
    new_hash: &str,
) -> Result<(), DbError> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT password FROM credentials WHERE staff_id = ?1",
            params![staff_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(stored) = stored else {
        return Err(DbError::not_found("User not found"));
    };
    if stored != old_hash {
        return Err(DbError::new(DbErrorCode::Forbidden, "Invalid old password"));
    }
    conn.execute(
        "UPDATE credentials SET password = ?2 WHERE staff_id = ?1",
        params![staff_id, new_hash],
    )?;
    Ok(())
}
