use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::{ReservationSettings, Setting};

use crate::DbError;

pub const KEY_REQUIRE_APPROVAL: &str = "Zatwierdzanie_Rezerwacji";
pub const KEY_RESERVATION_INTERVAL: &str = "Odstep_miedzy_rezerwacjami";
pub const KEY_OPEN_FROM: &str = "godziny_otwarcia_od";
pub const KEY_CLOSE_TO: &str = "godziny_zamkniecia_od";

pub fn list_settings(conn: &Connection) -> Result<Vec<Setting>, DbError> {
    let mut stmt =
        conn.prepare("SELECT id, name, value, kind, description FROM settings ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Setting {
            id: row.get(0)?,
            name: row.get(1)?,
            value: row.get(2)?,
            kind: row.get(3)?,
            description: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

pub fn get_value(conn: &Connection, name: &str) -> Result<Option<String>, DbError> {
    conn.query_row(
        "SELECT value FROM settings WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .map_err(DbError::from)
}

pub fn set_value(
    conn: &Connection,
    name: &str,
    value: &str,
    kind: Option<&str>,
    description: Option<&str>,
) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM settings WHERE name = ?1", params![name], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if exists {
        conn.execute(
            "UPDATE settings SET value = ?2,
                 kind = COALESCE(?3, kind),
                 description = COALESCE(?4, description)
             WHERE name = ?1",
            params![name, value, kind, description],
        )?;
    } else {
        conn.execute(
            "INSERT INTO settings (name, value, kind, description) VALUES (?1, ?2, ?3, ?4)",
            params![name, value, kind, description],
        )?;
    }
    Ok(())
}

fn to_bool(value: Option<String>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "tak"
        )
    })
}

fn to_int(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

pub fn reservation_settings(conn: &Connection) -> Result<ReservationSettings, DbError> {
    Ok(ReservationSettings {
        require_approval: to_bool(get_value(conn, KEY_REQUIRE_APPROVAL)?),
        reservation_interval_minutes: to_int(get_value(conn, KEY_RESERVATION_INTERVAL)?, 0),
        open_from: get_value(conn, KEY_OPEN_FROM)?.unwrap_or_default(),
        close_to: get_value(conn, KEY_CLOSE_TO)?.unwrap_or_default(),
    })
}

pub struct ReservationSettingsUpdate {
    pub require_approval: Option<bool>,
    pub reservation_interval_minutes: Option<i64>,
    pub open_from: Option<String>,
    pub close_to: Option<String>,
}

pub fn update_reservation_settings(
    conn: &Connection,
    update: &ReservationSettingsUpdate,
) -> Result<(), DbError> {
    if let Some(require) = update.require_approval {
        set_value(
            conn,
            KEY_REQUIRE_APPROVAL,
            if require { "1" } else { "0" },
            Some("bool"),
            Some("0 - nie potrzeba, 1 - potrzeba"),
        )?;
    }
    if let Some(minutes) = update.reservation_interval_minutes {
        set_value(
            conn,
            KEY_RESERVATION_INTERVAL,
            &minutes.to_string(),
            Some("int"),
            Some("Odstęp między rezerwacjami w minutach"),
        )?;
    }
    if let Some(open_from) = &update.open_from {
        set_value(
            conn,
            KEY_OPEN_FROM,
            open_from.trim(),
            Some("time"),
            Some("Godzina otwarcia (HH:MM)"),
        )?;
    }
    if let Some(close_to) = &update.close_to {
        set_value(
            conn,
            KEY_CLOSE_TO,
            close_to.trim(),
            Some("time"),
            Some("Godzina zamknięcia (HH:MM)"),
        )?;
    }
    Ok(())
}
