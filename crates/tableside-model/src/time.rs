use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// UTC timestamp with seconds precision and a literal `Z` suffix, the
/// format every archived entry stamps into `ReceivedAt`.
#[must_use]
pub fn utc_now_z() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Settled/closed order detection from the free-form status column.
#[must_use]
pub fn bool_from_status(status: &str) -> bool {
    matches!(
        status.trim().to_lowercase().as_str(),
        "paid" | "settled" | "closed" | "zapłacone" | "zamknięte"
    )
}

/// `order_items.served` is a one-character flag column.
#[must_use]
pub fn bool_from_served(flag: &str) -> bool {
    matches!(flag.trim().to_uppercase().as_str(), "Y" | "T" | "1")
}

/// Reservation dates arrive as ISO (`2026-01-14`) or day-first (`14.01.2026`).
#[must_use]
pub fn parse_reservation_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('-') {
        // Full datetimes are accepted too; only the date part matters.
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s.replace(' ', "T"), "%Y-%m-%dT%H:%M:%S") {
            return Some(dt.date());
        }
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }
    if s.contains('.') {
        return NaiveDate::parse_from_str(s, "%d.%m.%Y").ok();
    }
    None
}

/// Reservation times arrive as `HH:MM` or `HH:MM:SS`.
#[must_use]
pub fn parse_reservation_time(value: &str) -> Option<NaiveTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    let padded;
    let s = if s.len() == 5 {
        padded = format!("{s}:00");
        padded.as_str()
    } else {
        s
    };
    NaiveTime::parse_from_str(s, "%H:%M:%S").ok()
}
