use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::date::ReportDate;
use crate::time::utc_now_z;

/// One archived report submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "ReceivedAt")]
    pub received_at: String,
    #[serde(rename = "Date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(rename = "Payload", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ReportEntry {
    #[must_use]
    pub fn received_now(date: ReportDate, source: Option<Value>, payload: Option<Value>) -> Self {
        Self {
            received_at: utc_now_z(),
            date: Some(date.iso()),
            source,
            payload,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Full day's accumulated entries, one file per calendar date.
///
/// Entries are kept as raw JSON values: the store appends, it never
/// reinterprets what earlier writers put there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Entries")]
    pub entries: Vec<Value>,
}

impl DayReport {
    #[must_use]
    pub fn empty(date: ReportDate) -> Self {
        Self {
            date: date.iso(),
            entries: Vec::new(),
        }
    }

    /// Coerces an arbitrary decoded value into the `{Date, Entries}` shape.
    ///
    /// `Date` is forced to the target date and `Entries` defaults to an empty
    /// array when absent or malformed; any other fields are dropped.
    #[must_use]
    pub fn normalize(date: ReportDate, value: Value) -> Self {
        let entries = match value {
            Value::Object(mut map) => match map.remove("Entries") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Self {
            date: date.iso(),
            entries,
        }
    }

    pub fn extend(&mut self, new_entries: Vec<Value>) {
        self.entries.extend(new_entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shape of an uploaded report body, resolved once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    /// The object carried an `Entries` array; its items are used verbatim.
    Structured(Vec<Value>),
    /// No `Entries` array: the whole object counts as a single entry.
    Legacy {
        source: Option<Value>,
        payload: Value,
    },
}

impl ReportPayload {
    #[must_use]
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        match object.remove("Entries") {
            Some(Value::Array(items)) => Self::Structured(items),
            _ => {
                let source = object.get("Source").cloned();
                let payload = object
                    .get("Payload")
                    .cloned()
                    .unwrap_or(Value::Object(object));
                Self::Legacy { source, payload }
            }
        }
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Structured(items) => items,
            Self::Legacy { source, payload } => {
                let entry = ReportEntry {
                    received_at: utc_now_z(),
                    date: None,
                    source,
                    payload: Some(payload),
                };
                vec![entry.into_value()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> ReportDate {
        ReportDate::parse("2025-06-01").expect("date")
    }

    #[test]
    fn normalize_defaults_missing_entries() {
        let report = DayReport::normalize(date(), json!({"Date": "2025-06-01"}));
        assert_eq!(report.date, "2025-06-01");
        assert!(report.entries.is_empty());
    }

    #[test]
    fn normalize_repairs_malformed_entries_and_date() {
        let report = DayReport::normalize(date(), json!({"Date": "bogus", "Entries": 42}));
        assert_eq!(report.date, "2025-06-01");
        assert!(report.entries.is_empty());

        let report = DayReport::normalize(date(), json!("not an object"));
        assert!(report.entries.is_empty());
    }

    #[test]
    fn normalize_keeps_existing_entries_in_order() {
        let report = DayReport::normalize(
            date(),
            json!({"Entries": [{"n": 1}, {"n": 2}], "Extra": true}),
        );
        assert_eq!(report.entries, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn structured_payload_uses_entries_verbatim() {
        let object = json!({"Date": "2025-06-01", "Entries": [{"a": 1}]});
        let Value::Object(map) = object else {
            unreachable!()
        };
        let payload = ReportPayload::from_object(map);
        assert_eq!(payload.into_entries(), vec![json!({"a": 1})]);
    }

    #[test]
    fn legacy_payload_wraps_whole_object() {
        let object = json!({"Date": "2025-06-01", "Source": "POS", "Payload": {"x": 1}});
        let Value::Object(map) = object else {
            unreachable!()
        };
        let entries = ReportPayload::from_object(map).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["Source"], json!("POS"));
        assert_eq!(entries[0]["Payload"], json!({"x": 1}));
        assert!(entries[0]["ReceivedAt"].is_string());
    }

    #[test]
    fn legacy_payload_without_typed_fields_keeps_raw_object() {
        let object = json!({"Date": "2025-06-01", "totals": [1, 2, 3]});
        let Value::Object(map) = object else {
            unreachable!()
        };
        let entries = ReportPayload::from_object(map).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["Payload"]["totals"], json!([1, 2, 3]));
    }
}
