use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Calendar date in `YYYY-MM-DD` form; the identity of one day's report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportDate(NaiveDate);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDate;

impl fmt::Display for InvalidDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid date format. Expected YYYY-MM-DD")
    }
}

impl std::error::Error for InvalidDate {}

impl ReportDate {
    pub fn parse(value: &str) -> Result<Self, InvalidDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| InvalidDate)
    }

    #[must_use]
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    #[must_use]
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn as_naive(self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn year_component(self) -> String {
        format!("{:04}", self.0.year())
    }

    #[must_use]
    pub fn month_component(self) -> String {
        format!("{:02}", self.0.month())
    }

    #[must_use]
    pub fn iso(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for ReportDate {
    type Err = InvalidDate;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ReportDate {
    type Error = InvalidDate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReportDate> for String {
    fn from(value: ReportDate) -> Self {
        value.iso()
    }
}
