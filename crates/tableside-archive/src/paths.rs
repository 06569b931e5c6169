use std::path::{Path, PathBuf};

use tableside_model::ReportDate;

pub const REPORT_SUFFIX: &str = ".json.gz";
pub const LOCK_SUFFIX: &str = ".json.gz.lock";
pub const TMP_SUFFIX: &str = ".json.gz.tmp";

/// `<root>/<YYYY>/<MM>/<YYYY-MM-DD>.json.gz`
#[must_use]
pub fn report_path_for(root: &Path, date: ReportDate) -> PathBuf {
    root.join(date.year_component())
        .join(date.month_component())
        .join(format!("{}{REPORT_SUFFIX}", date.iso()))
}

/// Sibling lock file for a date's report.
#[must_use]
pub fn lock_path_for(root: &Path, date: ReportDate) -> PathBuf {
    root.join(date.year_component())
        .join(date.month_component())
        .join(format!("{}{LOCK_SUFFIX}", date.iso()))
}

#[must_use]
pub fn tmp_path_for(root: &Path, date: ReportDate) -> PathBuf {
    root.join(date.year_component())
        .join(date.month_component())
        .join(format!("{}{TMP_SUFFIX}", date.iso()))
}

/// Recovers the date component from a report file name.
#[must_use]
pub fn date_from_file_name(name: &str) -> Option<&str> {
    name.strip_suffix(REPORT_SUFFIX)
}
