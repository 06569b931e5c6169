use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use tableside_model::{DayReport, ReportDate, ReportPayload};

use crate::error::{ArchiveError, ArchiveErrorCode};
use crate::lock::{probe_lock_capability, DayLock, LockCapability};
use crate::paths::{date_from_file_name, lock_path_for, report_path_for, tmp_path_for};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Outcome of a merge: what the caller reports back over the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReceipt {
    pub date: String,
    pub entries_added: usize,
    pub total_entries: usize,
    pub file: String,
}

/// One archived day file as listed by `/raports/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFileInfo {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "SizeBytes")]
    pub size_bytes: u64,
}

/// Append-only archive of gzip JSON day reports under a root directory.
#[derive(Debug, Clone)]
pub struct ReportArchive {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl ReportArchive {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn lock_capability(&self) -> Result<LockCapability, ArchiveError> {
        probe_lock_capability(&self.root)
    }

    /// Appends entries to a date's report under the per-date lock.
    pub fn append(
        &self,
        date: ReportDate,
        new_entries: Vec<Value>,
    ) -> Result<MergeReceipt, ArchiveError> {
        let path = report_path_for(&self.root, date);
        let added = new_entries.len();

        let _guard = DayLock::acquire(&lock_path_for(&self.root, date))?;
        let mut report = self.load_day_unlocked(date, &path)?;
        report.extend(new_entries);
        self.write_atomic(date, &path, &report)?;

        Ok(MergeReceipt {
            date: date.iso(),
            entries_added: added,
            total_entries: report.len(),
            file: path.display().to_string(),
        })
    }

    /// Bulk append from a raw gzip JSON body.
    ///
    /// Size gates run before any decompression; entry extraction resolves the
    /// payload shape once (`Entries` array verbatim, otherwise the whole
    /// object as a single legacy entry).
    pub fn upload_compressed(&self, raw: &[u8]) -> Result<MergeReceipt, ArchiveError> {
        if raw.is_empty() {
            return Err(ArchiveError::new(ArchiveErrorCode::EmptyBody, "Empty body"));
        }
        if raw.len() > self.max_upload_bytes {
            return Err(ArchiveError::new(
                ArchiveErrorCode::BodyTooLarge,
                format!("Body too large. Limit={} bytes", self.max_upload_bytes),
            ));
        }

        let mut decoder = GzDecoder::new(raw);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).map_err(|_| {
            ArchiveError::new(ArchiveErrorCode::InvalidPayload, "Invalid gzip or JSON")
        })?;
        let decoded: Value = serde_json::from_slice(&decompressed).map_err(|_| {
            ArchiveError::new(ArchiveErrorCode::InvalidPayload, "Invalid gzip or JSON")
        })?;
        let Value::Object(object) = decoded else {
            return Err(ArchiveError::new(
                ArchiveErrorCode::InvalidPayload,
                "Decoded report must be a JSON object",
            ));
        };

        let date = match object.get("Date").and_then(Value::as_str) {
            Some(raw_date) if !raw_date.is_empty() => {
                ReportDate::parse(raw_date).map_err(|e| {
                    ArchiveError::new(ArchiveErrorCode::InvalidPayload, e.to_string())
                })?
            }
            _ => {
                return Err(ArchiveError::new(
                    ArchiveErrorCode::MissingDate,
                    "Missing Date in uploaded report",
                ))
            }
        };

        let entries = ReportPayload::from_object(object).into_entries();
        self.append(date, entries)
    }

    /// Lock-free read of a day's normalized report.
    pub fn read_day(&self, date: ReportDate) -> Result<DayReport, ArchiveError> {
        let path = report_path_for(&self.root, date);
        if !path.exists() {
            return Err(ArchiveError::new(
                ArchiveErrorCode::NotFound,
                "Report not found",
            ));
        }
        let value = read_gz_json(&path)?;
        Ok(DayReport::normalize(date, value))
    }

    /// Raw compressed bytes of a day file, for download endpoints.
    pub fn read_day_raw(&self, date: ReportDate) -> Result<(String, Vec<u8>), ArchiveError> {
        let path = report_path_for(&self.root, date);
        if !path.exists() {
            return Err(ArchiveError::new(
                ArchiveErrorCode::NotFound,
                "Report not found",
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.json.gz", date.iso()));
        let bytes = fs::read(&path).map_err(|e| ArchiveError::io(&e))?;
        Ok((name, bytes))
    }

    #[must_use]
    pub fn exists(&self, date: ReportDate) -> bool {
        report_path_for(&self.root, date).exists()
    }

    /// Lexicographic listing, optionally narrowed to a year or year/month.
    pub fn list(
        &self,
        year: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<ReportFileInfo>, ArchiveError> {
        let mut base = self.root.clone();
        if let Some(year) = year {
            base = base.join(format!("{year:0>4}"));
        }
        if let Some(month) = month {
            base = base.join(format!("{month:0>2}"));
        }
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_report_files(&base, &mut files)?;
        files.sort();

        let mut items = Vec::with_capacity(files.len());
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            let Some(date) = date_from_file_name(&name) else {
                continue;
            };
            let size_bytes = fs::metadata(&path).map_err(|e| ArchiveError::io(&e))?.len();
            items.push(ReportFileInfo {
                date: date.to_string(),
                path: path.display().to_string(),
                size_bytes,
            });
        }
        Ok(items)
    }

    /// Explicit purge of one day's file (peripheral order-purge flow only).
    pub fn remove_day(&self, date: ReportDate) -> Result<bool, ArchiveError> {
        let path = report_path_for(&self.root, date);
        let _guard = DayLock::acquire(&lock_path_for(&self.root, date))?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| ArchiveError::io(&e))?;
        Ok(true)
    }

    fn load_day_unlocked(&self, date: ReportDate, path: &Path) -> Result<DayReport, ArchiveError> {
        if !path.exists() {
            return Ok(DayReport::empty(date));
        }
        let value = read_gz_json(path)?;
        Ok(DayReport::normalize(date, value))
    }

    fn write_atomic(
        &self,
        date: ReportDate,
        path: &Path,
        report: &DayReport,
    ) -> Result<(), ArchiveError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(&e))?;
        }
        let tmp = tmp_path_for(&self.root, date);

        let json = serde_json::to_vec_pretty(report)
            .map_err(|e| ArchiveError::new(ArchiveErrorCode::Io, e.to_string()))?;
        let file = File::create(&tmp).map_err(|e| ArchiveError::io(&e))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&json).map_err(|e| ArchiveError::io(&e))?;
        let file = encoder.finish().map_err(|e| ArchiveError::io(&e))?;
        // Durability is best-effort: a failed fsync is logged, not fatal.
        if let Err(e) = file.sync_all() {
            warn!(path = %tmp.display(), error = %e, "report fsync failed");
        }
        drop(file);

        fs::rename(&tmp, path).map_err(|e| ArchiveError::io(&e))?;

        if let Some(parent) = path.parent() {
            match OpenOptions::new().read(true).open(parent) {
                Ok(dir) => {
                    if let Err(e) = dir.sync_all() {
                        warn!(path = %parent.display(), error = %e, "directory sync failed");
                    }
                }
                Err(e) => {
                    warn!(path = %parent.display(), error = %e, "directory open for sync failed");
                }
            }
        }
        Ok(())
    }
}

fn read_gz_json(path: &Path) -> Result<Value, ArchiveError> {
    let file = File::open(path).map_err(|e| ArchiveError::io(&e))?;
    let mut decoder = GzDecoder::new(file);
    let mut buf = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| ArchiveError::io(&e))?;
    serde_json::from_slice(&buf)
        .map_err(|e| ArchiveError::new(ArchiveErrorCode::Io, e.to_string()))
}

fn collect_report_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ArchiveError> {
    let entries = fs::read_dir(dir).map_err(|e| ArchiveError::io(&e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ArchiveError::io(&e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_report_files(&path, out)?;
        } else if path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(crate::paths::REPORT_SUFFIX))
        {
            out.push(path);
        }
    }
    Ok(())
}
