//! CSV observation ingest and validation.
//!
//! Turns a `date,new_cases,total_cases` CSV into an ordered, gap-free
//! observation series the estimator can trust.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 3)
//! - **Structural validation**: dates must advance one day at a time; the
//!   estimator assumes one entry per calendar day with no gaps
//! - **Row-level anomaly notes** for non-fatal inconsistencies (e.g. totals
//!   that disagree with the running new-case sum)
//! - **Separation of concerns**: no estimation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Observation, RunSpec};
use crate::error::AppError;

/// A non-fatal anomaly noted during ingest.
#[derive(Debug, Clone)]
pub struct RowNote {
    pub line: usize,
    pub message: String,
}

/// Summary stats about the ingested series.
#[derive(Debug, Clone, Copy)]
pub struct DatasetStats {
    pub n_days: usize,
    pub max_new_cases: u64,
    pub final_total_cases: u64,
}

/// Ingest output: ordered observations + resolved spec + stats + notes.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub spec: RunSpec,
    pub stats: DatasetStats,
    pub notes: Vec<RowNote>,
}

/// Load observations from a CSV file path.
pub fn load_observations_path(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(3, format!("Failed to open CSV '{}': {e}", path.display())))?;
    load_observations(file)
}

/// Load observations from any reader (used directly by tests).
pub fn load_observations(reader: impl Read) -> Result<IngestedData, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::new(3, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_col = require_column(&header_map, "date")?;
    let new_col = require_column(&header_map, "new_cases")?;
    let total_col = require_column(&header_map, "total_cases")?;

    let mut observations: Vec<Observation> = Vec::new();
    let mut notes = Vec::new();
    let mut running_total: u64 = 0;

    for (idx, record) in csv_reader.records().enumerate() {
        // Header is line 1; first record is line 2.
        let line = idx + 2;
        let record =
            record.map_err(|e| AppError::new(3, format!("CSV parse error on line {line}: {e}")))?;

        let date = parse_date(&record, date_col, line)?;
        let new_cases = parse_count(&record, new_col, "new_cases", line)?;
        let total_cases = parse_count(&record, total_col, "total_cases", line)?;

        if let Some(prev) = observations.last() {
            let expected = prev.date + chrono::Duration::days(1);
            if date != expected {
                return Err(AppError::new(
                    3,
                    format!(
                        "line {line}: expected {expected} (one entry per day, no gaps), got {date}"
                    ),
                ));
            }
            if total_cases < prev.total_cases {
                return Err(AppError::new(
                    3,
                    format!("line {line}: total_cases decreased ({} -> {total_cases})", prev.total_cases),
                ));
            }
        }

        running_total += new_cases;
        if total_cases != running_total {
            notes.push(RowNote {
                line,
                message: format!(
                    "total_cases {total_cases} disagrees with running new-case sum {running_total}"
                ),
            });
            // Trust the reported total from here on.
            running_total = total_cases;
        }

        observations.push(Observation {
            date,
            new_cases,
            total_cases,
        });
    }

    if observations.is_empty() {
        return Err(AppError::new(3, "CSV contains no observation rows."));
    }

    let stats = DatasetStats {
        n_days: observations.len(),
        max_new_cases: observations.iter().map(|o| o.new_cases).max().unwrap_or(0),
        final_total_cases: observations.last().map(|o| o.total_cases).unwrap_or(0),
    };
    let spec = RunSpec {
        start_date: observations[0].date,
        n_days: observations.len(),
    };

    Ok(IngestedData {
        observations,
        spec,
        stats,
        notes,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::new(3, format!("CSV is missing required column '{name}'.")))
}

fn parse_date(record: &StringRecord, col: usize, line: usize) -> Result<NaiveDate, AppError> {
    let raw = record
        .get(col)
        .ok_or_else(|| AppError::new(3, format!("line {line}: missing date field")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::new(3, format!("line {line}: invalid date '{raw}': {e}")))
}

fn parse_count(
    record: &StringRecord,
    col: usize,
    name: &str,
    line: usize,
) -> Result<u64, AppError> {
    let raw = record
        .get(col)
        .ok_or_else(|| AppError::new(3, format!("line {line}: missing {name} field")))?;
    raw.parse::<u64>()
        .map_err(|_| AppError::new(3, format!("line {line}: invalid {name} '{raw}' (non-negative integer expected)")))
}
