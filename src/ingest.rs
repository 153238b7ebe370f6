//! Reading the raw cardio CSV into [`PatientRecord`]s.
//!
//! Measurement cells are read leniently so that a bad value becomes a
//! validation failure on that row rather than a fatal parse error.
//! Categorical cells are schema-bound: a row with an unknown code, a flag
//! other than 0/1 or the wrong number of fields is skipped and listed in
//! [`Dataset::skipped`]. Only I/O failures and an unreadable header abort.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PrepError, Result};
use crate::records::{Gender, Level, PatientRecord};

/// Column layout of `cardio_train.csv`.
#[derive(Debug, Deserialize)]
struct RawRow {
    id: i64,
    #[serde(deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    gender: Gender,
    #[serde(deserialize_with = "csv::invalid_option")]
    height: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    weight: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    ap_hi: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    ap_lo: Option<f64>,
    cholesterol: Level,
    gluc: Level,
    #[serde(deserialize_with = "flag")]
    smoke: bool,
    #[serde(deserialize_with = "flag")]
    alco: bool,
    #[serde(deserialize_with = "flag")]
    active: bool,
    #[serde(deserialize_with = "flag")]
    cardio: bool,
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match u8::deserialize(deserializer)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(D::Error::invalid_value(
            Unexpected::Unsigned(other as u64),
            &"0 or 1",
        )),
    }
}

/// Missing, non-finite and fractional values map to 0, which no rule accepts.
fn whole(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
        _ => 0,
    }
}

impl From<RawRow> for PatientRecord {
    fn from(raw: RawRow) -> Self {
        PatientRecord {
            id: raw.id,
            age_days: whole(raw.age),
            gender: raw.gender,
            height_cm: raw.height.unwrap_or(f64::NAN),
            weight_kg: raw.weight.unwrap_or(f64::NAN),
            systolic_bp: whole(raw.ap_hi),
            diastolic_bp: whole(raw.ap_lo),
            cholesterol_level: raw.cholesterol,
            glucose_level: raw.gluc,
            smokes: raw.smoke,
            drinks_alcohol: raw.alco,
            physically_active: raw.active,
            has_cardio_disease: raw.cardio,
        }
    }
}

/// Shape and quality of the raw table, measured before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub rows: usize,
    pub columns: usize,
    pub duplicates: usize,
    pub unreadable: usize,
    pub max_missing_ratio: f64,
}

/// A data row that could not be bound to a [`PatientRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row_index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub delimiter: u8,
    pub drop_duplicates: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            delimiter: b';',
            drop_duplicates: false,
        }
    }
}

/// Parsed rows plus, for each one, its 0-based data row position in the file.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PatientRecord>,
    pub positions: Vec<usize>,
    pub skipped: Vec<SkippedRow>,
    pub audit: AuditSummary,
}

impl Dataset {
    /// File row of the record at `index`.
    pub fn source_row(&self, index: usize) -> usize {
        self.positions.get(index).copied().unwrap_or(index)
    }
}

pub fn read_from<R: Read>(reader: R, options: &IngestOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut audit = AuditSummary {
        columns: headers.len(),
        ..AuditSummary::default()
    };
    let mut missing = vec![0usize; headers.len()];
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut dataset = Dataset::default();

    for result in reader.records() {
        let position = audit.rows;
        audit.rows += 1;

        let row = match result {
            Ok(row) => row,
            Err(err) if !err.is_io_error() => {
                warn!("skipping data row {}: {}", position, err);
                dataset.skipped.push(SkippedRow {
                    row_index: position,
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        for (column, field) in row.iter().enumerate() {
            if field.is_empty() {
                if let Some(count) = missing.get_mut(column) {
                    *count += 1;
                }
            }
        }

        let key: Vec<String> = row.iter().map(str::to_owned).collect();
        if !seen.insert(key) {
            audit.duplicates += 1;
            if options.drop_duplicates {
                debug!("dropping duplicate data row {}", position);
                continue;
            }
        }

        match row.deserialize::<RawRow>(Some(&headers)) {
            Ok(raw) => {
                dataset.records.push(PatientRecord::from(raw));
                dataset.positions.push(position);
            }
            Err(err) => {
                warn!("skipping data row {}: {}", position, err);
                dataset.skipped.push(SkippedRow {
                    row_index: position,
                    reason: err.to_string(),
                });
            }
        }
    }

    if audit.rows > 0 {
        audit.max_missing_ratio = missing
            .iter()
            .map(|&count| count as f64 / audit.rows as f64)
            .fold(0.0, f64::max);
    }
    if audit.duplicates > 0 && !options.drop_duplicates {
        warn!("{} exact duplicate rows kept", audit.duplicates);
    }
    audit.unreadable = dataset.skipped.len();
    dataset.audit = audit;

    Ok(dataset)
}

pub fn read_records<P: AsRef<Path>>(path: P, options: &IngestOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PrepError::io(path, e))?;
    let dataset = read_from(file, options)?;
    info!(
        "read {} rows x {} columns from {}",
        dataset.audit.rows,
        dataset.audit.columns,
        path.display()
    );
    Ok(dataset)
}

/// Read the raw CSV on the blocking pool.
pub async fn load(path: PathBuf, options: IngestOptions) -> Result<Dataset> {
    tokio::task::spawn_blocking(move || read_records(&path, &options)).await?
}
