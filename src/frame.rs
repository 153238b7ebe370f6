use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::info;
use polars::frame::DataFrame;
use polars::prelude::*;
use polars_io::parquet::ParquetWriter;

use crate::error::{PrepError, Result};
use crate::records::EnrichedRecord;

/// Column names of the enriched table, in output order.
pub const ENRICHED_COLUMNS: [&str; 18] = [
    "id",
    "age_days",
    "gender",
    "height_cm",
    "weight_kg",
    "systolic_bp",
    "diastolic_bp",
    "cholesterol_level",
    "glucose_level",
    "smokes",
    "drinks_alcohol",
    "physically_active",
    "has_cardio_disease",
    "age_years",
    "bmi",
    "pulse_pressure",
    "hypertension",
    "obesity",
];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WriteFormat {
    Csv,
    Parquet,
}

impl WriteFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(WriteFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Ok(WriteFormat::Parquet),
            _ => Err(PrepError::OutputFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn column<T, F>(records: &[EnrichedRecord], get: F) -> Vec<T>
where
    F: Fn(&EnrichedRecord) -> T,
{
    records.iter().map(get).collect()
}

/// Build the gold table from enriched records.
///
/// Series are built in `ENRICHED_COLUMNS` order and take their names from it.
pub fn to_frame(records: &[EnrichedRecord]) -> PolarsResult<DataFrame> {
    let mut columns: [Series; ENRICHED_COLUMNS.len()] = [
        Series::new("", column(records, |r| r.base.id)),
        Series::new("", column(records, |r| r.base.age_days)),
        Series::new("", column(records, |r| u8::from(r.base.gender) as i32)),
        Series::new("", column(records, |r| r.base.height_cm)),
        Series::new("", column(records, |r| r.base.weight_kg)),
        Series::new("", column(records, |r| r.base.systolic_bp)),
        Series::new("", column(records, |r| r.base.diastolic_bp)),
        Series::new("", column(records, |r| u8::from(r.base.cholesterol_level) as i32)),
        Series::new("", column(records, |r| u8::from(r.base.glucose_level) as i32)),
        Series::new("", column(records, |r| r.base.smokes)),
        Series::new("", column(records, |r| r.base.drinks_alcohol)),
        Series::new("", column(records, |r| r.base.physically_active)),
        Series::new("", column(records, |r| r.base.has_cardio_disease)),
        Series::new("", column(records, |r| r.age_years)),
        Series::new("", column(records, |r| r.bmi)),
        Series::new("", column(records, |r| r.pulse_pressure)),
        Series::new("", column(records, |r| r.hypertension)),
        Series::new("", column(records, |r| r.obesity)),
    ];
    for (series, name) in columns.iter_mut().zip(ENRICHED_COLUMNS) {
        series.rename(name);
    }
    DataFrame::new(Vec::from(columns))
}

pub fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).map_err(|e| PrepError::io(path, e))?;

    CsvWriter::new(&mut file).finish(df)?;

    Ok(())
}

pub fn write_parquet(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).map_err(|e| PrepError::io(path, e))?;

    ParquetWriter::new(&mut file).finish(df)?;

    Ok(())
}

/// Write `df` to `path`, creating parent directories as needed.
pub fn write_frame(path: &Path, df: &mut DataFrame) -> Result<()> {
    let format = WriteFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
    }

    match format {
        WriteFormat::Csv => write_csv(path, df)?,
        WriteFormat::Parquet => write_parquet(path, df)?,
    }
    info!("wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Write on the blocking pool, handing the frame back afterwards.
pub async fn save(path: PathBuf, mut df: DataFrame) -> Result<DataFrame> {
    tokio::task::spawn_blocking(move || {
        write_frame(&path, &mut df)?;
        Ok(df)
    })
    .await?
}
