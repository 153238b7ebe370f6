use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};

use crate::error::{PrepError, Result};
use crate::ingest::IngestOptions;
use crate::rules::Limits;

pub const RAW_DATA_PATH: &str = "data/raw/cardio_train.csv";
pub const PROCESSED_DATA_PATH: &str = "data/processed/cardio_clean.csv";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Validate, clean and enrich the cardio dataset", long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = RAW_DATA_PATH, help = "Raw input CSV")]
    pub input: PathBuf,
    #[arg(short, long, default_value = PROCESSED_DATA_PATH, help = "Cleaned output (.csv or .parquet)")]
    pub output: PathBuf,
    #[arg(short, long, default_value = ";", value_parser = parse_delimiter, help = "Input field delimiter")]
    pub delimiter: u8,
    #[arg(short, long, help = "JSON file overriding the validation limits")]
    pub limits: Option<PathBuf>,
    #[arg(long, help = "Drop exact duplicate rows before validation")]
    pub drop_duplicates: bool,
    #[arg(short, long, help = "Print a JSON report to stdout")]
    pub report: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Verbose level")]
    pub verbose: u8,
}

fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("delimiter must be a single ASCII character, got {:?}", value)),
    }
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter,
            drop_duplicates: self.drop_duplicates,
        }
    }

    /// Limits from `--limits`, or the defaults when no file is given.
    pub fn load_limits(&self) -> Result<Limits> {
        match &self.limits {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
                let limits = Limits::from_json(&text)?;
                debug!("limits from {}: {:?}", path.display(), limits);
                Ok(limits)
            }
            None => Ok(Limits::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Bounds;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["cardio-prep"]);
        assert_eq!(args.input, PathBuf::from(RAW_DATA_PATH));
        assert_eq!(args.output, PathBuf::from(PROCESSED_DATA_PATH));
        assert_eq!(args.delimiter, b';');
        assert!(!args.drop_duplicates);
        assert_eq!(args.log_level(), LevelFilter::Info);
        assert_eq!(args.load_limits().unwrap(), Limits::default());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "cardio-prep",
            "-i",
            "in.csv",
            "-o",
            "out.parquet",
            "-d",
            ",",
            "--drop-duplicates",
            "-r",
            "-vv",
        ]);
        assert_eq!(args.delimiter, b',');
        assert!(args.ingest_options().drop_duplicates);
        assert!(args.report);
        assert_eq!(args.log_level(), LevelFilter::Trace);
    }

    #[test]
    fn test_bad_delimiter() {
        assert!(Args::try_parse_from(["cardio-prep", "-d", ";;"]).is_err());
    }

    #[test]
    fn test_limits_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limits.json");
        fs::write(&path, r#"{"systolic_bp": {"min": 70, "max": 250}}"#).unwrap();

        let args = Args::parse_from(["cardio-prep", "--limits", path.to_str().unwrap()]);
        let limits = args.load_limits().unwrap();
        assert_eq!(limits.systolic_bp, Bounds::new(70.0, 250.0));
        assert_eq!(limits.height_cm, Limits::default().height_cm);

        let missing = Args::parse_from(["cardio-prep", "--limits", "nope.json"]);
        assert!(matches!(missing.load_limits(), Err(PrepError::Io { .. })));
    }
}
