//! Validation, cleaning and feature derivation for the cardiovascular disease
//! dataset (`cardio_train.csv`).
//!
//! The core is [`validate_and_enrich`]: each row is checked against the
//! validity [`rules`] independently, valid rows gain derived [`features`],
//! and invalid rows come back as [`RejectionEntry`] values naming every rule
//! they broke. The remaining modules read the raw CSV, build the gold table,
//! summarize it and write it out.

pub mod app;
pub mod config;
pub mod error;
pub mod features;
pub mod frame;
pub mod ingest;
pub mod pipeline;
pub mod records;
pub mod rules;
pub mod stats;

pub use error::{PrepError, Result};
pub use pipeline::{validate_and_enrich, Outcome, Pipeline, RejectionEntry};
pub use records::{EnrichedRecord, Gender, Level, PatientRecord};
pub use rules::{validate, Limits, Rule, RuleViolation, ValidRecord, Validator};
