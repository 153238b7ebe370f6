//! Row-level validity rules.
//!
//! Every rule is evaluated for every row, so a single record can carry several
//! violations. Bounds are open intervals: a value equal to either end is
//! rejected.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{PrepError, Result};
use crate::records::PatientRecord;

/// Open interval `(min, max)` of accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Bounds { min, max }
    }

    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }

    fn check(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PrepError::Limits {
                reason: format!("{} bounds must be finite", name),
            });
        }
        if self.min < 0.0 || self.min >= self.max {
            return Err(PrepError::Limits {
                reason: format!(
                    "{} bounds must satisfy 0 <= min < max, got ({}, {})",
                    name, self.min, self.max
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

/// Numeric limits applied by the [`Validator`].
///
/// Deserializes from partial JSON: absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub height_cm: Bounds,
    pub weight_kg: Bounds,
    pub diastolic_bp: Bounds,
    pub systolic_bp: Bounds,
    pub min_age_days: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            height_cm: Bounds::new(0.0, 250.0),
            weight_kg: Bounds::new(0.0, 250.0),
            diastolic_bp: Bounds::new(0.0, 300.0),
            systolic_bp: Bounds::new(0.0, 300.0),
            min_age_days: 0,
        }
    }
}

impl Limits {
    /// Parse limits from JSON and check that every interval is usable.
    pub fn from_json(text: &str) -> Result<Self> {
        let limits: Limits = serde_json::from_str(text)?;
        limits.check()?;
        Ok(limits)
    }

    pub fn check(&self) -> Result<()> {
        self.height_cm.check("height_cm")?;
        self.weight_kg.check("weight_kg")?;
        self.diastolic_bp.check("diastolic_bp")?;
        self.systolic_bp.check("systolic_bp")?;
        if self.min_age_days < 0 {
            return Err(PrepError::Limits {
                reason: format!("min_age_days must be >= 0, got {}", self.min_age_days),
            });
        }
        Ok(())
    }
}

/// The validity rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    HeightCm,
    WeightKg,
    DiastolicBp,
    SystolicBp,
    SystolicGtDiastolic,
    AgeDays,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::HeightCm,
        Rule::WeightKg,
        Rule::DiastolicBp,
        Rule::SystolicBp,
        Rule::SystolicGtDiastolic,
        Rule::AgeDays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::HeightCm => "height_cm",
            Rule::WeightKg => "weight_kg",
            Rule::DiastolicBp => "diastolic_bp",
            Rule::SystolicBp => "systolic_bp",
            Rule::SystolicGtDiastolic => "systolic_gt_diastolic",
            Rule::AgeDays => "age_days",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed rule on one record.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{rule}: {detail}")]
pub struct RuleViolation {
    pub rule: Rule,
    pub detail: String,
}

impl RuleViolation {
    fn new(rule: Rule, detail: String) -> Self {
        RuleViolation { rule, detail }
    }

    pub fn name(&self) -> &'static str {
        self.rule.name()
    }
}

/// A record that passed every rule. Only the [`Validator`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord(PatientRecord);

impl ValidRecord {
    pub fn record(&self) -> &PatientRecord {
        &self.0
    }

    pub fn into_inner(self) -> PatientRecord {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    pub fn new(limits: Limits) -> Self {
        Validator { limits }
    }

    pub fn validate(
        &self,
        record: &PatientRecord,
    ) -> std::result::Result<ValidRecord, Vec<RuleViolation>> {
        let violations: Vec<RuleViolation> = Rule::ALL
            .iter()
            .filter_map(|rule| self.check(*rule, record))
            .collect();

        if violations.is_empty() {
            Ok(ValidRecord(record.clone()))
        } else {
            trace!("record {} failed {} rule(s)", record.id, violations.len());
            Err(violations)
        }
    }

    fn check(&self, rule: Rule, record: &PatientRecord) -> Option<RuleViolation> {
        let limits = &self.limits;
        let in_range = |bounds: &Bounds, value: f64, label: &str| {
            if bounds.contains(value) {
                None
            } else {
                Some(RuleViolation::new(
                    rule,
                    format!("{} {} outside {}", label, value, bounds),
                ))
            }
        };

        match rule {
            Rule::HeightCm => in_range(&limits.height_cm, record.height_cm, "height"),
            Rule::WeightKg => in_range(&limits.weight_kg, record.weight_kg, "weight"),
            Rule::DiastolicBp => in_range(
                &limits.diastolic_bp,
                record.diastolic_bp as f64,
                "diastolic BP",
            ),
            Rule::SystolicBp => in_range(
                &limits.systolic_bp,
                record.systolic_bp as f64,
                "systolic BP",
            ),
            Rule::SystolicGtDiastolic => {
                if record.systolic_bp > record.diastolic_bp {
                    None
                } else {
                    Some(RuleViolation::new(
                        rule,
                        format!(
                            "systolic BP {} must exceed diastolic BP {}",
                            record.systolic_bp, record.diastolic_bp
                        ),
                    ))
                }
            }
            Rule::AgeDays => {
                if record.age_days > limits.min_age_days {
                    None
                } else {
                    Some(RuleViolation::new(
                        rule,
                        format!(
                            "age {} days must be greater than {}",
                            record.age_days, limits.min_age_days
                        ),
                    ))
                }
            }
        }
    }
}

/// Validate with the default limits.
pub fn validate(record: &PatientRecord) -> std::result::Result<ValidRecord, Vec<RuleViolation>> {
    Validator::default().validate(record)
}
