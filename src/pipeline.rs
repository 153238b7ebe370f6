use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::features::derive;
use crate::records::{EnrichedRecord, PatientRecord};
use crate::rules::{Limits, RuleViolation, Validator};

/// A row that failed validation, identified by its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionEntry {
    pub row_index: usize,
    #[serde(serialize_with = "violation_names")]
    pub violations: Vec<RuleViolation>,
}

impl RejectionEntry {
    pub fn names(&self) -> Vec<&'static str> {
        self.violations.iter().map(RuleViolation::name).collect()
    }
}

fn violation_names<S: Serializer>(
    violations: &[RuleViolation],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(violations.iter().map(RuleViolation::name))
}

/// Result of one pipeline run. `enriched` and `rejections` are disjoint and
/// together cover every input row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub enriched: Vec<EnrichedRecord>,
    pub rejections: Vec<RejectionEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    validator: Validator,
}

impl Pipeline {
    pub fn new(limits: Limits) -> Self {
        Pipeline {
            validator: Validator::new(limits),
        }
    }

    pub fn run(&self, records: &[PatientRecord]) -> Outcome {
        let mut outcome = Outcome::default();

        for (row_index, record) in records.iter().enumerate() {
            match self.validator.validate(record) {
                Ok(valid) => outcome.enriched.push(derive(valid)),
                Err(violations) => {
                    debug!(
                        "rejecting row {} (id {}): {}",
                        row_index,
                        record.id,
                        violations
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; ")
                    );
                    outcome.rejections.push(RejectionEntry {
                        row_index,
                        violations,
                    });
                }
            }
        }

        info!(
            "validated {} rows: {} kept, {} rejected",
            records.len(),
            outcome.enriched.len(),
            outcome.rejections.len()
        );
        outcome
    }
}

/// Validate and enrich `records` with the default limits.
pub fn validate_and_enrich(
    records: &[PatientRecord],
) -> (Vec<EnrichedRecord>, Vec<RejectionEntry>) {
    let Outcome {
        enriched,
        rejections,
    } = Pipeline::default().run(records);
    (enriched, rejections)
}
