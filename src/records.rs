use serde::{Deserialize, Serialize};

/// Gender code as recorded in the cardio dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Female = 1,
    Male = 2,
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Gender::Female),
            2 => Ok(Gender::Male),
            other => Err(format!("unknown gender code {}", other)),
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> u8 {
        gender as u8
    }
}

/// Ordinal level used for cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    Normal = 1,
    AboveNormal = 2,
    WellAboveNormal = 3,
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Level::Normal),
            2 => Ok(Level::AboveNormal),
            3 => Ok(Level::WellAboveNormal),
            other => Err(format!("level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level as u8
    }
}

/// One raw row of the cardio dataset, with measurements in their original units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    pub age_days: i64,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub cholesterol_level: Level,
    pub glucose_level: Level,
    pub smokes: bool,
    pub drinks_alcohol: bool,
    pub physically_active: bool,
    pub has_cardio_disease: bool,
}

/// A validated record together with its derived features.
///
/// Serializes as one flat mapping: the base fields followed by the derived ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub base: PatientRecord,
    pub age_years: i64,
    pub bmi: f64,
    pub pulse_pressure: i64,
    pub hypertension: bool,
    pub obesity: bool,
}

impl EnrichedRecord {
    pub fn base(&self) -> &PatientRecord {
        &self.base
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> PatientRecord {
    PatientRecord {
        id: 0,
        age_days: 18393,
        gender: Gender::Male,
        height_cm: 168.0,
        weight_kg: 62.0,
        systolic_bp: 110,
        diastolic_bp: 80,
        cholesterol_level: Level::Normal,
        glucose_level: Level::Normal,
        smokes: false,
        drinks_alcohol: false,
        physically_active: true,
        has_cardio_disease: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_codes() {
        assert_eq!(Level::try_from(3u8), Ok(Level::WellAboveNormal));
        assert!(Level::try_from(0u8).is_err());
        assert!(Level::try_from(4u8).is_err());
        assert_eq!(u8::from(Level::AboveNormal), 2);
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::try_from(1u8), Ok(Gender::Female));
        assert!(Gender::try_from(3u8).is_err());
    }

    #[test]
    fn test_enriched_serializes_flat() {
        let record = EnrichedRecord {
            base: sample_record(),
            age_years: 50,
            bmi: 22.0,
            pulse_pressure: 30,
            hypertension: false,
            obesity: false,
        };
        let value = serde_json::to_value(&record).unwrap();
        let map = value.as_object().unwrap();
        for field in [
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
        ] {
            assert!(map.contains_key(field), "missing {}", field);
        }
        assert_eq!(map["gender"], 2);
        assert_eq!(map["cholesterol_level"], 1);
    }
}
