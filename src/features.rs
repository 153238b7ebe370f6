use num::Float;

use crate::records::EnrichedRecord;
use crate::rules::ValidRecord;

pub const DAYS_PER_YEAR: f64 = 365.25;
pub const HYPERTENSION_SYSTOLIC: i64 = 140;
pub const HYPERTENSION_DIASTOLIC: i64 = 90;
pub const OBESITY_BMI: f64 = 30.0;

/// Round `value` to `decimals` places, sending exact ties to the even neighbour.
pub fn round_half_even<T: Float>(value: T, decimals: i32) -> T {
    let factor = T::from(10.0).unwrap_or_else(T::one).powi(decimals);
    let scaled = value * factor;
    let rounded = scaled.round();
    let half = T::from(0.5).unwrap_or_else(T::zero);
    let two = T::one() + T::one();
    let tie = (scaled - scaled.trunc()).abs() == half;
    let even = if tie && rounded % two != T::zero() {
        rounded - scaled.signum()
    } else {
        rounded
    };
    even / factor
}

/// Whole years, truncated.
pub fn age_years(age_days: i64) -> i64 {
    (age_days as f64 / DAYS_PER_YEAR).trunc() as i64
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round_half_even(weight_kg / (height_m * height_m), 1)
}

pub fn is_hypertensive(systolic_bp: i64, diastolic_bp: i64) -> bool {
    systolic_bp >= HYPERTENSION_SYSTOLIC || diastolic_bp >= HYPERTENSION_DIASTOLIC
}

pub fn is_obese(bmi: f64) -> bool {
    bmi >= OBESITY_BMI
}

/// Compute the derived columns for a validated record.
pub fn derive(valid: ValidRecord) -> EnrichedRecord {
    let base = valid.into_inner();
    let bmi = bmi(base.weight_kg, base.height_cm);

    EnrichedRecord {
        age_years: age_years(base.age_days),
        bmi,
        pulse_pressure: base.systolic_bp - base.diastolic_bp,
        hypertension: is_hypertensive(base.systolic_bp, base.diastolic_bp),
        obesity: is_obese(bmi),
        base,
    }
}
