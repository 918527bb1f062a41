//! Pure classification functions over raw patient measurements.

use super::levels::{AgeGroup, BmiCategory, BroaderAgeGroup, PressureStage};
use super::tables::{
    allowed_bmi, bmi_table, AGE_GROUPS, DAY_TO_YEAR_RATIO, DIASTOLIC_CEILINGS, SYSTOLIC_CEILINGS,
};

/// Lookups that must succeed on data inside the documented bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassificationError {
    #[error("Age of {years} years is outside the supported span [10, 110)")]
    AgeOutOfRange { years: i64 },

    #[error("BMI {bmi} has no category for {group}")]
    BmiOutOfRange { bmi: f64, group: BroaderAgeGroup },

    #[error("Unknown level code: {0}")]
    UnknownLevelCode(u8),
}

/// Whole years from an age in days (truncated).
#[must_use]
pub fn age_in_years(age_days: f64) -> i64 {
    (age_days * DAY_TO_YEAR_RATIO).trunc() as i64
}

/// Fine-grained age group for a year count.
///
/// # Errors
/// Returns [`ClassificationError::AgeOutOfRange`] outside `[10, 110)`.
pub fn age_group(years: i64) -> Result<AgeGroup, ClassificationError> {
    AGE_GROUPS
        .lookup(years)
        .ok_or(ClassificationError::AgeOutOfRange { years })
}

/// Coarse age bucket for a year count.
///
/// # Errors
/// Fails when [`age_group`] fails.
pub fn broader_age_group(years: i64) -> Result<BroaderAgeGroup, ClassificationError> {
    age_group(years).map(|group| group.broader())
}

/// BMI rounded to two decimals.
#[must_use]
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let meters = height_cm / 100.0;
    let raw = weight_kg / (meters * meters);
    (raw * 100.0).round() / 100.0
}

/// BMI category; the rounded BMI is truncated to an integer before lookup.
///
/// # Errors
/// Returns [`ClassificationError::BmiOutOfRange`] when no category covers it.
pub fn bmi_category(bmi: f64, group: BroaderAgeGroup) -> Result<BmiCategory, ClassificationError> {
    bmi_table(group)
        .lookup(bmi.trunc() as i64)
        .ok_or(ClassificationError::BmiOutOfRange { bmi, group })
}

/// Whether the truncated BMI is inside the accepted range for the group.
#[must_use]
pub fn bmi_within_allowed(bmi: f64, group: BroaderAgeGroup) -> bool {
    allowed_bmi(group).contains(&(bmi.trunc() as i64))
}

/// Stage of a systolic ("ap_hi") reading.
#[must_use]
pub fn systolic_stage(value: f64) -> PressureStage {
    SYSTOLIC_CEILINGS.classify(value)
}

/// Stage of a diastolic ("ap_lo") reading.
#[must_use]
pub fn diastolic_stage(value: f64) -> PressureStage {
    DIASTOLIC_CEILINGS.classify(value)
}
