//! Patient records for the cardiovascular-risk dataset.
//!
//! A [`Patient`] is an immutable value built from one dataset row. Every
//! classification is derived on demand from the raw fields; nothing is
//! cached, so two equal patients always classify identically.

use serde::{Deserialize, Serialize};

use super::classify::{self, ClassificationError};
use super::levels::{AgeGroup, BmiCategory, BroaderAgeGroup, Gender, LabLevel, PressureStage};
use super::tables::{AGE_BOUNDS_YEARS, HEIGHT_BOUNDS_CM, WEIGHT_BOUNDS_KG};

/// One patient of the cardiovascular dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Dataset row identifier
    pub id: i64,

    /// Booleanized sex flag (`false` = male, `true` = female)
    pub sex: bool,

    /// Age in days
    pub age: f64,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Systolic blood pressure (ap_hi)
    pub ap_hi: f64,

    /// Diastolic blood pressure (ap_lo)
    pub ap_lo: f64,

    pub cholesterol: LabLevel,
    pub gluc: LabLevel,
    pub smoke: bool,
    pub alco: bool,
    pub active: bool,

    /// Positive cardiovascular disease diagnosis
    pub cardio: bool,
}

impl Patient {
    /// Age in whole years.
    #[must_use]
    pub fn years(&self) -> i64 {
        classify::age_in_years(self.age)
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        Gender::from_sex(self.sex)
    }

    /// # Errors
    /// Fails when the age is outside `[10, 110)` years.
    pub fn age_group(&self) -> Result<AgeGroup, ClassificationError> {
        classify::age_group(self.years())
    }

    /// # Errors
    /// Fails when the age is outside `[10, 110)` years.
    pub fn broader_age_group(&self) -> Result<BroaderAgeGroup, ClassificationError> {
        classify::broader_age_group(self.years())
    }

    /// BMI rounded to two decimals.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        classify::bmi(self.height, self.weight)
    }

    /// # Errors
    /// Fails when the age group or the BMI category cannot be resolved.
    pub fn bmi_category(&self) -> Result<BmiCategory, ClassificationError> {
        classify::bmi_category(self.bmi(), self.broader_age_group()?)
    }

    /// # Errors
    /// Fails when the age group cannot be resolved.
    pub fn bmi_is_valid(&self) -> Result<bool, ClassificationError> {
        Ok(classify::bmi_within_allowed(
            self.bmi(),
            self.broader_age_group()?,
        ))
    }

    #[must_use]
    pub fn systolic_stage(&self) -> PressureStage {
        classify::systolic_stage(self.ap_hi)
    }

    #[must_use]
    pub fn diastolic_stage(&self) -> PressureStage {
        classify::diastolic_stage(self.ap_lo)
    }

    #[must_use]
    pub fn height_is_valid(&self) -> bool {
        HEIGHT_BOUNDS_CM.contains(&self.height)
    }

    #[must_use]
    pub fn weight_is_valid(&self) -> bool {
        WEIGHT_BOUNDS_KG.contains(&self.weight)
    }

    #[must_use]
    pub fn age_is_valid(&self) -> bool {
        AGE_BOUNDS_YEARS.contains(&self.years())
    }

    /// Both pressures classified, body measures and age in bounds, and the
    /// BMI inside the range accepted for the patient's age.
    ///
    /// The BMI check needs a valid age, so it only runs once the age passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.systolic_stage() != PressureStage::Invalid
            && self.diastolic_stage() != PressureStage::Invalid
            && self.height_is_valid()
            && self.weight_is_valid()
            && self.age_is_valid()
            && self.bmi_is_valid().unwrap_or(false)
    }

    /// Either reading is hypertension stage 1 or 2.
    #[must_use]
    pub fn is_hypertensive(&self) -> bool {
        self.systolic_stage().is_hypertensive() || self.diastolic_stage().is_hypertensive()
    }

    /// # Errors
    /// Fails when the BMI category cannot be resolved.
    pub fn is_overweight(&self) -> Result<bool, ClassificationError> {
        Ok(self.bmi_category()?.is_overweight())
    }

    /// # Errors
    /// Fails when the BMI category cannot be resolved.
    pub fn is_underweight(&self) -> Result<bool, ClassificationError> {
        Ok(self.bmi_category()? == BmiCategory::Underweight)
    }

    /// Not hypertensive, not overweight, not underweight.
    ///
    /// # Errors
    /// Fails when the patient is not hypertensive and the BMI category
    /// cannot be resolved.
    pub fn is_healthy(&self) -> Result<bool, ClassificationError> {
        if self.is_hypertensive() {
            return Ok(false);
        }
        let category = self.bmi_category()?;
        Ok(!category.is_overweight() && category != BmiCategory::Underweight)
    }
}

/// Named per-patient predicates used for filtering and status counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientCheck {
    Valid,
    Healthy,
    Hypertensive,
    Overweight,
    Underweight,
    Cardio,
}

impl PatientCheck {
    /// Evaluate the check for one patient.
    ///
    /// # Errors
    /// Propagates classification failures of BMI-based checks.
    pub fn evaluate(&self, patient: &Patient) -> Result<bool, ClassificationError> {
        match self {
            Self::Valid => Ok(patient.is_valid()),
            Self::Healthy => patient.is_healthy(),
            Self::Hypertensive => Ok(patient.is_hypertensive()),
            Self::Overweight => patient.is_overweight(),
            Self::Underweight => patient.is_underweight(),
            Self::Cardio => Ok(patient.cardio),
        }
    }

    /// Label used in reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Valid => "is_valid",
            Self::Healthy => "is_healthy",
            Self::Hypertensive => "in_hypertension",
            Self::Overweight => "is_overweight",
            Self::Underweight => "is_underweight",
            Self::Cardio => "cardio",
        }
    }
}

impl std::fmt::Display for PatientCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A 50-year-old adult, 170 cm / 70 kg, 120/80.
    pub(crate) fn sample_patient() -> Patient {
        Patient {
            id: 1,
            sex: false,
            age: 18393.0,
            height: 170.0,
            weight: 70.0,
            ap_hi: 120.0,
            ap_lo: 80.0,
            cholesterol: LabLevel::Normal,
            gluc: LabLevel::Normal,
            smoke: false,
            alco: false,
            active: true,
            cardio: false,
        }
    }

    #[test]
    fn test_derived_properties() {
        let patient = sample_patient();
        assert_eq!(patient.years(), 50);
        assert_eq!(patient.gender(), Gender::Male);
        assert_eq!(patient.age_group().expect("In range"), AgeGroup::Adult);
        assert_eq!(
            patient.broader_age_group().expect("In range"),
            BroaderAgeGroup::Adults
        );
        assert!((patient.bmi() - 24.22).abs() < 1e-9);
        assert_eq!(patient.bmi_category().expect("Covered"), BmiCategory::Normal);
        assert_eq!(patient.systolic_stage(), PressureStage::Normal);
        assert_eq!(patient.diastolic_stage(), PressureStage::Normal);
    }

    #[test]
    fn test_valid_and_healthy() {
        let patient = sample_patient();
        assert!(patient.is_valid());
        assert!(!patient.is_hypertensive());
        assert!(patient.is_healthy().expect("Classifiable"));
    }

    #[test]
    fn test_invalid_pressure() {
        let patient = Patient {
            ap_hi: 160.0,
            ..sample_patient()
        };
        assert_eq!(patient.systolic_stage(), PressureStage::Invalid);
        assert!(!patient.is_valid());
    }

    #[test]
    fn test_invalid_age_does_not_fail_validity() {
        let patient = Patient {
            age: 150.0 * 365.0,
            ..sample_patient()
        };
        assert!(!patient.age_is_valid());
        assert!(!patient.is_valid());
        assert!(patient.age_group().is_err());
        assert!(patient.bmi_category().is_err());
    }

    #[test]
    fn test_body_measure_bounds() {
        let with_height = |height| Patient {
            height,
            ..sample_patient()
        };
        let with_weight = |weight| Patient {
            weight,
            ..sample_patient()
        };
        assert!(with_height(60.0).height_is_valid());
        assert!(!with_height(59.9).height_is_valid());
        assert!(!with_height(250.0).height_is_valid());
        assert!(!with_height(250.0).is_valid());
        assert!(with_weight(30.0).weight_is_valid());
        assert!(!with_weight(29.9).weight_is_valid());
        assert!(!with_weight(250.0).weight_is_valid());
        assert!(!with_weight(250.0).is_valid());
    }

    #[test]
    fn test_fractional_measures_are_accepted() {
        let patient = Patient {
            height: 170.5,
            weight: 62.5,
            ..sample_patient()
        };
        assert!(patient.height_is_valid());
        assert!(patient.weight_is_valid());
        assert!(patient.is_valid());
    }

    #[test]
    fn test_allowed_bmi_depends_on_age() {
        // 249 cm / 30 kg truncates to BMI 4.
        let adult = Patient {
            height: 249.0,
            weight: 30.0,
            ..sample_patient()
        };
        let kid = Patient {
            age: 12.5 * 365.0,
            ..adult
        };
        assert!((adult.bmi() - 4.84).abs() < 1e-9);
        assert!(adult.height_is_valid() && adult.weight_is_valid());
        assert!(!adult.bmi_is_valid().expect("Adult age"));
        assert!(!adult.is_valid());
        assert!(kid.bmi_is_valid().expect("Kid age"));
        assert!(kid.is_valid());
    }

    #[test]
    fn test_hypertension_from_either_reading() {
        let systolic = Patient {
            ap_hi: 133.0,
            ..sample_patient()
        };
        let diastolic = Patient {
            ap_lo: 100.0,
            ..sample_patient()
        };
        assert!(systolic.is_hypertensive());
        assert!(diastolic.is_hypertensive());
        assert!(!systolic.is_healthy().expect("Short-circuits"));
    }

    #[test]
    fn test_weight_classes() {
        let heavy = Patient {
            weight: 95.0,
            ..sample_patient()
        };
        let light = Patient {
            weight: 48.0,
            ..sample_patient()
        };
        assert!(heavy.is_overweight().expect("Covered"));
        assert!(!heavy.is_healthy().expect("Covered"));
        assert!(light.is_underweight().expect("Covered"));
        assert!(!light.is_healthy().expect("Covered"));
    }

    #[test]
    fn test_kid_thresholds_differ() {
        // 12 years old, BMI 20.0
        let kid = Patient {
            age: 12.5 * 365.0,
            height: 150.0,
            weight: 45.0,
            ..sample_patient()
        };
        assert_eq!(kid.age_group().expect("In range"), AgeGroup::Kid);
        assert_eq!(kid.bmi_category().expect("Covered"), BmiCategory::Overweight);
    }

    #[test]
    fn test_checks() {
        let patient = Patient {
            cardio: true,
            ..sample_patient()
        };
        assert!(PatientCheck::Valid.evaluate(&patient).expect("Total"));
        assert!(PatientCheck::Cardio.evaluate(&patient).expect("Total"));
        assert!(!PatientCheck::Hypertensive.evaluate(&patient).expect("Total"));
        assert_eq!(PatientCheck::Hypertensive.to_string(), "in_hypertension");
    }
}
