//! Categorical labels derived from raw patient fields.
//!
//! Every label type that can be aggregated implements [`Category`], which
//! exposes the full, ordered set of variants so counters can be
//! zero-initialized for every category up front.

use serde::{Deserialize, Serialize};

use super::classify::ClassificationError;

/// A closed set of labels that can be counted per patient.
pub trait Category: Copy + Ord + std::fmt::Display + 'static {
    /// All variants, in display order.
    const ALL: &'static [Self];
}

/// Gender label.
///
/// The dataset stores sex as a flag after booleanization: `false` is male,
/// `true` is female (raw gender code 1 maps to `false`, code 2 to `true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Map the booleanized sex flag to a label.
    #[must_use]
    pub fn from_sex(sex: bool) -> Self {
        if sex {
            Self::Female
        } else {
            Self::Male
        }
    }
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female];
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "MALE"),
            Self::Female => write!(f, "FEMALE"),
        }
    }
}

/// Three-valued ordinal level used for cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabLevel {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl LabLevel {
    /// Translate the dataset code (1, 2, 3) into a level.
    ///
    /// # Errors
    /// Returns [`ClassificationError::UnknownLevelCode`] for any other code.
    pub fn from_code(code: u8) -> Result<Self, ClassificationError> {
        match code {
            1 => Ok(Self::Normal),
            2 => Ok(Self::AboveNormal),
            3 => Ok(Self::WellAboveNormal),
            other => Err(ClassificationError::UnknownLevelCode(other)),
        }
    }

    /// The dataset code for this level.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::AboveNormal => 2,
            Self::WellAboveNormal => 3,
        }
    }
}

impl Category for LabLevel {
    const ALL: &'static [Self] = &[Self::Normal, Self::AboveNormal, Self::WellAboveNormal];
}

impl std::fmt::Display for LabLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::AboveNormal => write!(f, "ABOVE_NORMAL"),
            Self::WellAboveNormal => write!(f, "WELL_ABOVE_NORMAL"),
        }
    }
}

/// Blood-pressure stage for a single systolic or diastolic reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PressureStage {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ELEVATED")]
    Elevated,
    #[serde(rename = "HYPERTENSION_STAGE_1")]
    HypertensionStage1,
    #[serde(rename = "HYPERTENSION_STAGE_2")]
    HypertensionStage2,
    /// Reading outside the range covered by the ceiling table.
    #[serde(rename = "INVALID")]
    Invalid,
}

impl PressureStage {
    /// Whether the stage counts as hypertension (stage 1 or 2).
    #[must_use]
    pub fn is_hypertensive(&self) -> bool {
        matches!(self, Self::HypertensionStage1 | Self::HypertensionStage2)
    }
}

impl Category for PressureStage {
    const ALL: &'static [Self] = &[
        Self::Low,
        Self::Normal,
        Self::Elevated,
        Self::HypertensionStage1,
        Self::HypertensionStage2,
        Self::Invalid,
    ];
}

impl std::fmt::Display for PressureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Normal => write!(f, "NORMAL"),
            Self::Elevated => write!(f, "ELEVATED"),
            Self::HypertensionStage1 => write!(f, "HYPERTENSION_STAGE_1"),
            Self::HypertensionStage2 => write!(f, "HYPERTENSION_STAGE_2"),
            Self::Invalid => write!(f, "INVALID"),
        }
    }
}

/// Fine-grained age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeGroup {
    Kid,
    Teen,
    YoungAdult,
    Adult,
    Senior,
}

impl AgeGroup {
    /// The coarse bucket selecting BMI thresholds for this group.
    #[must_use]
    pub fn broader(&self) -> BroaderAgeGroup {
        match self {
            Self::Kid | Self::Teen => BroaderAgeGroup::Kids,
            Self::YoungAdult | Self::Adult | Self::Senior => BroaderAgeGroup::Adults,
        }
    }
}

impl Category for AgeGroup {
    const ALL: &'static [Self] = &[
        Self::Kid,
        Self::Teen,
        Self::YoungAdult,
        Self::Adult,
        Self::Senior,
    ];
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kid => write!(f, "KID"),
            Self::Teen => write!(f, "TEEN"),
            Self::YoungAdult => write!(f, "YOUNG_ADULT"),
            Self::Adult => write!(f, "ADULT"),
            Self::Senior => write!(f, "SENIOR"),
        }
    }
}

/// Coarse age bucket (kids vs. adults).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroaderAgeGroup {
    Kids,
    Adults,
}

impl Category for BroaderAgeGroup {
    const ALL: &'static [Self] = &[Self::Kids, Self::Adults];
}

impl std::fmt::Display for BroaderAgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kids => write!(f, "KIDS"),
            Self::Adults => write!(f, "ADULTS"),
        }
    }
}

/// BMI category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    #[serde(rename = "UNDERWEIGHT")]
    Underweight,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "OVERWEIGHT")]
    Overweight,
    #[serde(rename = "OBESITY_1")]
    Obesity1,
    #[serde(rename = "OBESITY_2")]
    Obesity2,
    #[serde(rename = "OBESITY_3")]
    Obesity3,
}

impl BmiCategory {
    /// Overweight or any obesity class.
    #[must_use]
    pub fn is_overweight(&self) -> bool {
        matches!(
            self,
            Self::Overweight | Self::Obesity1 | Self::Obesity2 | Self::Obesity3
        )
    }
}

impl Category for BmiCategory {
    const ALL: &'static [Self] = &[
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obesity1,
        Self::Obesity2,
        Self::Obesity3,
    ];
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Underweight => write!(f, "UNDERWEIGHT"),
            Self::Normal => write!(f, "NORMAL"),
            Self::Overweight => write!(f, "OVERWEIGHT"),
            Self::Obesity1 => write!(f, "OBESITY_1"),
            Self::Obesity2 => write!(f, "OBESITY_2"),
            Self::Obesity3 => write!(f, "OBESITY_3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_level_codes() {
        for level in LabLevel::ALL {
            assert_eq!(LabLevel::from_code(level.code()).expect("Known code"), *level);
        }
        assert!(matches!(
            LabLevel::from_code(4),
            Err(ClassificationError::UnknownLevelCode(4))
        ));
    }

    #[test]
    fn test_broader_mapping() {
        assert_eq!(AgeGroup::Kid.broader(), BroaderAgeGroup::Kids);
        assert_eq!(AgeGroup::Teen.broader(), BroaderAgeGroup::Kids);
        assert_eq!(AgeGroup::YoungAdult.broader(), BroaderAgeGroup::Adults);
        assert_eq!(AgeGroup::Senior.broader(), BroaderAgeGroup::Adults);
    }

    #[test]
    fn test_gender_from_sex() {
        assert_eq!(Gender::from_sex(false), Gender::Male);
        assert_eq!(Gender::from_sex(true), Gender::Female);
    }

    #[test]
    fn test_display_matches_serde_names() {
        for stage in PressureStage::ALL {
            let json = serde_json::to_string(stage).expect("Serializable");
            assert_eq!(json, format!("\"{stage}\""));
        }
        for category in BmiCategory::ALL {
            let json = serde_json::to_string(category).expect("Serializable");
            assert_eq!(json, format!("\"{category}\""));
        }
        assert_eq!(
            serde_json::to_string(&AgeGroup::YoungAdult).expect("Serializable"),
            "\"YOUNG_ADULT\""
        );
    }
}
