//! Tabular dataset rows, predicate filtering and per-category counts.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::classify::ClassificationError;
use super::levels::{
    AgeGroup, BmiCategory, BroaderAgeGroup, Category, Gender, LabLevel, PressureStage,
};
use super::patient::{Patient, PatientCheck};

/// One raw dataset row, in the column order of the source CSV.
///
/// Reading accepts both the raw layout (gender 1/2, flags 0/1) and the
/// booleanized layout (booleans); writing always produces the raw layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioRecord {
    pub id: i64,
    /// Age in days
    pub age: f64,
    /// Gender code: 1 or 2
    #[serde(deserialize_with = "deserialize_gender")]
    pub gender: u8,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: f64,
    pub ap_lo: f64,
    pub cholesterol: u8,
    pub gluc: u8,
    #[serde(deserialize_with = "deserialize_flag", serialize_with = "serialize_flag")]
    pub smoke: bool,
    #[serde(deserialize_with = "deserialize_flag", serialize_with = "serialize_flag")]
    pub alco: bool,
    #[serde(deserialize_with = "deserialize_flag", serialize_with = "serialize_flag")]
    pub active: bool,
    #[serde(deserialize_with = "deserialize_flag", serialize_with = "serialize_flag")]
    pub cardio: bool,
}

/// A row with categorical flags converted to booleans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanizedRecord {
    pub id: i64,
    pub age: f64,
    /// `gender - 1 != 0`
    pub gender: bool,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: f64,
    pub ap_lo: f64,
    pub cholesterol: u8,
    pub gluc: u8,
    pub smoke: bool,
    pub alco: bool,
    pub active: bool,
    pub cardio: bool,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| de::Error::custom(format!("invalid flag value `{raw}`")))
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

fn deserialize_gender<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "false" => Ok(1),
        "2" | "true" => Ok(2),
        _ => Err(de::Error::custom(format!("invalid gender value `{raw}`"))),
    }
}

impl CardioRecord {
    #[must_use]
    pub fn booleanized(&self) -> BooleanizedRecord {
        BooleanizedRecord {
            id: self.id,
            age: self.age,
            gender: self.gender != 1,
            height: self.height,
            weight: self.weight,
            ap_hi: self.ap_hi,
            ap_lo: self.ap_lo,
            cholesterol: self.cholesterol,
            gluc: self.gluc,
            smoke: self.smoke,
            alco: self.alco,
            active: self.active,
            cardio: self.cardio,
        }
    }
}

impl TryFrom<&CardioRecord> for Patient {
    type Error = ClassificationError;

    fn try_from(record: &CardioRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            sex: record.gender != 1,
            age: record.age,
            height: record.height,
            weight: record.weight,
            ap_hi: record.ap_hi,
            ap_lo: record.ap_lo,
            cholesterol: LabLevel::from_code(record.cholesterol)?,
            gluc: LabLevel::from_code(record.gluc)?,
            smoke: record.smoke,
            alco: record.alco,
            active: record.active,
            cardio: record.cardio,
        })
    }
}

/// An in-memory dataset of raw rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<CardioRecord>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<CardioRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[CardioRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<CardioRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a patient for every row.
    ///
    /// # Errors
    /// Fails on the first row with an unknown lab-level code.
    pub fn patients(&self) -> Result<Vec<Patient>, ClassificationError> {
        self.records.iter().map(Patient::try_from).collect()
    }

    /// Rows for which `predicate` is false, in their original order.
    ///
    /// # Errors
    /// Propagates the first error from patient construction or the predicate.
    pub fn drop_where<P>(&self, mut predicate: P) -> Result<Self, ClassificationError>
    where
        P: FnMut(&Patient) -> Result<bool, ClassificationError>,
    {
        let mut kept = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let patient = Patient::try_from(record)?;
            if !predicate(&patient)? {
                kept.push(record.clone());
            }
        }
        Ok(Self::new(kept))
    }

    /// Drop rows matching a named check.
    ///
    /// # Errors
    /// See [`Dataset::drop_where`].
    pub fn drop_matching(&self, check: PatientCheck) -> Result<Self, ClassificationError> {
        self.drop_where(|patient| check.evaluate(patient))
    }

    #[must_use]
    pub fn booleanized(&self) -> Vec<BooleanizedRecord> {
        self.records.iter().map(CardioRecord::booleanized).collect()
    }
}

/// Totals per category and the cardio-positive subset, as two independent
/// counters that both start at zero for every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts<K: Category> {
    total: BTreeMap<K, usize>,
    cardio: BTreeMap<K, usize>,
}

fn zeroed<K: Category>() -> BTreeMap<K, usize> {
    K::ALL.iter().map(|key| (*key, 0)).collect()
}

impl<K: Category> Default for CategoryCounts<K> {
    fn default() -> Self {
        Self {
            total: zeroed(),
            cardio: zeroed(),
        }
    }
}

impl<K: Category> CategoryCounts<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: K, cardio: bool) {
        *self.total.entry(key).or_insert(0) += 1;
        if cardio {
            *self.cardio.entry(key).or_insert(0) += 1;
        }
    }

    #[must_use]
    pub fn total(&self, key: K) -> usize {
        self.total.get(&key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn cardio(&self, key: K) -> usize {
        self.cardio.get(&key).copied().unwrap_or(0)
    }

    /// Cardio share of the category, `None` for an empty category.
    #[must_use]
    pub fn prevalence(&self, key: K) -> Option<f64> {
        let total = self.total(key);
        (total > 0).then(|| self.cardio(key) as f64 / total as f64)
    }

    /// One row per category, in category order.
    #[must_use]
    pub fn rows(&self) -> Vec<CountRow> {
        K::ALL
            .iter()
            .map(|key| CountRow {
                category: key.to_string(),
                total: self.total(*key),
                cardio: self.cardio(*key),
                prevalence: self.prevalence(*key),
            })
            .collect()
    }
}

/// Count patients per category.
///
/// # Errors
/// Propagates the first classification failure of `key`.
pub fn count_by<K, F>(patients: &[Patient], key: F) -> Result<CategoryCounts<K>, ClassificationError>
where
    K: Category,
    F: Fn(&Patient) -> Result<K, ClassificationError>,
{
    let mut counts = CategoryCounts::new();
    for patient in patients {
        counts.record(key(patient)?, patient.cardio);
    }
    Ok(counts)
}

/// A rendered row of [`CategoryCounts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub category: String,
    pub total: usize,
    pub cardio: usize,
    pub prevalence: Option<f64>,
}

/// Attribute used to group patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKey {
    AgeGroup,
    BroaderAgeGroup,
    Bmi,
    Systolic,
    Diastolic,
    Cholesterol,
    Glucose,
    Gender,
}

impl CountKey {
    /// Count `patients` grouped by this key.
    ///
    /// # Errors
    /// Propagates classification failures (age group, BMI category).
    pub fn count(&self, patients: &[Patient]) -> Result<Vec<CountRow>, ClassificationError> {
        let rows = match self {
            Self::AgeGroup => count_by::<AgeGroup, _>(patients, Patient::age_group)?.rows(),
            Self::BroaderAgeGroup => {
                count_by::<BroaderAgeGroup, _>(patients, Patient::broader_age_group)?.rows()
            }
            Self::Bmi => count_by::<BmiCategory, _>(patients, Patient::bmi_category)?.rows(),
            Self::Systolic => {
                count_by::<PressureStage, _>(patients, |p| Ok(p.systolic_stage()))?.rows()
            }
            Self::Diastolic => {
                count_by::<PressureStage, _>(patients, |p| Ok(p.diastolic_stage()))?.rows()
            }
            Self::Cholesterol => count_by::<LabLevel, _>(patients, |p| Ok(p.cholesterol))?.rows(),
            Self::Glucose => count_by::<LabLevel, _>(patients, |p| Ok(p.gluc))?.rows(),
            Self::Gender => count_by::<Gender, _>(patients, |p| Ok(p.gender()))?.rows(),
        };
        Ok(rows)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AgeGroup => "age group",
            Self::BroaderAgeGroup => "broader age group",
            Self::Bmi => "BMI category",
            Self::Systolic => "systolic stage",
            Self::Diastolic => "diastolic stage",
            Self::Cholesterol => "cholesterol",
            Self::Glucose => "glucose",
            Self::Gender => "gender",
        }
    }
}

/// Patients matching a check versus not matching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub check: String,
    pub matching: usize,
    pub not_matching: usize,
}

impl StatusCounts {
    /// Labels in report order: `<check>` then `not <check>`.
    #[must_use]
    pub fn labelled(&self) -> [(String, usize); 2] {
        [
            (self.check.clone(), self.matching),
            (format!("not {}", self.check), self.not_matching),
        ]
    }
}

/// Evaluate `check` for every patient.
///
/// # Errors
/// Propagates the first classification failure.
pub fn status_counts(
    patients: &[Patient],
    check: PatientCheck,
) -> Result<StatusCounts, ClassificationError> {
    let mut matching = 0;
    for patient in patients {
        if check.evaluate(patient)? {
            matching += 1;
        }
    }
    Ok(StatusCounts {
        check: check.name().to_string(),
        matching,
        not_matching: patients.len() - matching,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(id: i64, ap_hi: f64, weight: f64, cardio: bool) -> CardioRecord {
        CardioRecord {
            id,
            age: 18393.0,
            gender: 2,
            height: 170.0,
            weight,
            ap_hi,
            ap_lo: 80.0,
            cholesterol: 1,
            gluc: 1,
            smoke: false,
            alco: false,
            active: true,
            cardio,
        }
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            record(1, 120.0, 70.0, false),
            record(2, 160.0, 70.0, true),
            record(3, 133.0, 95.0, true),
            record(4, 110.0, 48.0, false),
        ])
    }

    #[test]
    fn test_always_false_predicate_keeps_dataset() {
        let dataset = sample_dataset();
        let filtered = dataset.drop_where(|_| Ok(false)).expect("Should filter");
        assert_eq!(filtered, dataset);
    }

    #[test]
    fn test_drop_invalid_preserves_order() {
        let dataset = sample_dataset();
        let filtered = dataset
            .drop_matching(PatientCheck::Valid)
            .expect("Should filter");
        // Only the invalid row (ap_hi 160) is kept when dropping valid ones.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].id, 2);

        let valid_only = dataset
            .drop_where(|p| Ok(!p.is_valid()))
            .expect("Should filter");
        let ids: Vec<i64> = valid_only.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_unknown_level_code_fails_filter() {
        let mut bad = record(9, 120.0, 70.0, false);
        bad.gluc = 7;
        let dataset = Dataset::new(vec![bad]);
        assert_eq!(
            dataset.drop_where(|_| Ok(false)),
            Err(ClassificationError::UnknownLevelCode(7))
        );
    }

    #[test]
    fn test_counters_are_independent() {
        let patients = sample_dataset().patients().expect("Known codes");
        let counts = count_by::<PressureStage, _>(&patients, |p| Ok(p.systolic_stage()))
            .expect("Total");

        assert_eq!(counts.total(PressureStage::Normal), 2);
        assert_eq!(counts.cardio(PressureStage::Normal), 0);
        assert_eq!(counts.total(PressureStage::Invalid), 1);
        assert_eq!(counts.cardio(PressureStage::Invalid), 1);
        assert_eq!(counts.total(PressureStage::Elevated), 0);
        assert_eq!(counts.prevalence(PressureStage::Elevated), None);

        let total: usize = counts.rows().iter().map(|r| r.total).sum();
        let cardio: usize = counts.rows().iter().map(|r| r.cardio).sum();
        assert_eq!(total, 4);
        assert_eq!(cardio, 2);
    }

    #[test]
    fn test_rows_cover_every_category() {
        let counts = CategoryCounts::<BmiCategory>::new();
        let rows = counts.rows();
        assert_eq!(rows.len(), BmiCategory::ALL.len());
        assert!(rows.iter().all(|r| r.total == 0 && r.cardio == 0));
        assert_eq!(rows[3].category, "OBESITY_1");
    }

    #[test]
    fn test_count_key_bmi() {
        let patients = sample_dataset().patients().expect("Known codes");
        let rows = CountKey::Bmi.count(&patients).expect("Classifiable");
        let find = |name: &str| rows.iter().find(|r| r.category == name).expect("Row");
        assert_eq!(find("NORMAL").total, 2);
        assert_eq!(find("OBESITY_1").total, 1);
        assert_eq!(find("OBESITY_1").cardio, 1);
        assert_eq!(find("UNDERWEIGHT").total, 1);
    }

    #[test]
    fn test_status_counts() {
        let patients = sample_dataset().patients().expect("Known codes");
        let status = status_counts(&patients, PatientCheck::Valid).expect("Total");
        assert_eq!(status.matching, 3);
        assert_eq!(status.not_matching, 1);
        let labels = status.labelled();
        assert_eq!(labels[1].0, "not is_valid");
    }

    #[test]
    fn test_booleanized_gender() {
        let mut male = record(1, 120.0, 70.0, true);
        male.gender = 1;
        let row = male.booleanized();
        assert!(!row.gender);
        assert!(row.cardio);
        assert!(record(2, 120.0, 70.0, false).booleanized().gender);
    }
}
