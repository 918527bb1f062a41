//! Static classification tables.
//!
//! Tables are ordered association lists evaluated top-down. Entry order is
//! load-bearing: ceiling tables return the first entry whose ceiling covers
//! the value, so reordering entries changes classification results.

use std::ops::Range;

use super::levels::{AgeGroup, BmiCategory, BroaderAgeGroup, PressureStage};

/// Days-to-years conversion factor.
pub const DAY_TO_YEAR_RATIO: f64 = 0.002_739_73;

/// Accepted height in centimeters (half-open).
pub const HEIGHT_BOUNDS_CM: Range<f64> = 60.0..250.0;

/// Accepted weight in kilograms (half-open).
pub const WEIGHT_BOUNDS_KG: Range<f64> = 30.0..250.0;

/// Accepted age in whole years (half-open).
pub const AGE_BOUNDS_YEARS: Range<i64> = 10..110;

/// Category → half-open integer range.
#[derive(Debug)]
pub struct RangeTable<L: 'static> {
    entries: &'static [(L, Range<i64>)],
}

impl<L: Copy> RangeTable<L> {
    #[must_use]
    pub const fn new(entries: &'static [(L, Range<i64>)]) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &'static [(L, Range<i64>)] {
        self.entries
    }

    /// The category whose range contains `value`, if any.
    #[must_use]
    pub fn lookup(&self, value: i64) -> Option<L> {
        self.entries
            .iter()
            .find(|(_, range)| range.contains(&value))
            .map(|(label, _)| *label)
    }

    /// Total covered span, from the first start to the last end.
    #[must_use]
    pub fn span(&self) -> Option<Range<i64>> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        Some(first.1.start..last.1.end)
    }

    /// Ranges are non-empty and each one starts where the previous ended.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.entries.iter().all(|(_, r)| r.start < r.end)
            && self
                .entries
                .windows(2)
                .all(|pair| pair[0].1.end == pair[1].1.start)
    }
}

/// Category → inclusive upper bound, with a sentinel for out-of-range values.
#[derive(Debug)]
pub struct CeilingTable<L: 'static> {
    entries: &'static [(L, f64)],
    invalid: L,
}

impl<L: Copy> CeilingTable<L> {
    #[must_use]
    pub const fn new(entries: &'static [(L, f64)], invalid: L) -> Self {
        Self { entries, invalid }
    }

    #[must_use]
    pub fn entries(&self) -> &'static [(L, f64)] {
        self.entries
    }

    /// Smallest and largest ceiling.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        self.entries.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), (_, ceiling)| (lo.min(*ceiling), hi.max(*ceiling)),
        )
    }

    /// Classify `value`: the sentinel outside `[min ceiling, max ceiling]`,
    /// otherwise the first entry whose ceiling is `>= value`.
    #[must_use]
    pub fn classify(&self, value: f64) -> L {
        let (lo, hi) = self.bounds();
        if !(lo..=hi).contains(&value) {
            return self.invalid;
        }
        self.entries
            .iter()
            .find(|(_, ceiling)| value <= *ceiling)
            .map_or(self.invalid, |(label, _)| *label)
    }
}

pub static AGE_GROUPS: RangeTable<AgeGroup> = RangeTable::new(&[
    (AgeGroup::Kid, 10..14),
    (AgeGroup::Teen, 14..20),
    (AgeGroup::YoungAdult, 20..30),
    (AgeGroup::Adult, 30..60),
    (AgeGroup::Senior, 60..110),
]);

pub static BMI_KIDS: RangeTable<BmiCategory> = RangeTable::new(&[
    (BmiCategory::Underweight, 2..5),
    (BmiCategory::Normal, 5..18),
    (BmiCategory::Overweight, 18..25),
    (BmiCategory::Obesity1, 25..30),
    (BmiCategory::Obesity2, 30..35),
    (BmiCategory::Obesity3, 35..40),
]);

pub static BMI_ADULTS: RangeTable<BmiCategory> = RangeTable::new(&[
    (BmiCategory::Underweight, 5..18),
    (BmiCategory::Normal, 18..25),
    (BmiCategory::Overweight, 25..30),
    (BmiCategory::Obesity1, 30..35),
    (BmiCategory::Obesity2, 35..40),
    (BmiCategory::Obesity3, 40..50),
]);

/// Systolic ("ap_hi") ceilings.
pub static SYSTOLIC_CEILINGS: CeilingTable<PressureStage> = CeilingTable::new(
    &[
        (PressureStage::Low, 90.0),
        (PressureStage::Normal, 120.0),
        (PressureStage::Elevated, 129.0),
        (PressureStage::HypertensionStage1, 135.0),
        (PressureStage::HypertensionStage2, 140.0),
    ],
    PressureStage::Invalid,
);

/// Diastolic ("ap_lo") ceilings.
pub static DIASTOLIC_CEILINGS: CeilingTable<PressureStage> = CeilingTable::new(
    &[
        (PressureStage::Low, 60.0),
        (PressureStage::Normal, 80.0),
        (PressureStage::Elevated, 89.0),
        (PressureStage::HypertensionStage1, 90.0),
        (PressureStage::HypertensionStage2, 100.0),
    ],
    PressureStage::Invalid,
);

/// BMI category table for a broader age group.
#[must_use]
pub fn bmi_table(group: BroaderAgeGroup) -> &'static RangeTable<BmiCategory> {
    match group {
        BroaderAgeGroup::Kids => &BMI_KIDS,
        BroaderAgeGroup::Adults => &BMI_ADULTS,
    }
}

/// Accepted (truncated) BMI for a broader age group.
#[must_use]
pub fn allowed_bmi(group: BroaderAgeGroup) -> Range<i64> {
    match group {
        BroaderAgeGroup::Kids => 2..40,
        BroaderAgeGroup::Adults => 5..50,
    }
}
