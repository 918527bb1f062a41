//! Seeded synthetic binary-classification datasets.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::TrainingError;

/// Feature matrix with 0/1 targets.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticData {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
}

impl SyntheticData {
    fn from_points(
        mut points: Vec<([f64; 2], f64)>,
        noise: f64,
        rng: &mut ChaCha20Rng,
    ) -> Result<Self, TrainingError> {
        if !noise.is_finite() || noise < 0.0 {
            return Err(TrainingError::InvalidNoise(noise));
        }
        points.shuffle(rng);

        let jitter = Normal::new(0.0, noise).map_err(|_| TrainingError::InvalidNoise(noise))?;
        let rows = points.len();
        let mut values = Vec::with_capacity(rows * 2);
        let mut targets = Vec::with_capacity(rows);
        for ([x, y], label) in points {
            values.push(x + jitter.sample(rng));
            values.push(y + jitter.sample(rng));
            targets.push(label);
        }

        Ok(Self {
            features: crate::domain::regression::matrix(rows, 2, values)?,
            targets: Array1::from(targets),
        })
    }
}

fn linspace(steps: usize) -> impl Iterator<Item = f64> {
    let denom = steps.saturating_sub(1).max(1) as f64;
    (0..steps).map(move |i| PI * i as f64 / denom)
}

/// Two interleaving half circles; the outer moon is class 0.
///
/// # Errors
/// Returns [`TrainingError::InvalidNoise`] for a negative or non-finite `noise`.
pub fn make_moons(samples: usize, noise: f64, seed: u64) -> Result<SyntheticData, TrainingError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let outer = samples / 2;
    let inner = samples - outer;

    let points: Vec<([f64; 2], f64)> = linspace(outer)
        .map(|t| ([t.cos(), t.sin()], 0.0))
        .chain(linspace(inner).map(|t| ([1.0 - t.cos(), 0.5 - t.sin()], 1.0)))
        .collect();

    SyntheticData::from_points(points, noise, &mut rng)
}

/// Two Gaussian clusters centered at `(-c, -c)` (class 0) and `(c, c)`
/// (class 1), each with unit spread scaled by `noise`.
///
/// # Errors
/// Returns [`TrainingError::InvalidNoise`] for a negative or non-finite `noise`.
pub fn make_blobs(
    samples: usize,
    center: f64,
    noise: f64,
    seed: u64,
) -> Result<SyntheticData, TrainingError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let negative = samples / 2;

    let points: Vec<([f64; 2], f64)> = (0..samples)
        .map(|i| {
            if i < negative {
                ([-center, -center], 0.0)
            } else {
                ([center, center], 1.0)
            }
        })
        .collect();

    SyntheticData::from_points(points, noise, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{accuracy, FitParams, LogisticRegression};

    #[test]
    fn test_moons_shape_and_balance() {
        let data = make_moons(101, 0.1, 7).expect("Should generate");
        assert_eq!(data.features.dim(), (101, 2));
        assert_eq!(data.targets.len(), 101);
        let positives = data.targets.iter().filter(|y| **y == 1.0).count();
        assert_eq!(positives, 51);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = make_moons(50, 0.24, 42).expect("Should generate");
        let b = make_moons(50, 0.24, 42).expect("Should generate");
        let c = make_moons(50, 0.24, 43).expect("Should generate");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noiseless_moons_lie_on_circles() {
        let data = make_moons(20, 0.0, 1).expect("Should generate");
        for (row, label) in data.features.rows().into_iter().zip(data.targets.iter()) {
            let (cx, cy) = if *label == 0.0 { (0.0, 0.0) } else { (1.0, 0.5) };
            let radius = ((row[0] - cx).powi(2) + (row[1] - cy).powi(2)).sqrt();
            assert!((radius - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bad_noise_is_rejected() {
        assert_eq!(make_moons(10, -0.1, 0), Err(TrainingError::InvalidNoise(-0.1)));
        assert!(matches!(
            make_blobs(10, 1.0, f64::NAN, 0),
            Err(TrainingError::InvalidNoise(n)) if n.is_nan()
        ));
        assert!(matches!(
            make_moons(10, f64::INFINITY, 0),
            Err(TrainingError::InvalidNoise(_))
        ));
    }

    #[test]
    fn test_separable_blobs_are_learned() {
        let data = make_blobs(200, 2.5, 1.0, 11).expect("Should generate");
        let mut model = LogisticRegression::default();
        model
            .fit(
                &data.features,
                &data.targets,
                &FitParams {
                    batch_size: 50,
                    epochs: 200,
                    learning_rate: 0.1,
                },
            )
            .expect("Should fit");

        let predicted = model.predict(&data.features).expect("Fitted");
        assert!(accuracy(data.targets.view(), &predicted) >= 0.85);
    }
}
