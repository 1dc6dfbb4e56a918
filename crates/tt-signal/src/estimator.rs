/// Exponential averaging weight `alpha` in `(0, 1]`.
///
/// `alpha = 1` tracks the latest sample exactly; small values average over
/// roughly `1 / alpha` samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceRate(f64);

impl ConvergenceRate {
    pub fn new(alpha: f64) -> Option<Self> {
        if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
            Some(Self(alpha))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// State of a running baseline.
///
/// The first observed sample replaces the baseline outright; only later
/// samples are blended in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Baseline {
    #[default]
    Uninitialized,
    Tracking(Vec<f64>),
}

/// Exponential moving average over fixed-length vectors.
///
/// Updates come in two steps so callers can discard an update: [`Self::updated`]
/// computes the next baseline without touching state and [`Self::commit`]
/// stores it. [`Self::update`] does both.
#[derive(Debug, Clone)]
pub struct RunningEstimator {
    rate: ConvergenceRate,
    baseline: Baseline,
}

impl RunningEstimator {
    pub fn new(rate: ConvergenceRate) -> Self {
        Self {
            rate,
            baseline: Baseline::Uninitialized,
        }
    }

    pub fn rate(&self) -> ConvergenceRate {
        self.rate
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.baseline, Baseline::Tracking(_))
    }

    pub fn current(&self) -> Option<&[f64]> {
        match &self.baseline {
            Baseline::Uninitialized => None,
            Baseline::Tracking(v) => Some(v),
        }
    }

    /// Baseline that would result from observing `sample`.
    pub fn updated(&self, sample: &[f64]) -> Vec<f64> {
        match &self.baseline {
            Baseline::Uninitialized => sample.to_vec(),
            Baseline::Tracking(current) => blend(current, sample, self.rate.get()),
        }
    }

    pub fn commit(&mut self, next: Vec<f64>) {
        self.baseline = Baseline::Tracking(next);
    }

    pub fn update(&mut self, sample: &[f64]) -> &[f64] {
        let next = self.updated(sample);
        self.commit(next);
        self.current().unwrap_or_default()
    }
}

/// Elementwise `(1 - alpha) * current + alpha * sample`.
///
/// A sample equal to the baseline leaves that element bit-identical.
pub fn blend(current: &[f64], sample: &[f64], alpha: f64) -> Vec<f64> {
    assert_eq!(
        current.len(),
        sample.len(),
        "baseline and sample lengths must match"
    );
    if alpha == 1.0 {
        return sample.to_vec();
    }
    current
        .iter()
        .zip(sample)
        .map(|(&c, &s)| if s == c { c } else { (1.0 - alpha) * c + alpha * s })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Baseline, ConvergenceRate, RunningEstimator, blend};

    fn rate(alpha: f64) -> ConvergenceRate {
        ConvergenceRate::new(alpha).expect("valid rate")
    }

    #[test]
    fn rate_must_be_in_unit_interval() {
        assert!(ConvergenceRate::new(1.0).is_some());
        assert!(ConvergenceRate::new(0.05).is_some());
        assert!(ConvergenceRate::new(0.0).is_none());
        assert!(ConvergenceRate::new(1.5).is_none());
        assert!(ConvergenceRate::new(f64::NAN).is_none());
    }

    #[test]
    fn first_sample_replaces_then_fixed_point() {
        for alpha in [0.05, 0.3, 0.5, 1.0] {
            let v = vec![3.0, -1.5, 7.25, 0.0];
            let mut est = RunningEstimator::new(rate(alpha));
            assert_eq!(est.baseline(), &Baseline::Uninitialized);

            assert_eq!(est.update(&v), v.as_slice());
            for _ in 0..20 {
                assert_eq!(est.update(&v), v.as_slice());
            }
        }
    }

    #[test]
    fn second_sample_is_blended() {
        let alpha = 0.25;
        let a = [4.0, 8.0, -2.0];
        let b = [0.0, 16.0, 2.0];
        let mut est = RunningEstimator::new(rate(alpha));
        est.update(&a);
        let got = est.update(&b).to_vec();

        for i in 0..a.len() {
            assert_eq!(got[i], (1.0 - alpha) * a[i] + alpha * b[i]);
        }
    }

    #[test]
    fn blend_matches_weighted_sum_bit_for_bit() {
        let alpha = 0.05;
        let a: Vec<f64> = (1..200).map(|i| 0.1 * i as f64 + 0.013).collect();
        let b: Vec<f64> = (1..200).map(|i| 0.7 * i as f64 + 0.29).collect();
        let mut est = RunningEstimator::new(rate(alpha));
        est.update(&a);
        let got = est.update(&b).to_vec();

        for i in 0..a.len() {
            assert_eq!(got[i], (1.0 - alpha) * a[i] + alpha * b[i], "element {i}");
        }
        assert_eq!(blend(&[0.213], &[1.69], alpha), vec![(1.0 - alpha) * 0.213 + alpha * 1.69]);
    }

    #[test]
    fn updated_does_not_mutate() {
        let mut est = RunningEstimator::new(rate(0.5));
        let _ = est.updated(&[1.0, 2.0]);
        assert!(!est.is_initialized());

        est.update(&[1.0, 2.0]);
        assert_eq!(est.updated(&[3.0, 4.0]), vec![2.0, 3.0]);
        assert_eq!(est.current(), Some(&[1.0, 2.0][..]));
    }
}
