use tt_signal::{ConvergenceRate, RunningEstimator, boxcar, convolve_full};

/// Removes interference that is correlated between the signal rows and a
/// signal-free sideband region.
///
/// The sideband projection is normalized against its own running baseline,
/// smoothed with a boxcar of `width` columns and then subtracted from the
/// normalized signal.
#[derive(Debug, Clone)]
pub struct SidebandCorrector {
    baseline: RunningEstimator,
    kernel: Vec<f64>,
}

impl SidebandCorrector {
    pub fn new(width: usize, rate: ConvergenceRate) -> Self {
        Self {
            baseline: RunningEstimator::new(rate),
            kernel: boxcar(width),
        }
    }

    pub fn width(&self) -> usize {
        self.kernel.len()
    }

    pub fn is_ready(&self) -> bool {
        self.baseline.is_initialized()
    }

    pub fn baseline(&self) -> Option<&[f64]> {
        self.baseline.current()
    }

    /// Candidate baseline after observing `projection`; nothing is stored.
    pub fn updated_baseline(&self, projection: &[f64]) -> Vec<f64> {
        self.baseline.updated(projection)
    }

    pub fn commit(&mut self, baseline: Vec<f64>) {
        self.baseline.commit(baseline);
    }

    /// Correction for a dark-subtracted sideband `projection`, using the
    /// stored baseline. `None` until a baseline has been committed.
    pub fn correction(&self, projection: &[f64]) -> Option<Vec<f64>> {
        self.baseline
            .current()
            .map(|reference| self.correction_against(reference, projection))
    }

    /// Smoothed `projection / reference - 1`, aligned to `projection`.
    ///
    /// The full convolution is `width - 1` samples longer than the input; the
    /// output starts `width / 2` samples into it.
    pub fn correction_against(&self, reference: &[f64], projection: &[f64]) -> Vec<f64> {
        let normalized: Vec<f64> = projection
            .iter()
            .zip(reference)
            .map(|(&p, &r)| p / r - 1.0)
            .collect();

        let m = normalized.len();
        let offset = self.kernel.len() / 2;
        let full = convolve_full(&self.kernel, &normalized);
        full[offset..offset + m].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use tt_signal::ConvergenceRate;

    use super::SidebandCorrector;

    fn corrector(width: usize) -> SidebandCorrector {
        SidebandCorrector::new(width, ConvergenceRate::new(1.0).expect("valid rate"))
    }

    #[test]
    fn not_ready_until_committed() {
        let mut sb = corrector(3);
        assert!(!sb.is_ready());
        assert!(sb.correction(&[1.0, 2.0]).is_none());

        let next = sb.updated_baseline(&[1.0, 2.0]);
        assert!(!sb.is_ready());
        sb.commit(next);
        assert!(sb.is_ready());
        assert_eq!(sb.baseline(), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn matching_projection_gives_zero_correction() {
        let sb = corrector(5);
        let reference = vec![4.0; 20];
        let out = sb.correction_against(&reference, &reference);
        assert_eq!(out.len(), 20);
        assert!(out.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn constant_offset_is_smoothed_and_aligned() {
        let sb = corrector(3);
        let reference = vec![2.0; 6];
        // projection / reference - 1 = 0.5 everywhere.
        let projection = vec![3.0; 6];
        let out = sb.correction_against(&reference, &projection);

        assert_eq!(out.len(), 6);
        // Interior samples see the whole boxcar; the edges see two of three taps.
        assert!((out[0] - 1.0 / 3.0).abs() < 1e-12);
        for &v in &out[1..5] {
            assert!((v - 0.5).abs() < 1e-12);
        }
        assert!((out[5] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn impulse_is_centered_for_odd_width() {
        let sb = corrector(3);
        let reference = vec![1.0; 7];
        let mut projection = vec![1.0; 7];
        projection[3] = 4.0;
        let out = sb.correction_against(&reference, &projection);

        assert!(out[..2].iter().all(|&v| v.abs() < 1e-12));
        for &v in &out[2..5] {
            assert!((v - 1.0).abs() < 1e-12);
        }
        assert!(out[5..].iter().all(|&v| v.abs() < 1e-12));
    }
}
