use crate::conv1d::convolve_valid_into;
use crate::kernels::DEFAULT_MATCHED_FILTER;

/// Coarse peak of a filter response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub index: usize,
    pub amplitude: f64,
}

/// Valid-mode filter response together with its maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResponse {
    pub trace: Vec<f64>,
    pub peak: Detection,
}

/// Fixed FIR matched filter.
#[derive(Debug, Clone)]
pub struct MatchedFilter {
    kernel: Vec<f64>,
}

impl Default for MatchedFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MATCHED_FILTER.to_vec())
    }
}

impl MatchedFilter {
    pub fn new(kernel: Vec<f64>) -> Self {
        assert!(!kernel.is_empty(), "matched filter kernel must not be empty");
        Self { kernel }
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    pub fn len(&self) -> usize {
        self.kernel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    /// Filters `signal` and locates the first maximum of the response.
    ///
    /// Returns `None` when `signal` is shorter than the kernel.
    pub fn detect(&self, signal: &[f64]) -> Option<FilterResponse> {
        let mut trace = Vec::new();
        convolve_valid_into(&self.kernel, signal, &mut trace);
        let (index, amplitude) = argmax(&trace)?;
        Some(FilterResponse {
            trace,
            peak: Detection { index, amplitude },
        })
    }
}

/// Index and value of the first maximum. NaN samples never win.
pub fn argmax(data: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in data.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.or_else(|| data.first().map(|&v| (0, v)))
}
