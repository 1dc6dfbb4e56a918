//! 1D signal primitives for the timetool pipeline.
//!
//! Coordinates follow the sample convention: `signal[i]` sits at position
//! `x = i`. A valid-mode filter response is shorter than its input by
//! `kernel.len() - 1`, and response index `k` covers input samples
//! `k..k + kernel.len()`.
//!
//! Kernels are stored in convolution order. A matched filter authored as the
//! reversed edge shape therefore correlates against the forward-time edge.

pub mod conv1d;
pub mod estimator;
pub mod kernels;
pub mod matched;
pub mod refine;
pub mod window;

pub use conv1d::{convolve_full, convolve_valid, convolve_valid_into};
pub use estimator::{Baseline, ConvergenceRate, RunningEstimator, blend};
pub use kernels::{DEFAULT_MATCHED_FILTER, boxcar};
pub use matched::{Detection, FilterResponse, MatchedFilter, argmax};
pub use refine::{FIT_FRACTION, RefineStatus, RefinedPeak, fit_window, refine_peak};
pub use window::{TraceWindower, WINDOW_LEAD};
