use std::ops::Range;

use crate::matched::Detection;

/// Fraction of the coarse peak amplitude that bounds the fit window.
pub const FIT_FRACTION: f64 = 0.8;

/// How a [`RefinedPeak`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStatus {
    /// Vertex of the fitted parabola.
    Refined,
    /// No positive peak; the coarse values are passed through.
    NoSignal,
    /// Positive peak whose fit could not be solved; the coarse values are
    /// passed through.
    Degenerate,
}

/// Sub-pixel peak estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedPeak {
    pub position: f64,
    pub amplitude: f64,
    pub status: RefineStatus,
}

impl RefinedPeak {
    fn unrefined(peak: Detection, status: RefineStatus) -> Self {
        Self {
            position: peak.index as f64,
            amplitude: peak.amplitude,
            status,
        }
    }

    pub fn is_refined(&self) -> bool {
        self.status == RefineStatus::Refined
    }

    pub fn is_degenerate(&self) -> bool {
        self.status == RefineStatus::Degenerate
    }
}

/// Contiguous samples around `peak` that are not below `limit`.
///
/// The window ends just before the first sample below `limit` on each side,
/// or at the trace boundary when there is none.
pub fn fit_window(trace: &[f64], peak: usize, limit: f64) -> Range<usize> {
    let start = trace[..=peak]
        .iter()
        .rposition(|&v| v < limit)
        .map_or(0, |i| i + 1);
    let end = trace[peak..]
        .iter()
        .position(|&v| v < limit)
        .map_or(trace.len(), |i| peak + i);
    start..end
}

/// Refines a coarse peak with a least-squares parabola over the top of the
/// peak.
///
/// Sample offsets are re-based so the coarse peak sits at zero. For the fit
/// `a*x^2 + b*x + c` the position is `index - b/a` and the amplitude is the
/// vertex value `c - b^2/(4a)`.
pub fn refine_peak(trace: &[f64], peak: Detection) -> RefinedPeak {
    if peak.amplitude.is_nan() || peak.amplitude <= 0.0 || peak.index >= trace.len() {
        return RefinedPeak::unrefined(peak, RefineStatus::NoSignal);
    }

    let window = fit_window(trace, peak.index, FIT_FRACTION * peak.amplitude);
    let mut fit = QuadraticFit::default();
    for i in window {
        fit.accum(i as f64 - peak.index as f64, trace[i]);
    }

    let Some((a, b, c)) = fit.solve() else {
        return RefinedPeak::unrefined(peak, RefineStatus::Degenerate);
    };

    let position = peak.index as f64 - b / a;
    let amplitude = c - b * b / (4.0 * a);
    if !position.is_finite() || !amplitude.is_finite() {
        return RefinedPeak::unrefined(peak, RefineStatus::Degenerate);
    }

    RefinedPeak {
        position,
        amplitude,
        status: RefineStatus::Refined,
    }
}

/// Running sums for a least-squares fit of `a*x^2 + b*x + c`.
#[derive(Debug, Clone, Copy, Default)]
struct QuadraticFit {
    n: usize,
    // sum x^k for k = 0..=4
    sx: [f64; 5],
    // sum y*x^k for k = 0..=2
    sxy: [f64; 3],
}

impl QuadraticFit {
    fn accum(&mut self, x: f64, y: f64) {
        self.n += 1;
        let mut xk = 1.0;
        for k in 0..5 {
            self.sx[k] += xk;
            if k < 3 {
                self.sxy[k] += y * xk;
            }
            xk *= x;
        }
    }

    /// Solves the normal equations by Cramer's rule.
    ///
    /// Returns `None` with fewer than three samples, a singular system, or a
    /// flat fit (`a == 0`).
    fn solve(&self) -> Option<(f64, f64, f64)> {
        if self.n < 3 {
            return None;
        }

        let s = &self.sx;
        let m = [[s[4], s[3], s[2]], [s[3], s[2], s[1]], [s[2], s[1], s[0]]];
        let rhs = [self.sxy[2], self.sxy[1], self.sxy[0]];

        let det = det3(&m);
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let mut coef = [0.0; 3];
        for (col, out) in coef.iter_mut().enumerate() {
            let mut mc = m;
            for row in 0..3 {
                mc[row][col] = rhs[row];
            }
            *out = det3(&mc) / det;
        }

        let [a, b, c] = coef;
        if a == 0.0 {
            return None;
        }
        Some((a, b, c))
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[cfg(test)]
mod tests {
    use super::{QuadraticFit, RefineStatus, fit_window, refine_peak};
    use crate::matched::Detection;

    fn parabola(len: usize, k: usize, amp: f64, curv: f64) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let x = i as f64 - k as f64;
                amp - curv * x * x
            })
            .collect()
    }

    #[test]
    fn fit_window_stops_at_threshold() {
        let trace = [0.0, 5.0, 9.0, 10.0, 9.0, 7.0, 9.5];
        assert_eq!(fit_window(&trace, 3, 8.0), 2..5);
        assert_eq!(fit_window(&trace, 3, 4.0), 1..7);
        assert_eq!(fit_window(&[10.0, 9.0], 0, 1.0), 0..2);
    }

    #[test]
    fn symmetric_parabola_recovers_vertex() {
        for (k, amp) in [(10usize, 4.0), (25, 0.75), (3, 120.0)] {
            let trace = parabola(40, k, amp, amp * 0.05);
            let peak = Detection {
                index: k,
                amplitude: trace[k],
            };
            let r = refine_peak(&trace, peak);

            assert_eq!(r.status, RefineStatus::Refined);
            assert!((r.position - k as f64).abs() < 1e-9);
            assert!((r.amplitude - amp).abs() < 1e-9 * amp.max(1.0));
        }
    }

    #[test]
    fn non_positive_peak_passes_through() {
        let trace = [-3.0, -1.0, -2.0];
        let peak = Detection {
            index: 1,
            amplitude: -1.0,
        };
        let r = refine_peak(&trace, peak);
        assert_eq!(r.status, RefineStatus::NoSignal);
        assert_eq!(r.position, 1.0);
        assert_eq!(r.amplitude, -1.0);
    }

    #[test]
    fn single_sample_window_passes_through() {
        let trace = [0.0, 1.0, 10.0, 1.0, 0.0];
        let peak = Detection {
            index: 2,
            amplitude: 10.0,
        };
        let r = refine_peak(&trace, peak);
        assert!(r.is_degenerate());
        assert_eq!(r.position, 2.0);
        assert_eq!(r.amplitude, 10.0);
    }

    #[test]
    fn flat_top_is_degenerate() {
        let trace = [0.0, 5.0, 5.0, 5.0, 5.0, 0.0];
        let peak = Detection {
            index: 1,
            amplitude: 5.0,
        };
        let r = refine_peak(&trace, peak);
        assert_eq!(r.status, RefineStatus::Degenerate);
        assert_eq!(r.position, 1.0);
    }

    #[test]
    fn two_points_are_not_enough() {
        let mut fit = QuadraticFit::default();
        fit.accum(0.0, 1.0);
        fit.accum(1.0, 2.0);
        assert!(fit.solve().is_none());
    }
}
