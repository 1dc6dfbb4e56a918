/// Output samples from the detected edge to the end of the window.
pub const WINDOW_LEAD: usize = 50;

/// Cuts a fixed-length, zero-padded excerpt of the normalized signal around
/// the detected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceWindower {
    samples: usize,
    kernel_len: usize,
}

impl TraceWindower {
    /// Returns `None` for `samples == 0`, which disables windowing.
    pub fn new(samples: usize, kernel_len: usize) -> Option<Self> {
        if samples == 0 {
            return None;
        }
        Some(Self {
            samples,
            kernel_len,
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Copies `signal` so that the edge at filter-response index `peak_index`
    /// lands at output offset `samples - WINDOW_LEAD`.
    ///
    /// Output positions falling outside `signal` stay zero.
    pub fn window(&self, signal: &[f64], peak_index: usize) -> Vec<f64> {
        let margin = self.samples as isize - WINDOW_LEAD as isize;
        let raw_pos = (peak_index + self.kernel_len) as isize - 1;
        let start = raw_pos - margin;

        let mut out = vec![0.0; self.samples];
        for (i, dst) in out.iter_mut().enumerate() {
            let src = start + i as isize;
            if src >= 0 && (src as usize) < signal.len() {
                *dst = signal[src as usize];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::TraceWindower;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64 + 1.0).collect()
    }

    #[test]
    fn zero_samples_disables() {
        assert!(TraceWindower::new(0, 10).is_none());
    }

    #[test]
    fn interior_window_has_no_padding() {
        let signal = ramp(700);
        let w = TraceWindower::new(100, 110).expect("enabled");
        // raw position 300 + 109 = 409, window starts at 409 - 50 = 359.
        let out = w.window(&signal, 300);

        assert_eq!(out.len(), 100);
        assert!(out.iter().all(|&v| v != 0.0));
        assert_eq!(out[0], signal[359]);
        assert_eq!(out[50], signal[409]);
        assert_eq!(out[99], signal[458]);
    }

    #[test]
    fn window_near_start_is_zero_led() {
        let signal = ramp(700);
        let w = TraceWindower::new(100, 10).expect("enabled");
        // raw position 0 + 9 = 9, window starts at 9 - 50 = -41.
        let out = w.window(&signal, 0);

        assert_eq!(out.len(), 100);
        assert!(out[..41].iter().all(|&v| v == 0.0));
        assert_eq!(out[41], signal[0]);
        assert_eq!(out[99], signal[58]);
    }

    #[test]
    fn window_near_end_is_zero_trailed() {
        let signal = ramp(200);
        let w = TraceWindower::new(100, 10).expect("enabled");
        // raw position 180 + 9 = 189, window starts at 139 and runs past 199.
        let out = w.window(&signal, 180);

        assert_eq!(out[0], signal[139]);
        assert_eq!(out[60], signal[199]);
        assert!(out[61..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn short_window_shifts_edge_forward() {
        let signal = ramp(300);
        let w = TraceWindower::new(20, 1).expect("enabled");
        // margin is 20 - 50 = -30, so the window starts 30 samples after the edge.
        let out = w.window(&signal, 100);
        assert_eq!(out[0], signal[130]);
    }
}
