/// Default matched-filter weights for a 2 um Si3N4 target.
///
/// Taken from the leading edge of a clean measured signal, offset so the
/// weights sum to zero, scaled for unity response to that edge, and stored in
/// reversed order so that convolution correlates against the forward edge.
pub const DEFAULT_MATCHED_FILTER: [f64; 110] = [
    0.021271, 0.021420, 0.021300, 0.020841, 0.019002, 0.018521, 0.017709, 0.016917,
    0.016136, 0.015775, 0.016159, 0.016625, 0.018421, 0.019124, 0.019940, 0.020863,
    0.022695, 0.023021, 0.022870, 0.023539, 0.022878, 0.022498, 0.021527, 0.020684,
    0.018432, 0.017906, 0.017220, 0.016278, 0.015805, 0.015476, 0.016189, 0.016698,
    0.018463, 0.019164, 0.020866, 0.022218, 0.023980, 0.025467, 0.026288, 0.027654,
    0.027553, 0.028020, 0.027497, 0.027532, 0.027345, 0.026183, 0.024828, 0.023994,
    0.022470, 0.021380, 0.020708, 0.017988, 0.015344, 0.013443, 0.012679, 0.010346,
    0.008949, 0.008011, 0.005592, 0.004422, 0.003823, 0.002964, 0.001387, 0.000745,
    0.000476, -0.000693, -0.001316, -0.001854, -0.003055, -0.004322, -0.005619, -0.007256,
    -0.008500, -0.009928, -0.010720, -0.012438, -0.014539, -0.015999, -0.016426, -0.017158,
    -0.017685, -0.020060, -0.022255, -0.023479, -0.024659, -0.025915, -0.027599, -0.030440,
    -0.033650, -0.035092, -0.036712, -0.038233, -0.039815, -0.041164, -0.042795, -0.042928,
    -0.043287, -0.043684, -0.042911, -0.042691, -0.041668, -0.041339, -0.040931, -0.039619,
    -0.038069, -0.036695, -0.036167, -0.035128, -0.034187, -0.032843,
];

/// Uniform averaging kernel of `width` taps, each `1/width`.
pub fn boxcar(width: usize) -> Vec<f64> {
    assert!(width > 0, "boxcar width must be > 0");
    vec![1.0 / width as f64; width]
}
