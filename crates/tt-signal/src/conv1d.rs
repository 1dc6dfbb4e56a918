/// Valid-mode convolution: only fully overlapping positions are produced.
///
/// `out[k] = sum_j kernel[j] * signal[k + kernel.len() - 1 - j]`, so the
/// output has `signal.len() - kernel.len() + 1` samples. A signal shorter
/// than the kernel yields an empty output.
pub fn convolve_valid(kernel: &[f64], signal: &[f64]) -> Vec<f64> {
    let mut out = Vec::new();
    convolve_valid_into(kernel, signal, &mut out);
    out
}

pub fn convolve_valid_into(kernel: &[f64], signal: &[f64], out: &mut Vec<f64>) {
    out.clear();
    if kernel.is_empty() || signal.len() < kernel.len() {
        return;
    }

    out.reserve(signal.len() - kernel.len() + 1);
    for window in signal.windows(kernel.len()) {
        let acc: f64 = window
            .iter()
            .zip(kernel.iter().rev())
            .map(|(&s, &k)| s * k)
            .sum();
        out.push(acc);
    }
}

/// Full-mode convolution with implicit zero padding on both sides.
///
/// The output has `kernel.len() + signal.len() - 1` samples.
pub fn convolve_full(kernel: &[f64], signal: &[f64]) -> Vec<f64> {
    if kernel.is_empty() || signal.is_empty() {
        return Vec::new();
    }

    let mut out = vec![0.0; kernel.len() + signal.len() - 1];
    for (i, &kv) in kernel.iter().enumerate() {
        for (j, &sv) in signal.iter().enumerate() {
            out[i + j] += kv * sv;
        }
    }
    out
}
