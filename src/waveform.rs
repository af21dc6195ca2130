//! Waveform peak extraction (§4.10): a pure min/max-per-window reduction
//! used by collaborators to render a waveform overview without decoding
//! the source file twice.

/// Divides `samples` into `peak_count` contiguous windows (the last
/// absorbs any remainder) and returns each window's `(min, max)`.
pub fn waveform_peaks(samples: &[f32], peak_count: usize) -> Vec<(f32, f32)> {
    if samples.is_empty() || peak_count == 0 {
        return Vec::new();
    }
    let n = samples.len();
    let count = peak_count.min(n);
    let mut out = Vec::with_capacity(count);
    for window in 0..count {
        let start = window * n / count;
        let end = if window + 1 == count { n } else { (window + 1) * n / count };
        let slice = &samples[start..end];
        let min = slice.iter().cloned().fold(f32::MAX, f32::min);
        let max = slice.iter().cloned().fold(f32::MIN, f32::max);
        out.push((min, max));
    }
    out
}
