//! Small numeric helpers shared by the analyzers.

/// Root-mean-square of a slice, using 64-bit accumulation to avoid drift.
pub fn rms(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = x.iter().map(|&v| (v as f64) * (v as f64)).sum();
    ((sum_sq / x.len() as f64).sqrt()) as f32
}

/// Temporal median filter of odd `width`, edge-padded by clamping to the
/// nearest valid index (so the output has the same length as the input).
pub fn median_filter(series: &[f32], width: usize) -> Vec<f32> {
    if series.is_empty() || width <= 1 {
        return series.to_vec();
    }
    let half = width / 2;
    let n = series.len();
    let mut out = Vec::with_capacity(n);
    let mut window = Vec::with_capacity(width);
    for i in 0..n {
        window.clear();
        for k in 0..width {
            let offset = k as isize - half as isize;
            let idx = (i as isize + offset).clamp(0, n as isize - 1) as usize;
            window.push(series[idx]);
        }
        window.sort_by(|a, b| a.partial_cmp(b).unwrap());
        out.push(window[width / 2]);
    }
    out
}
