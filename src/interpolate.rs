//! Intensity Interpolator (§4.4): resamples a `(N, F)` matrix from the
//! analysis frame grid onto a different (processing) frame grid.

use crate::config::Mode;
use crate::matrix::Matrix2D;

/// Interpolates each band's row of `matrix` from `src_times` onto
/// `dst_times` via linear interpolation, filling out-of-range points with
/// `mode`'s fill value, then clipping to `mode`'s valid range.
pub fn interpolate(matrix: &Matrix2D, src_times: &[f32], dst_times: &[f32], mode: Mode) -> Matrix2D {
    let fill = mode.fill_value();
    let (lo, hi) = mode.valid_range();
    let mut out = Matrix2D::filled(matrix.rows(), dst_times.len(), fill);

    for b in 0..matrix.rows() {
        let src_row = matrix.row(b);
        let dst_row = out.row_mut(b);
        for (i, &t) in dst_times.iter().enumerate() {
            let v = interp1d(src_times, src_row, t, fill);
            dst_row[i] = v.clamp(lo, hi);
        }
    }
    out
}

/// Linear interpolation of a single series at point `x`, with `fill` used
/// outside `[xs[0], xs[last]]`. Exact at nodes.
fn interp1d(xs: &[f32], ys: &[f32], x: f32, fill: f32) -> f32 {
    if xs.is_empty() {
        return fill;
    }
    if x < xs[0] || x > xs[xs.len() - 1] {
        return fill;
    }
    // Binary search for the first index with xs[idx] >= x.
    let idx = xs.partition_point(|&v| v < x);
    if idx < xs.len() && (xs[idx] - x).abs() < f32::EPSILON {
        return ys[idx];
    }
    if idx == 0 {
        return ys[0];
    }
    let (x0, x1) = (xs[idx - 1], xs[idx]);
    let (y0, y1) = (ys[idx - 1], ys[idx]);
    let t = (x - x0) / (x1 - x0).max(f32::EPSILON);
    y0 + (y1 - y0) * t
}
