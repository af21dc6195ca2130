//! Heatmap downsampling (§4.9): a pure, boundary-facing helper for
//! visualization, max-pooling an intensity matrix down to a target column
//! count.

use crate::config::Mode;
use crate::constants::MAX_GAIN;
use crate::matrix::Matrix2D;

/// Downsamples `(N, F)` to `(N, C')` (`C' = min(target_columns, F)`) via
/// max-pooling over contiguous column windows (the last window absorbs any
/// remainder), returning the pooled matrix and the time at each window's
/// first source column. Mix-mode values are mapped to `[0,1]` via
/// `(r-1)/(MAX_GAIN-1)` before pooling; vocal-mode values are pooled as-is.
pub fn downsample_heatmap(
    matrix: &Matrix2D,
    frame_times: &[f32],
    target_columns: usize,
    mode: Mode,
) -> (Matrix2D, Vec<f32>) {
    let f = matrix.cols();
    if f == 0 || target_columns == 0 {
        return (Matrix2D::filled(matrix.rows(), 0, 0.0), Vec::new());
    }
    let c = target_columns.min(f);

    let normalized: Matrix2D = match mode {
        Mode::Vocal => matrix.clone(),
        Mode::Mix => {
            let mut out = Matrix2D::filled(matrix.rows(), matrix.cols(), 0.0);
            for r in 0..matrix.rows() {
                for col in 0..matrix.cols() {
                    let v = ((matrix.get(r, col) - 1.0) / (MAX_GAIN - 1.0)).clamp(0.0, 1.0);
                    out.set(r, col, v);
                }
            }
            out
        }
    };

    let mut out = Matrix2D::filled(matrix.rows(), c, 0.0);
    let mut times = Vec::with_capacity(c);
    for window in 0..c {
        let start = window * f / c;
        let end = if window + 1 == c { f } else { (window + 1) * f / c };
        times.push(frame_times[start]);
        for r in 0..matrix.rows() {
            let max = normalized.row(r)[start..end].iter().cloned().fold(f32::MIN, f32::max);
            out.set(r, window, max);
        }
    }

    (out, times)
}
