//! Vocal Analyzer and Mix Analyzer: reference audio in, intensity matrix
//! out.

pub mod mix;
pub mod vocal;

use crate::band_plan::BandPlan;
use crate::config::Mode;
use crate::matrix::Matrix2D;

/// The output of either analyzer: an intensity matrix, its frame-time
/// grid, the band plan it was computed against, and which mode produced
/// it (governing the matrix's value semantics, §3).
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub intensity: Matrix2D,
    pub frame_times: Vec<f32>,
    pub band_plan: BandPlan,
    pub mode: Mode,
}

/// Per-frame RMS across a band's assigned bins, from a `(frames, bins)`
/// magnitude table. Bands with an empty bin group return all zeros; the
/// caller decides how to treat that (skip normalization, hold ratio at 1.0).
pub(crate) fn band_rms_per_frame(magnitudes: &[Vec<f32>], bin_group: &[usize]) -> Vec<f32> {
    if bin_group.is_empty() {
        return vec![0.0; magnitudes.len()];
    }
    magnitudes
        .iter()
        .map(|frame| {
            let bins: Vec<f32> = bin_group.iter().map(|&b| frame[b]).collect();
            crate::dsp_math::rms(&bins)
        })
        .collect()
}
