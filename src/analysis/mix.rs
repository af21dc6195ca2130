//! Mix Analyzer (§4.3): produces a `(N × F)` gain-ratio matrix in
//! `[1, MAX_GAIN]` from a reference-mix / instrumental pair.
//!
//! The shorter of the two signals is zero-padded to match the longer one.
//! This can bias ratio estimates at the tail if the two inputs have
//! drifted out of alignment; preserved verbatim per the open question in
//! SPEC_FULL.md rather than corrected with cross-correlation.

use super::{band_rms_per_frame, AnalysisResult};
use crate::audio_io::{load_wav, resample_linear};
use crate::band_plan::BandPlan;
use crate::config::Mode;
use crate::constants::{ANALYSIS_SR, EPS, HOP, MAX_GAIN, N_FFT};
use crate::dsp_math::median_filter;
use crate::error::RestoreResult;
use crate::matrix::Matrix2D;
use crate::stft::StftEngine;

pub fn analyze_mix(mix_path: &str, instrumental_path: &str, n_bands: usize) -> RestoreResult<AnalysisResult> {
    let mix_buf = load_wav(mix_path)?;
    let inst_buf = load_wav(instrumental_path)?;

    let mut mix_mono = resample_linear(&mix_buf.to_mono(), mix_buf.sample_rate, ANALYSIS_SR);
    let mut inst_mono = resample_linear(&inst_buf.to_mono(), inst_buf.sample_rate, ANALYSIS_SR);

    let len = mix_mono.len().max(inst_mono.len());
    mix_mono.resize(len, 0.0);
    inst_mono.resize(len, 0.0);

    let band_plan = BandPlan::build(n_bands, ANALYSIS_SR, N_FFT);
    let engine = StftEngine::new(N_FFT, HOP);

    let mix_mags = engine.magnitudes(&engine.forward(&mix_mono));
    let inst_mags = engine.magnitudes(&engine.forward(&inst_mono));
    let num_frames = mix_mags.len();
    let frame_times = engine.frame_times(num_frames, ANALYSIS_SR);

    let mut rows = Vec::with_capacity(n_bands);
    for b in 0..n_bands {
        let bin_group = &band_plan.bin_groups[b];
        if bin_group.is_empty() {
            rows.push(vec![1.0; num_frames]);
            continue;
        }

        let mix_rms = band_rms_per_frame(&mix_mags, bin_group);
        let inst_rms = band_rms_per_frame(&inst_mags, bin_group);

        let mut row: Vec<f32> = mix_rms
            .iter()
            .zip(inst_rms.iter())
            .map(|(&m, &i)| (m / (i + EPS)).clamp(1.0, MAX_GAIN))
            .collect();

        row = median_filter(&row, 3);
        rows.push(row);
    }

    Ok(AnalysisResult {
        intensity: Matrix2D::from_rows(rows),
        frame_times,
        band_plan,
        mode: Mode::Mix,
    })
}
