//! Vocal Analyzer (§4.2): produces a `(N × F)` intensity matrix in `[0,1]`
//! from an isolated vocal reference track.

use super::{band_rms_per_frame, AnalysisResult};
use crate::audio_io::{load_wav, resample_linear};
use crate::band_plan::BandPlan;
use crate::config::Mode;
use crate::constants::{ANALYSIS_SR, HOP, N_FFT};
use crate::dsp_math::median_filter;
use crate::error::RestoreResult;
use crate::matrix::Matrix2D;
use crate::stft::StftEngine;

/// Threshold below which a normalized band value is zeroed, per
/// sensitivity: `0.70 - 0.07 * (sensitivity - 1)`.
fn threshold_for_sensitivity(sensitivity: u8) -> f32 {
    0.70 - 0.07 * (sensitivity as f32 - 1.0)
}

pub fn analyze_vocal(path: &str, sensitivity: u8, n_bands: usize) -> RestoreResult<AnalysisResult> {
    let buffer = load_wav(path)?;
    let mono = buffer.to_mono();
    let mono = resample_linear(&mono, buffer.sample_rate, ANALYSIS_SR);

    let band_plan = BandPlan::build(n_bands, ANALYSIS_SR, N_FFT);
    let engine = StftEngine::new(N_FFT, HOP);
    let spectra = engine.forward(&mono);
    let magnitudes = engine.magnitudes(&spectra);
    let num_frames = magnitudes.len();
    let frame_times = engine.frame_times(num_frames, ANALYSIS_SR);

    let threshold = threshold_for_sensitivity(sensitivity);
    let mut rows = Vec::with_capacity(n_bands);

    for b in 0..n_bands {
        let bin_group = &band_plan.bin_groups[b];
        let mut row = band_rms_per_frame(&magnitudes, bin_group);

        let max = row.iter().cloned().fold(0.0f32, f32::max);
        if max > 0.0 {
            for v in &mut row {
                *v /= max;
            }
        }

        for v in &mut row {
            if *v < threshold {
                *v = 0.0;
            }
        }

        row = median_filter(&row, 5);

        for v in &mut row {
            *v = v.clamp(0.0, 1.0);
        }

        rows.push(row);
    }

    Ok(AnalysisResult {
        intensity: Matrix2D::from_rows(rows),
        frame_times,
        band_plan,
        mode: Mode::Vocal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_io::{write_wav, AudioBuffer};
    use std::f32::consts::PI;

    fn tone_wav(path: &str, freq: f32, sr: u32, seconds: f32) {
        let n = (sr as f32 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sr as f32).sin() * 0.5)
            .collect();
        write_wav(
            path,
            &AudioBuffer {
                channels: vec![samples],
                sample_rate: sr,
            },
        )
        .unwrap();
    }

    #[test]
    fn threshold_mapping_matches_spec() {
        assert!((threshold_for_sensitivity(1) - 0.70).abs() < 1e-6);
        assert!((threshold_for_sensitivity(10) - 0.07).abs() < 1e-6);
    }

    #[test]
    fn values_stay_in_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocal.wav");
        tone_wav(path.to_str().unwrap(), 1000.0, 22050, 1.0);

        let result = analyze_vocal(path.to_str().unwrap(), 10, 12).unwrap();
        for r in 0..result.intensity.rows() {
            for v in result.intensity.row(r) {
                assert!((0.0..=1.0).contains(v), "{v} out of range");
            }
        }
    }

    #[test]
    fn tone_boosts_its_own_band_more_than_distant_bands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocal.wav");
        tone_wav(path.to_str().unwrap(), 1000.0, 22050, 1.0);

        let result = analyze_vocal(path.to_str().unwrap(), 10, 12).unwrap();
        let plan = &result.band_plan;
        let target_band = plan
            .bands
            .iter()
            .position(|b| b.low_hz <= 1000.0 && 1000.0 < b.high_hz)
            .expect("1kHz must fall in some band");

        let target_mean: f32 = {
            let row = result.intensity.row(target_band);
            row.iter().sum::<f32>() / row.len() as f32
        };

        for (b, band) in plan.bands.iter().enumerate() {
            if b == target_band {
                continue;
            }
            if band.center_hz < 500.0 || band.center_hz > 2000.0 {
                let row = result.intensity.row(b);
                let mean = row.iter().sum::<f32>() / row.len() as f32;
                assert!(mean <= target_mean + 1e-6);
            }
        }
    }
}
