//! Top-level orchestration tying the components together: analyze →
//! persist, interpolate → gain → spectral → post conditioner → write.

use std::path::Path;

use log::info;

use crate::analysis::mix::analyze_mix;
use crate::analysis::vocal::analyze_vocal;
use crate::analysis::AnalysisResult;
use crate::artifacts::{load_analysis, persist_analysis};
use crate::audio_io::{load_wav, write_wav};
use crate::config::{AnalysisConfig, Mode, ProcessConfig};
use crate::error::{RestoreError, RestoreResult};
use crate::gain::build_gain_matrix;
use crate::interpolate::interpolate;
use crate::post::{normalize, soft_clip_guard, stereo_widen};
use crate::progress::ProgressReporter;
use crate::spectral::process_audio;

/// Runs the Vocal or Mix Analyzer (selected by `config.mode`) and
/// persists the result to `session_dir`.
pub fn analyze_and_persist(
    session_dir: &Path,
    reference_path: &str,
    instrumental_path: Option<&str>,
    config: AnalysisConfig,
    progress: &ProgressReporter,
) -> RestoreResult<AnalysisResult> {
    let config = config.validate()?;
    progress.report(5);

    let result = match config.mode {
        Mode::Vocal => {
            info!("running vocal analyzer on {reference_path}");
            analyze_vocal(reference_path, config.sensitivity, config.band_count as usize)?
        }
        Mode::Mix => {
            let instrumental_path = instrumental_path.ok_or_else(|| RestoreError::InvalidParameter {
                name: "instrumental_path",
                value: "None".to_string(),
                reason: "mix mode requires an instrumental reference".to_string(),
            })?;
            info!("running mix analyzer on {reference_path} / {instrumental_path}");
            analyze_mix(reference_path, instrumental_path, config.band_count as usize)?
        }
    };
    progress.report(45);

    persist_analysis(session_dir, &result)?;
    progress.report(100);
    Ok(result)
}

/// Loads a persisted analysis from `session_dir`; if artifacts are
/// missing, recomputes from `reference_path` (cache-miss policy, §7). If
/// `reference_path` is also unavailable, propagates
/// `RestoreError::ReanalyzeRequired`.
pub fn load_or_reanalyze(
    session_dir: &Path,
    reference_path: Option<&str>,
    instrumental_path: Option<&str>,
    config: AnalysisConfig,
    progress: &ProgressReporter,
) -> RestoreResult<AnalysisResult> {
    match load_analysis(session_dir) {
        Ok(result) => Ok(result),
        Err(RestoreError::ArtifactMissing { .. }) => {
            let reference_path = reference_path.ok_or(RestoreError::ReanalyzeRequired)?;
            if !Path::new(reference_path).exists() {
                return Err(RestoreError::ReanalyzeRequired);
            }
            analyze_and_persist(session_dir, reference_path, instrumental_path, config, progress)
        }
        Err(other) => Err(other),
    }
}

/// Runs the Spectral Processor and Post Conditioner over `instrumental_path`
/// using a previously computed `analysis`, writing the result to `output_path`
/// (always a WAV file; container transcoding is an external collaborator's job).
pub fn process(
    instrumental_path: &str,
    analysis: &AnalysisResult,
    config: ProcessConfig,
    output_path: &str,
    progress: &ProgressReporter,
) -> RestoreResult<()> {
    let config = config.validate()?;
    progress.report(5);

    let buffer = load_wav(instrumental_path)?;
    progress.report(10);

    // Band count/definitions are driven by the persisted analysis, not by
    // `config.band_count`: the intensity matrix and gain matrix must share
    // exactly the analysis's row count, or `build_gain_matrix`/
    // `build_bin_gain` index out of bounds. `config.band_count` is only
    // accepted here as a caller-facing consistency check (mirroring the
    // band_count a caller would have used at analyze time); it never drives
    // band construction itself.
    let n_bands_analysis = analysis.band_plan.n_bands();
    if config.band_count as usize != n_bands_analysis {
        return Err(RestoreError::InvalidParameter {
            name: "band_count",
            value: config.band_count.to_string(),
            reason: format!(
                "must match the persisted analysis's band count ({n_bands_analysis}); re-analyze to change it"
            ),
        });
    }
    let band_plan = analysis.band_plan.rebin(buffer.sample_rate, crate::constants::N_FFT);

    let engine = crate::stft::StftEngine::new(crate::constants::N_FFT, crate::constants::HOP);
    let f_prime = engine.num_frames(buffer.num_samples());
    let target_times = engine.frame_times(f_prime, buffer.sample_rate);
    progress.report(15);

    let interpolated = interpolate(&analysis.intensity, &analysis.frame_times, &target_times, config.mode);
    progress.report(20);

    let gain_matrix = build_gain_matrix(&interpolated, config.eq_level, config.mode, &band_plan.bands);
    progress.report(45);

    let (mut processed, bin_gain) = process_audio(&buffer, &band_plan, &gain_matrix);
    progress.report(70);

    if config.stereo_widen {
        stereo_widen(&mut processed, &bin_gain);
    }
    progress.report(80);

    soft_clip_guard(&mut processed);
    normalize(&mut processed, config.normalization);
    progress.report(90);

    write_wav(output_path, &processed)?;
    progress.report(95);

    progress.report(100);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_io::AudioBuffer;
    use crate::config::{AnalysisConfig, Normalization};
    use std::f32::consts::PI;

    fn write_tone(path: &str, freq: f32, sr: u32, seconds: f32, channels: usize) {
        let n = (sr as f32 * seconds) as usize;
        let mono: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sr as f32).sin() * 0.3)
            .collect();
        write_wav(
            path,
            &AudioBuffer {
                channels: vec![mono; channels],
                sample_rate: sr,
            },
        )
        .unwrap();
    }

    fn write_silence(path: &str, sr: u32, seconds: f32, channels: usize) {
        let n = (sr as f32 * seconds) as usize;
        write_wav(
            path,
            &AudioBuffer {
                channels: vec![vec![0.0f32; n]; channels],
                sample_rate: sr,
            },
        )
        .unwrap();
    }

    // S1: silence in, silence out.
    #[test]
    fn silence_in_silence_out() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let reference = dir.path().join("ref.wav");
        let out = dir.path().join("out.wav");
        write_silence(inst.to_str().unwrap(), 44100, 5.0, 2);
        write_silence(reference.to_str().unwrap(), 44100, 5.0, 2);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            reference.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();

        process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 5,
                band_count: 12,
                stereo_widen: false,
                normalization: Normalization::None,
            },
            out.to_str().unwrap(),
            &progress,
        )
        .unwrap();

        let output = load_wav(out.to_str().unwrap()).unwrap();
        for ch in &output.channels {
            for &s in ch {
                assert!(s.abs() < 1e-6);
            }
        }
    }

    // S3: eq_level = 0 is bypass.
    #[test]
    fn bypass_at_eq_level_zero_matches_input() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let reference = dir.path().join("ref.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 300.0, 44100, 2.0, 1);
        write_tone(reference.to_str().unwrap(), 300.0, 44100, 2.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            reference.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();

        process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 0,
                band_count: 12,
                stereo_widen: false,
                normalization: Normalization::None,
            },
            out.to_str().unwrap(),
            &progress,
        )
        .unwrap();

        let input = load_wav(inst.to_str().unwrap()).unwrap();
        let output = load_wav(out.to_str().unwrap()).unwrap();
        assert_eq!(input.num_samples(), output.num_samples());

        let n_fft = crate::constants::N_FFT;
        let n = input.num_samples();
        let mut max_err = 0.0f32;
        for i in n_fft..(n - n_fft) {
            max_err = max_err.max((input.channels[0][i] - output.channels[0][i]).abs());
        }
        assert!(max_err < 1e-3, "max error {max_err}");
    }

    // S2 / property 4: identical mix and instrumental yield unchanged output.
    #[test]
    fn identical_reference_and_instrumental_yield_unchanged_output() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 440.0, 44100, 2.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            inst.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();

        process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 10,
                band_count: 12,
                stereo_widen: false,
                normalization: Normalization::None,
            },
            out.to_str().unwrap(),
            &progress,
        )
        .unwrap();

        let input = load_wav(inst.to_str().unwrap()).unwrap();
        let output = load_wav(out.to_str().unwrap()).unwrap();
        let n_fft = crate::constants::N_FFT;
        let n = input.num_samples();
        let mut max_err = 0.0f32;
        for i in n_fft..(n - n_fft) {
            max_err = max_err.max((input.channels[0][i] - output.channels[0][i]).abs());
        }
        assert!(max_err < 1e-3, "max error {max_err}");
    }

    // S5: sample-rate mismatch between analysis (always 22050) and
    // instrumental produces no NaNs and preserves length.
    #[test]
    fn rate_mismatch_produces_no_nans_and_preserves_length() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let reference = dir.path().join("ref.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 300.0, 48000, 2.0, 2);
        write_tone(reference.to_str().unwrap(), 300.0, 22050, 2.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            reference.to_str().unwrap(),
            None,
            AnalysisConfig {
                mode: Mode::Vocal,
                sensitivity: 8,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();

        process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Vocal,
                eq_level: 8,
                band_count: 12,
                stereo_widen: true,
                normalization: Normalization::Peak,
            },
            out.to_str().unwrap(),
            &progress,
        )
        .unwrap();

        let input = load_wav(inst.to_str().unwrap()).unwrap();
        let output = load_wav(out.to_str().unwrap()).unwrap();
        assert_eq!(input.num_samples(), output.num_samples());
        for ch in &output.channels {
            for &s in ch {
                assert!(s.is_finite());
            }
        }
    }

    #[test]
    fn progress_is_monotonic_across_a_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 440.0, 44100, 1.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            inst.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();
        assert_eq!(progress.value(), 100);

        let progress = ProgressReporter::new();
        process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 5,
                band_count: 12,
                stereo_widen: false,
                normalization: Normalization::Peak,
            },
            out.to_str().unwrap(),
            &progress,
        )
        .unwrap();
        assert_eq!(progress.value(), 100);
    }

    #[test]
    fn missing_artifacts_without_reference_requires_reanalysis() {
        let dir = tempfile::tempdir().unwrap();
        let progress = ProgressReporter::new();
        let result = load_or_reanalyze(
            dir.path(),
            None,
            None,
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        );
        assert!(matches!(result, Err(RestoreError::ReanalyzeRequired)));
    }

    // A `process` band_count that disagrees with the band_count used at
    // analyze time must error cleanly rather than panic on a row/band
    // count mismatch inside the gain builder or spectral processor.
    #[test]
    fn process_rejects_band_count_mismatched_with_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 440.0, 44100, 1.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            inst.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 12,
            },
            &progress,
        )
        .unwrap();

        let result = process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 5,
                band_count: 20, // analyzed with 12, not 20
                stereo_widen: false,
                normalization: Normalization::None,
            },
            out.to_str().unwrap(),
            &progress,
        );
        assert!(matches!(result, Err(RestoreError::InvalidParameter { name: "band_count", .. })));
    }

    // Processing audio at a different sample rate than analysis (always
    // 22050 Hz) must still rebin the persisted band definitions onto the
    // processing audio's own grid rather than reusing analysis-SR bins.
    #[test]
    fn process_rebins_persisted_bands_onto_processing_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let inst = dir.path().join("inst.wav");
        let reference = dir.path().join("ref.wav");
        let out = dir.path().join("out.wav");
        write_tone(inst.to_str().unwrap(), 1000.0, 48000, 1.0, 1);
        write_tone(reference.to_str().unwrap(), 1000.0, 22050, 1.0, 1);

        let progress = ProgressReporter::new();
        let analysis = analyze_and_persist(
            dir.path(),
            reference.to_str().unwrap(),
            Some(inst.to_str().unwrap()),
            AnalysisConfig {
                mode: Mode::Mix,
                sensitivity: 5,
                band_count: 16,
            },
            &progress,
        )
        .unwrap();
        assert_eq!(analysis.band_plan.n_bands(), 16);

        let result = process(
            inst.to_str().unwrap(),
            &analysis,
            ProcessConfig {
                mode: Mode::Mix,
                eq_level: 5,
                band_count: 16,
                stereo_widen: false,
                normalization: Normalization::None,
            },
            out.to_str().unwrap(),
            &progress,
        );
        assert!(result.is_ok());

        let output = load_wav(out.to_str().unwrap()).unwrap();
        for &s in &output.channels[0] {
            assert!(s.is_finite());
        }
    }
}
