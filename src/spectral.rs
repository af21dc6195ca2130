//! Spectral Processor (§4.6): STFT → per-bin complex gain → ISTFT,
//! length-preserving, one channel at a time.

use crate::audio_io::AudioBuffer;
use crate::band_plan::BandPlan;
use crate::constants::{HOP, N_FFT};
use crate::matrix::Matrix2D;
use crate::stft::StftEngine;

/// Broadcasts a `(N, F')` band gain matrix to a `(K, F')` bin gain matrix,
/// where `K = n_bins`. Bins outside any band default to `1.0`. This is the
/// bridge from coarse bands to fine bins.
pub fn build_bin_gain(band_plan: &BandPlan, gain_matrix: &Matrix2D, n_bins: usize) -> Matrix2D {
    let cols = gain_matrix.cols();
    let mut bin_gain = Matrix2D::filled(n_bins, cols, 1.0);
    for (b, group) in band_plan.bin_groups.iter().enumerate() {
        let band_row = gain_matrix.row(b);
        for &bin in group {
            bin_gain.row_mut(bin).copy_from_slice(band_row);
        }
    }
    bin_gain
}

/// Applies `gain_matrix` (already interpolated onto this audio's own
/// frame grid) to every channel of `buffer` via STFT, returning the
/// processed audio and the `(K, Fa)` bin gain matrix actually used (the
/// Post Conditioner needs it to drive stereo widening).
pub fn process_audio(buffer: &AudioBuffer, band_plan: &BandPlan, gain_matrix: &Matrix2D) -> (AudioBuffer, Matrix2D) {
    let engine = StftEngine::new(N_FFT, HOP);
    let n_bins = engine.n_bins();
    let channel_len = buffer.num_samples();
    let fa = engine.num_frames(channel_len);

    let bin_gain = build_bin_gain(band_plan, gain_matrix, n_bins).resized_cols(fa, 1.0);

    let mut out_channels = Vec::with_capacity(buffer.num_channels());
    for channel in &buffer.channels {
        let mut spectra = engine.forward(channel);
        for (f, frame) in spectra.iter_mut().enumerate() {
            for bin in 0..n_bins {
                let g = bin_gain.get(bin, f);
                frame[bin] *= g;
            }
        }
        out_channels.push(engine.inverse(&spectra, channel_len));
    }

    (
        AudioBuffer {
            channels: out_channels,
            sample_rate: buffer.sample_rate,
        },
        bin_gain,
    )
}
