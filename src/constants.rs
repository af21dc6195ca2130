//! Fixed constants shared by every analysis and processing stage.
//!
//! None of these are user-tunable; they are part of the wire contract
//! between analyzer and processor (identical band plans, identical STFT
//! grids) and changing them invalidates any persisted analysis artifact.

/// Sample rate analysis is always performed at, regardless of the
/// reference/instrumental's native rate.
pub const ANALYSIS_SR: u32 = 22050;

/// STFT window size in samples.
pub const N_FFT: usize = 2048;

/// STFT hop size in samples.
pub const HOP: usize = 512;

/// Upper bound on mix-mode gain ratios.
pub const MAX_GAIN: f32 = 10.0;

/// Small constant guarding divisions against zero.
pub const EPS: f32 = 1e-10;

/// Lower edge of the analyzed band range, in Hz.
pub const BAND_RANGE_LOW_HZ: f32 = 60.0;

/// Upper bound on the analyzed band range, in Hz (before clamping to
/// the Nyquist frequency of the signal in question).
pub const BAND_RANGE_HIGH_HZ: f32 = 16000.0;

/// Soft clip ceiling applied by the post conditioner.
pub const CLIP_CEILING: f32 = 0.98;

/// Returns the upper edge of the analyzed band range for a given sample
/// rate: `min(BAND_RANGE_HIGH_HZ, SR/2)`.
pub fn band_range_high_hz(sample_rate: u32) -> f32 {
    BAND_RANGE_HIGH_HZ.min(sample_rate as f32 / 2.0)
}
