//! Shared STFT/ISTFT engine.
//!
//! A full complex FFT is used rather than a real-to-complex half-spectrum
//! transform: each time-domain frame is windowed, packed into
//! `Complex<f32>` with zero imaginary part, and transformed in full. Gain is
//! only ever applied to bins `0..=n_fft/2`; the mirrored upper half is
//! restored by conjugate symmetry before the inverse transform so the
//! result stays real-valued. This mirrors the approach in this codebase's
//! existing streaming denoiser engine, adapted from a ring-buffered
//! sample-at-a-time interface to fixed-length batch buffers.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// A configured STFT/ISTFT engine for one `(n_fft, hop)` pair.
pub struct StftEngine {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
}

impl StftEngine {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);
        let ifft = planner.plan_fft_inverse(n_fft);
        StftEngine {
            n_fft,
            hop,
            window: hann_window(n_fft),
            fft,
            ifft,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of Nyquist-inclusive bins: `n_fft/2 + 1`.
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Number of STFT frames for a signal of `num_samples` samples,
    /// per §4.6: `1 + (num_samples - n_fft) / hop`, clamped to `>= 1`.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if num_samples == 0 {
            return 1;
        }
        if num_samples <= self.n_fft {
            return 1;
        }
        1 + (num_samples - self.n_fft) / self.hop
    }

    /// Frame timestamps in seconds: `i * hop / sample_rate`.
    pub fn frame_times(&self, num_frames: usize, sample_rate: u32) -> Vec<f32> {
        (0..num_frames)
            .map(|i| (i * self.hop) as f32 / sample_rate as f32)
            .collect()
    }

    /// Forward transform: one full-length complex spectrum per frame,
    /// zero-padding the signal past its end.
    pub fn forward(&self, signal: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let frames = self.num_frames(signal.len());
        let mut out = Vec::with_capacity(frames);
        for f in 0..frames {
            let start = f * self.hop;
            let mut buf: Vec<Complex<f32>> = (0..self.n_fft)
                .map(|i| {
                    let sample = signal.get(start + i).copied().unwrap_or(0.0);
                    Complex::new(sample * self.window[i], 0.0)
                })
                .collect();
            self.fft.process(&mut buf);
            out.push(buf);
        }
        out
    }

    /// Magnitudes of the Nyquist-inclusive half spectrum, per frame.
    pub fn magnitudes(&self, spectra: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
        let n_bins = self.n_bins();
        spectra
            .iter()
            .map(|frame| frame[..n_bins].iter().map(|c| c.norm()).collect())
            .collect()
    }

    /// Inverse transform with overlap-add, constrained to `output_len`
    /// samples. `spectra` must hold full-length (`n_fft`) complex frames
    /// whose bins `0..=n_fft/2` already carry the desired gain; this
    /// function restores conjugate symmetry before each inverse FFT.
    pub fn inverse(&self, spectra: &[Vec<Complex<f32>>], output_len: usize) -> Vec<f32> {
        let mut acc = vec![0.0f32; output_len];
        let mut win_power = vec![0.0f32; output_len];

        for (f, frame) in spectra.iter().enumerate() {
            let mut buf = frame.clone();
            restore_conjugate_symmetry(&mut buf);
            self.ifft.process(&mut buf);
            let norm = 1.0 / self.n_fft as f32;

            let start = f * self.hop;
            for i in 0..self.n_fft {
                let pos = start + i;
                if pos >= output_len {
                    break;
                }
                acc[pos] += buf[i].re * norm * self.window[i];
                win_power[pos] += self.window[i] * self.window[i];
            }
        }

        for i in 0..output_len {
            if win_power[i] > 1e-12 {
                acc[i] /= win_power[i];
            }
        }
        acc
    }
}

fn hann_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / (n - 1) as f32).cos())
        .collect()
}

/// Given a buffer whose bins `0..=n/2` hold the desired (possibly
/// gain-modified) spectrum, fill bins `n/2+1..n` with the complex
/// conjugate mirror so the inverse FFT produces a real-valued signal.
fn restore_conjugate_symmetry(buf: &mut [Complex<f32>]) {
    let n = buf.len();
    let nyq = n / 2;
    for i in 1..nyq {
        buf[n - i] = buf[i].conj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_frames_matches_formula() {
        let engine = StftEngine::new(2048, 512);
        assert_eq!(engine.num_frames(2048), 1);
        assert_eq!(engine.num_frames(2048 + 512), 2);
        assert_eq!(engine.num_frames(100), 1);
    }

    #[test]
    fn round_trip_silence_is_silence() {
        let engine = StftEngine::new(2048, 512);
        let signal = vec![0.0f32; 22050];
        let spectra = engine.forward(&signal);
        let out = engine.inverse(&spectra, signal.len());
        assert_eq!(out.len(), signal.len());
        for s in out {
            assert!(s.abs() < 1e-5);
        }
    }

    #[test]
    fn round_trip_preserves_length_and_shape() {
        let engine = StftEngine::new(2048, 512);
        let n = 22050;
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 22050.0).sin() * 0.3)
            .collect();
        let spectra = engine.forward(&signal);
        let out = engine.inverse(&spectra, signal.len());
        assert_eq!(out.len(), signal.len());

        // Perfect reconstruction (COLA Hann/2048/512) away from the very
        // edges, within float tolerance.
        let mut max_err = 0.0f32;
        for i in (engine.n_fft())..(n - engine.n_fft()) {
            max_err = max_err.max((out[i] - signal[i]).abs());
        }
        assert!(max_err < 1e-3, "max reconstruction error {max_err}");
    }
}
