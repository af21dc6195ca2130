//! Post Conditioner (§4.7): intensity-modulated stereo widening, soft
//! clip guard, and optional peak/loudness normalization. Three pure,
//! stateless transforms applied in sequence to the time-domain signal.

use crate::audio_io::AudioBuffer;
use crate::config::Normalization;
use crate::constants::{CLIP_CEILING, EPS, HOP};
use crate::matrix::Matrix2D;

const WIDEN_AMOUNT: f32 = 1.3;
const PEAK_TARGET: f32 = 0.95;
const LOUDNESS_TARGET_DB: f32 = -16.0;

/// Intensity-modulated mid/side stereo widening. No-op on non-stereo
/// buffers. `bin_gain` is the `(K, Fa)` matrix the Spectral Processor
/// applied, used to derive the per-frame widen envelope.
pub fn stereo_widen(buffer: &mut AudioBuffer, bin_gain: &Matrix2D) {
    if buffer.num_channels() != 2 {
        return;
    }

    let num_frames = bin_gain.cols();
    if num_frames == 0 {
        return;
    }

    let mut m = vec![0.0f32; num_frames];
    for f in 0..num_frames {
        let mut max_bin = f32::MIN;
        for bin in 0..bin_gain.rows() {
            max_bin = max_bin.max(bin_gain.get(bin, f));
        }
        m[f] = max_bin;
    }
    let m_max = m.iter().cloned().fold(f32::MIN, f32::max);

    let w: Vec<f32> = m
        .iter()
        .map(|&v| ((v - 1.0) / (m_max - 1.0 + EPS)).clamp(0.0, 1.0))
        .collect();

    let frame_times: Vec<f32> = (0..num_frames).map(|f| (f * HOP) as f32).collect();

    let n = buffer.num_samples();
    let sample_positions: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let w_sample = upsample_linear(&frame_times, &w, &sample_positions);

    let l = buffer.channels[0].clone();
    let r = buffer.channels[1].clone();
    for i in 0..n {
        let mid = (l[i] + r[i]) / 2.0;
        let side = (l[i] - r[i]) / 2.0 * WIDEN_AMOUNT;
        let wet_l = mid + side;
        let wet_r = mid - side;
        let wt = w_sample[i];
        buffer.channels[0][i] = l[i] * (1.0 - wt) + wet_l * wt;
        buffer.channels[1][i] = r[i] * (1.0 - wt) + wet_r * wt;
    }
}

fn upsample_linear(xs: &[f32], ys: &[f32], targets: &[f32]) -> Vec<f32> {
    if xs.is_empty() {
        return vec![0.0; targets.len()];
    }
    targets
        .iter()
        .map(|&t| {
            if t <= xs[0] {
                return ys[0];
            }
            if t >= xs[xs.len() - 1] {
                return ys[ys.len() - 1];
            }
            let idx = xs.partition_point(|&v| v < t).max(1);
            let (x0, x1) = (xs[idx - 1], xs[idx]);
            let (y0, y1) = (ys[idx - 1], ys[idx]);
            let frac = (t - x0) / (x1 - x0).max(f32::EPSILON);
            y0 + (y1 - y0) * frac
        })
        .collect()
}

/// Soft-knee clip guard: samples within `CLIP_CEILING` pass through
/// unchanged; samples beyond it are compressed toward `1.0` via `tanh`.
pub fn soft_clip_guard(buffer: &mut AudioBuffer) {
    let c = CLIP_CEILING;
    for channel in &mut buffer.channels {
        for x in channel.iter_mut() {
            let abs = x.abs();
            if abs > c {
                let sign = x.signum();
                *x = sign * (c + (1.0 - c) * ((abs - c) / (1.0 - c)).tanh());
            }
        }
    }
}

/// Mutually exclusive peak/loudness/none normalization.
pub fn normalize(buffer: &mut AudioBuffer, mode: Normalization) {
    match mode {
        Normalization::None => {}
        Normalization::Peak => {
            let peak = max_abs(buffer);
            if peak > 0.0 {
                scale(buffer, PEAK_TARGET / peak);
            }
        }
        Normalization::Loudness => {
            let r = overall_rms(buffer);
            if r > 0.0 {
                let target_rms = 10f32.powf(LOUDNESS_TARGET_DB / 20.0);
                scale(buffer, target_rms / r);
                let peak = max_abs(buffer);
                if peak > PEAK_TARGET {
                    scale(buffer, PEAK_TARGET / peak);
                }
            }
        }
    }
}

fn max_abs(buffer: &AudioBuffer) -> f32 {
    buffer
        .channels
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f32, |acc, &v| acc.max(v.abs()))
}

fn overall_rms(buffer: &AudioBuffer) -> f32 {
    let mut sum_sq = 0.0f64;
    let mut count = 0usize;
    for channel in &buffer.channels {
        for &v in channel {
            sum_sq += (v as f64) * (v as f64);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        ((sum_sq / count as f64).sqrt()) as f32
    }
}

fn scale(buffer: &mut AudioBuffer, factor: f32) {
    for channel in &mut buffer.channels {
        for v in channel.iter_mut() {
            *v *= factor;
        }
    }
}
