//! Minimal WAV decode/encode and the small resampling helper analysis needs
//! to bring an arbitrary-rate reference down to `ANALYSIS_SR`.
//!
//! Decoding of non-WAV formats is an external media library's job per
//! scope; this module covers exactly the WAV path the test scenarios and
//! the core pipeline need.

use crate::error::{RestoreError, RestoreResult};

/// Decoded audio: one `Vec<f32>` per channel, each in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Downmix to mono by averaging channels.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels.len() == 1 {
            return self.channels[0].clone();
        }
        let n = self.num_samples();
        let mut out = vec![0.0f32; n];
        for ch in &self.channels {
            for i in 0..n {
                out[i] += ch[i];
            }
        }
        let scale = 1.0 / self.channels.len() as f32;
        for s in &mut out {
            *s *= scale;
        }
        out
    }
}

pub fn load_wav(path: &str) -> RestoreResult<AudioBuffer> {
    let reader = hound::WavReader::open(path).map_err(|e| RestoreError::Decode {
        path: path.to_string(),
        source: e,
    })?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RestoreError::Decode {
                path: path.to_string(),
                source: e,
            })?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| RestoreError::Decode {
                    path: path.to_string(),
                    source: e,
                })?
        }
    };

    if interleaved.is_empty() {
        return Err(RestoreError::EmptyAudio {
            path: path.to_string(),
        });
    }

    let mut out_channels = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks(channels) {
        for (c, &s) in frame.iter().enumerate() {
            out_channels[c].push(s);
        }
    }

    Ok(AudioBuffer {
        channels: out_channels,
        sample_rate,
    })
}

pub fn write_wav(path: &str, buffer: &AudioBuffer) -> RestoreResult<()> {
    let spec = hound::WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let n = buffer.num_samples();
    for i in 0..n {
        for ch in &buffer.channels {
            writer.write_sample(ch[i])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Linear-interpolation resample from `from_sr` to `to_sr`. Used only to
/// bring analysis inputs to `ANALYSIS_SR`; the processing path works at
/// the instrumental's native rate and never resamples audio itself.
pub fn resample_linear(signal: &[f32], from_sr: u32, to_sr: u32) -> Vec<f32> {
    if from_sr == to_sr || signal.is_empty() {
        return signal.to_vec();
    }
    let ratio = from_sr as f64 / to_sr as f64;
    let out_len = ((signal.len() as f64) / ratio).round() as usize;
    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let i0 = src_pos.floor() as usize;
            let frac = (src_pos - i0 as f64) as f32;
            let s0 = signal.get(i0).copied().unwrap_or(0.0);
            let s1 = signal.get(i0 + 1).copied().unwrap_or(s0);
            s0 + (s1 - s0) * frac
        })
        .collect()
}
