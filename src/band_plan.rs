//! Band Planner: logarithmic frequency band edges and their FFT bin groups.
//!
//! Pure and deterministic — shared by every analyzer and the spectral
//! processor so that band partitions line up across differing sample rates.

use serde::{Deserialize, Serialize};

use crate::constants::{band_range_high_hz, BAND_RANGE_LOW_HZ};

/// A single frequency band: index, edges, and geometric-mean center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandDefinition {
    pub index: usize,
    pub low_hz: f32,
    pub high_hz: f32,
    pub center_hz: f32,
}

/// N band definitions plus, for a given FFT size, the bin-index groups
/// per band.
#[derive(Debug, Clone)]
pub struct BandPlan {
    pub bands: Vec<BandDefinition>,
    /// `bin_groups[b]` is the sorted list of FFT bin indices assigned to band `b`.
    pub bin_groups: Vec<Vec<usize>>,
}

/// Returns `n+1` geometrically-spaced edges from `BAND_RANGE_LOW_HZ` to
/// `min(BAND_RANGE_HIGH_HZ, sample_rate/2)`.
pub fn edges(n: usize, sample_rate: u32) -> Vec<f32> {
    let high = band_range_high_hz(sample_rate);
    let low = BAND_RANGE_LOW_HZ;
    let ratio = (high / low).powf(1.0 / n as f32);
    (0..=n).map(|i| low * ratio.powi(i as i32)).collect()
}

/// For each band `b` in `[0, edges.len()-1)`, the indices `i` such that
/// `freq(i) = i * sample_rate / fft_size` falls in `[edges[b], edges[b+1])`.
/// A band may legally come back empty.
pub fn bin_groups(fft_size: usize, sample_rate: u32, edges: &[f32]) -> Vec<Vec<usize>> {
    let n_bands = edges.len().saturating_sub(1);
    let mut groups = vec![Vec::new(); n_bands];
    let n_bins = fft_size / 2 + 1;
    for i in 0..n_bins {
        let freq = i as f32 * sample_rate as f32 / fft_size as f32;
        for b in 0..n_bands {
            if freq >= edges[b] && freq < edges[b + 1] {
                groups[b].push(i);
                break;
            }
        }
    }
    groups
}

/// Builds `N` band definitions from `N+1` edges, rounding edges and
/// centers to 0.1 Hz for persistence.
pub fn build_band_definitions(edges: &[f32]) -> Vec<BandDefinition> {
    let n = edges.len().saturating_sub(1);
    (0..n)
        .map(|b| {
            let low = edges[b];
            let high = edges[b + 1];
            let center = (low * high).sqrt();
            BandDefinition {
                index: b,
                low_hz: round_1dp(low),
                high_hz: round_1dp(high),
                center_hz: round_1dp(center),
            }
        })
        .collect()
}

fn round_1dp(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

impl BandPlan {
    /// Builds a complete plan for `n` bands, `sample_rate`, and `fft_size`.
    pub fn build(n: usize, sample_rate: u32, fft_size: usize) -> Self {
        let e = edges(n, sample_rate);
        let bands = build_band_definitions(&e);
        let bin_groups = bin_groups(fft_size, sample_rate, &e);
        BandPlan { bands, bin_groups }
    }

    pub fn n_bands(&self) -> usize {
        self.bands.len()
    }

    /// Rebuilds this plan's bin groups for a different `sample_rate`/
    /// `fft_size`, keeping its existing band definitions (Hz edges and
    /// centers) unchanged. Used to carry a persisted analysis band plan
    /// onto the processing audio's own STFT grid without letting the two
    /// stages disagree on band count or edges.
    pub fn rebin(&self, sample_rate: u32, fft_size: usize) -> BandPlan {
        let edges = band_edges_from_definitions(&self.bands);
        let bin_groups = bin_groups(fft_size, sample_rate, &edges);
        BandPlan {
            bands: self.bands.clone(),
            bin_groups,
        }
    }
}

/// Recovers the `n+1` edges implied by `n` contiguous band definitions.
fn band_edges_from_definitions(bands: &[BandDefinition]) -> Vec<f32> {
    let mut edges = Vec::with_capacity(bands.len() + 1);
    if let Some(first) = bands.first() {
        edges.push(first.low_hz);
        for b in bands {
            edges.push(b.high_hz);
        }
    }
    edges
}
