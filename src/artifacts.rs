//! Persisted analysis artifacts (§6, §7): the intensity matrix, frame-time
//! grid, band definitions, and mode marker that an analyze call produces
//! and a later process call consumes. Backed by the matrix blob format
//! (§6) for numeric payloads and plain JSON for small structured records.

use std::path::{Path, PathBuf};

use crate::analysis::AnalysisResult;
use crate::band_plan::{BandDefinition, BandPlan};
use crate::config::Mode;
use crate::constants::{ANALYSIS_SR, N_FFT};
use crate::error::{RestoreError, RestoreResult};
use crate::matrix_store::{read_matrix, read_vector, write_matrix, write_vector};

pub struct ArtifactPaths {
    pub intensity: PathBuf,
    pub frame_times: PathBuf,
    pub bands: PathBuf,
    pub mode: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        ArtifactPaths {
            intensity: dir.join("intensity_matrix.vxrm"),
            frame_times: dir.join("frame_times.vxrm"),
            bands: dir.join("band_defs.json"),
            mode: dir.join("mode.txt"),
        }
    }

    fn all_exist(&self) -> bool {
        self.intensity.exists() && self.frame_times.exists() && self.bands.exists() && self.mode.exists()
    }
}

/// Persists a completed analysis to `dir`, creating it if necessary.
pub fn persist_analysis(dir: &Path, result: &AnalysisResult) -> RestoreResult<()> {
    std::fs::create_dir_all(dir)?;
    let paths = ArtifactPaths::in_dir(dir);

    write_matrix(path_str(&paths.intensity)?, &result.intensity)?;
    write_vector(path_str(&paths.frame_times)?, &result.frame_times)?;

    let json = serde_json::to_string_pretty(&result.band_plan.bands)
        .map_err(|e| RestoreError::CorruptBlob { reason: e.to_string() })?;
    std::fs::write(&paths.bands, json)?;
    std::fs::write(&paths.mode, result.mode.as_token())?;
    Ok(())
}

/// Loads a previously persisted analysis from `dir`. Returns
/// `RestoreError::ArtifactMissing` if any artifact file is absent —
/// callers implementing the cache-miss policy of §7 should catch that and
/// recompute from the stored reference, falling back to
/// `RestoreError::ReanalyzeRequired` if the reference is gone too.
pub fn load_analysis(dir: &Path) -> RestoreResult<AnalysisResult> {
    let paths = ArtifactPaths::in_dir(dir);
    if !paths.all_exist() {
        return Err(RestoreError::ArtifactMissing {
            artifact: dir.display().to_string(),
        });
    }

    let intensity = read_matrix(path_str(&paths.intensity)?)?;
    let frame_times = read_vector(path_str(&paths.frame_times)?)?;

    let bands_json = std::fs::read_to_string(&paths.bands)?;
    let bands: Vec<BandDefinition> =
        serde_json::from_str(&bands_json).map_err(|e| RestoreError::CorruptBlob { reason: e.to_string() })?;

    let mode_token = std::fs::read_to_string(&paths.mode)?;
    let mode = Mode::from_token(mode_token.trim())?;

    let n_bands = bands.len();
    let bin_groups = crate::band_plan::bin_groups(N_FFT, ANALYSIS_SR, &crate::band_plan::edges(n_bands, ANALYSIS_SR));
    let band_plan = BandPlan { bands, bin_groups };

    Ok(AnalysisResult {
        intensity,
        frame_times,
        band_plan,
        mode,
    })
}

fn path_str(path: &Path) -> RestoreResult<&str> {
    path.to_str().ok_or_else(|| RestoreError::CorruptBlob {
        reason: format!("non-utf8 path: {}", path.display()),
    })
}
