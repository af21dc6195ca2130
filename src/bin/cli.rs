//! Command-line driver for the analyze/process pipeline.
//!
//! Usage:
//!   vox-restore analyze --mode vocal --reference ref.wav --sensitivity 8 \
//!       --bands 12 --session session_dir
//!   vox-restore analyze --mode mix --reference mix.wav --instrumental inst.wav \
//!       --bands 16 --session session_dir
//!   vox-restore process --instrumental inst.wav --session session_dir \
//!       --eq-level 7 --bands 12 --mode mix --output out.wav \
//!       [--stereo-widen] [--normalization peak|loudness|none]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vox_restore::config::{AnalysisConfig, Mode, Normalization, ProcessConfig};
use vox_restore::{analyze_and_persist, process, ProgressReporter};

#[derive(Parser)]
#[command(name = "vox-restore", about = "Offline multiband spectral restoration for devocalized audio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a reference (vocal or mix) and persist the intensity matrix
    Analyze {
        /// "vocal" or "mix"
        #[arg(long)]
        mode: String,
        /// Reference WAV: isolated vocal (vocal mode) or the original mix (mix mode)
        #[arg(long)]
        reference: PathBuf,
        /// Instrumental WAV, required for mix mode
        #[arg(long)]
        instrumental: Option<PathBuf>,
        /// Vocal-mode detection sensitivity, 1-10
        #[arg(long, default_value_t = 5)]
        sensitivity: u8,
        /// Number of frequency bands
        #[arg(long, default_value_t = 12)]
        bands: u16,
        /// Directory to persist the analysis artifacts into
        #[arg(long)]
        session: PathBuf,
    },
    /// Apply a persisted analysis to an instrumental and write the restored output
    Process {
        /// Instrumental WAV to restore
        #[arg(long)]
        instrumental: PathBuf,
        /// Directory holding the persisted analysis artifacts
        #[arg(long)]
        session: PathBuf,
        /// "vocal" or "mix", must match the mode used at analyze time
        #[arg(long)]
        mode: String,
        /// Restoration strength, 0-10
        #[arg(long, default_value_t = 5)]
        eq_level: u8,
        /// Number of frequency bands, must match the band count used at analyze time
        #[arg(long, default_value_t = 12)]
        bands: u16,
        /// Widen the stereo image of the restored bands
        #[arg(long)]
        stereo_widen: bool,
        /// "none", "peak", or "loudness"
        #[arg(long, default_value = "none")]
        normalization: String,
        /// Output WAV path
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            mode,
            reference,
            instrumental,
            sensitivity,
            bands,
            session,
        } => run_analyze(mode, reference, instrumental, sensitivity, bands, session),
        Commands::Process {
            instrumental,
            session,
            mode,
            eq_level,
            bands,
            stereo_widen,
            normalization,
            output,
        } => run_process(instrumental, session, mode, eq_level, bands, stereo_widen, normalization, output),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    mode: String,
    reference: PathBuf,
    instrumental: Option<PathBuf>,
    sensitivity: u8,
    bands: u16,
    session: PathBuf,
) -> Result<()> {
    let mode = Mode::from_token(&mode).map_err(anyhow::Error::msg)?;
    let config = AnalysisConfig {
        mode,
        sensitivity,
        band_count: bands,
    };

    let reference = reference.to_str().context("reference path is not valid UTF-8")?;
    let instrumental = instrumental.as_deref().map(|p| p.to_str().context("instrumental path is not valid UTF-8")).transpose()?;

    let progress = ProgressReporter::new();
    analyze_and_persist(&session, reference, instrumental, config, &progress).context("analysis failed")?;
    println!("analysis written to {}", session.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_process(
    instrumental: PathBuf,
    session: PathBuf,
    mode: String,
    eq_level: u8,
    bands: u16,
    stereo_widen: bool,
    normalization: String,
    output: PathBuf,
) -> Result<()> {
    let mode = Mode::from_token(&mode).map_err(anyhow::Error::msg)?;
    let normalization = match normalization.as_str() {
        "none" => Normalization::None,
        "peak" => Normalization::Peak,
        "loudness" => Normalization::Loudness,
        other => anyhow::bail!("unknown normalization mode \"{other}\""),
    };

    let analysis = vox_restore::artifacts::load_analysis(&session).context("loading persisted analysis")?;

    let config = ProcessConfig {
        mode,
        eq_level,
        band_count: bands,
        stereo_widen,
        normalization,
    };

    let instrumental = instrumental.to_str().context("instrumental path is not valid UTF-8")?;
    let output = output.to_str().context("output path is not valid UTF-8")?;

    let progress = ProgressReporter::new();
    process(instrumental, &analysis, config, output, &progress).context("processing failed")?;
    println!("wrote {output}");
    Ok(())
}
