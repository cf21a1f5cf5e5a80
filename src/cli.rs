use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::VoiceResult;
use crate::model::{AnalysisOptions, BatchItem, DEFAULT_EXTRACTOR_TIMEOUT_MS};

const DEFAULT_DB_PATH: &str = ".voice_prosody/analyses.sqlite3";
const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_EXTRACTOR_TIMEOUT_MS / 1000;

#[derive(Debug, Parser)]
#[command(name = "voice-prosody")]
#[command(about = "Prosodic voice analysis and emotion inference over a Praat-based extractor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the extractor on one file and print the validated result. No
    /// persistence.
    Analyze(AnalyzeArgs),
    /// Full pipeline: analyze one file, persist the prosodic and emotion rows.
    Ingest(IngestArgs),
    /// Run the full pipeline over every entry of a JSON manifest.
    Batch(BatchArgs),
    /// Compare the latest stored analyses of two recordings.
    Compare(CompareArgs),
    /// Screen the latest stored analysis of a recording for cultural markers.
    Markers(MarkersArgs),
    /// List recent persisted analyses.
    Recent(RecentArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Path to the audio file to analyze.
    pub file: PathBuf,

    /// Extractor timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Extractor binary override (else VOICE_PROSODY_EXTRACTOR_BIN, else PATH).
    #[arg(long)]
    pub extractor_bin: Option<PathBuf>,
}

impl AnalyzeArgs {
    #[must_use]
    pub fn to_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            timeout_ms: self.timeout.saturating_mul(1000),
            extractor_bin: self.extractor_bin.clone(),
            ..AnalysisOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the audio file to analyze.
    pub file: PathBuf,

    /// Recording identifier; re-ingesting the same id appends a new row.
    #[arg(long)]
    pub audio_id: String,

    /// Optional story/collection identifier stored on both rows.
    #[arg(long)]
    pub story_id: Option<String>,

    /// Path to the analyses database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Extractor timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Extractor binary override (else VOICE_PROSODY_EXTRACTOR_BIN, else PATH).
    #[arg(long)]
    pub extractor_bin: Option<PathBuf>,
}

impl IngestArgs {
    #[must_use]
    pub fn to_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            timeout_ms: self.timeout.saturating_mul(1000),
            extractor_bin: self.extractor_bin.clone(),
            ..AnalysisOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON manifest: an array of `{audio_id, file_path, story_id?}` entries.
    #[arg(long)]
    pub manifest: PathBuf,

    /// Worker threads for the batch run.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Path to the analyses database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Extractor timeout in seconds, applied per item.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Extractor binary override (else VOICE_PROSODY_EXTRACTOR_BIN, else PATH).
    #[arg(long)]
    pub extractor_bin: Option<PathBuf>,

    /// Output format for the per-item outcomes.
    #[arg(long, value_enum, default_value_t = OutputFormat::Ndjson)]
    pub format: OutputFormat,
}

impl BatchArgs {
    #[must_use]
    pub fn to_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            timeout_ms: self.timeout.saturating_mul(1000),
            extractor_bin: self.extractor_bin.clone(),
            jobs: self.jobs,
            ..AnalysisOptions::default()
        }
    }

    pub fn load_manifest(&self) -> VoiceResult<Vec<BatchItem>> {
        load_manifest(&self.manifest)
    }
}

/// Read and parse a batch manifest file.
pub fn load_manifest(path: &Path) -> VoiceResult<Vec<BatchItem>> {
    let raw = std::fs::read_to_string(path)?;
    let items: Vec<BatchItem> = serde_json::from_str(&raw)?;
    Ok(items)
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First recording id.
    pub audio_id_1: String,

    /// Second recording id.
    pub audio_id_2: String,

    /// Path to the analyses database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
}

#[derive(Debug, Args)]
pub struct MarkersArgs {
    /// Recording id whose latest analysis is screened.
    pub audio_id: String,

    /// Path to the analyses database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
}

#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Path to the analyses database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Maximum number of analyses to list.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Output format for list mode.
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum OutputFormat {
    Plain,
    Json,
    Ndjson,
}
