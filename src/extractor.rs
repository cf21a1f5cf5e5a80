//! Invocation of the external acoustic feature extractor.
//!
//! The extractor is a black box invoked as `<binary> analyze <file>`: one JSON
//! document on stdout, exit code 0 even for engine-level failures (those ride
//! the `success` envelope). Everything it emits passes through
//! [`crate::validate`] before a caller sees a result.

use std::path::Path;
use std::time::Duration;

use crate::error::VoiceResult;
use crate::model::{AnalysisOptions, PraatAnalysisResult};
use crate::process::{command_exists, run_command_with_timeout};
use crate::validate::parse_extractor_stdout;

/// Binary looked up on PATH when nothing else is configured.
pub const DEFAULT_EXTRACTOR_BIN: &str = "praat-analyzer";

/// Environment override for the extractor binary.
pub const EXTRACTOR_BIN_ENV: &str = "VOICE_PROSODY_EXTRACTOR_BIN";

/// Resolve the extractor binary: explicit option first, then the environment
/// variable, then the PATH default.
#[must_use]
pub fn resolve_binary(options: &AnalysisOptions) -> String {
    if let Some(bin) = &options.extractor_bin {
        return bin.display().to_string();
    }
    std::env::var(EXTRACTOR_BIN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXTRACTOR_BIN.to_owned())
}

#[must_use]
pub fn is_available(options: &AnalysisOptions) -> bool {
    command_exists(&resolve_binary(options))
}

pub(crate) fn build_args(audio_path: &Path) -> Vec<String> {
    vec!["analyze".to_owned(), audio_path.display().to_string()]
}

/// Run the extractor on one audio file and return the validated result.
///
/// A nonexistent audio path is not pre-checked here; the engine reports it
/// through its own failure envelope, which surfaces as an output error.
pub fn extract(audio_path: &Path, options: &AnalysisOptions) -> VoiceResult<PraatAnalysisResult> {
    let binary = resolve_binary(options);
    let args = build_args(audio_path);
    let timeout = Duration::from_millis(options.timeout_ms);

    tracing::debug!(
        binary = %binary,
        file = %audio_path.display(),
        timeout_ms = options.timeout_ms,
        "running acoustic extractor"
    );

    let output = run_command_with_timeout(&binary, &args, Some(timeout))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_extractor_stdout(&stdout)
}
