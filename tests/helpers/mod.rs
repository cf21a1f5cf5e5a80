#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// Canonical well-formed extractor payload: passes every validation check and
/// trips no cultural-marker threshold. Field values stay in sync with the
/// assertions across the integration tests.
pub fn success_payload() -> Value {
    json!({
        "success": true,
        "file_path": "/audio/sample.wav",
        "duration": 12.5,
        "pitch": {
            "mean_f0": 182.4,
            "median_f0": 179.8,
            "std_f0": 24.6,
            "min_f0": 140.2,
            "max_f0": 280.7,
            "range_f0": 140.5,
            "range_semitones": 12.0,
            "voiced_fraction": 0.72
        },
        "intensity": {
            "mean_intensity": 62.3,
            "median_intensity": 63.1,
            "std_intensity": 5.4,
            "min_intensity": 48.6,
            "max_intensity": 66.6,
            "dynamic_range": 18.0
        },
        "rhythm": {
            "speech_rate": 3.8,
            "articulation_rate": 4.4,
            "pause_count": 3,
            "mean_pause_duration": 0.98,
            "total_pause_time": 2.94,
            "speaking_time": 9.56,
            "total_duration": 12.5
        },
        "voice_quality": {
            "jitter_local": 0.0132,
            "shimmer_local": 0.0741,
            "hnr_mean": 14.2,
            "crest_factor": 4.1
        },
        "emotional_prosody": {
            "arousal_estimate": 0.55,
            "valence_estimate": 0.18,
            "pitch_variability": "medium",
            "intensity_variability": "medium",
            "speaking_pace": "moderate",
            "voice_quality_rating": "clear"
        }
    })
}

/// Engine-level failure envelope (exit code 0, `success: false`).
pub fn failure_payload(file_path: &str, error: &str) -> Value {
    json!({
        "success": false,
        "file_path": file_path,
        "error": error
    })
}

/// The canonical payload as a validated in-memory result.
pub fn canonical_analysis() -> voice_prosody::model::PraatAnalysisResult {
    serde_json::from_value(success_payload()).expect("canonical payload deserializes")
}

/// A persisted prosodic row derived from the canonical payload.
pub fn prosodic_record(audio_id: &str) -> voice_prosody::model::ProsodicAnalysisRecord {
    voice_prosody::model::ProsodicAnalysisRecord::from_analysis(
        audio_id,
        None,
        &canonical_analysis(),
    )
}

/// Write an executable `/bin/sh` script with the given body.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path)
        .expect("stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Mock extractor that prints `payload` on stdout whatever it is asked.
#[cfg(unix)]
pub fn write_payload_extractor(dir: &Path, name: &str, payload: &Value) -> PathBuf {
    let body = format!("cat <<'EOF'\n{payload}\nEOF");
    write_script(dir, name, &body)
}

/// Mock extractor that always succeeds with the canonical payload.
#[cfg(unix)]
pub fn write_success_extractor(dir: &Path) -> PathBuf {
    write_payload_extractor(dir, "mock-extractor.sh", &success_payload())
}

/// Mock extractor that behaves like the real engine around missing files: a
/// failure envelope (still exit 0) when the audio path does not exist, the
/// canonical success payload otherwise.
#[cfg(unix)]
pub fn write_file_checking_extractor(dir: &Path) -> PathBuf {
    let failure = failure_payload("unknown", "File not found");
    let success = success_payload();
    let body = format!(
        "if [ ! -f \"$2\" ]; then\ncat <<'EOF'\n{failure}\nEOF\nexit 0\nfi\ncat <<'EOF'\n{success}\nEOF"
    );
    write_script(dir, "file-checking-extractor.sh", &body)
}
