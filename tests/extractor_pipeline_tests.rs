//! End-to-end pipeline tests over a mock extractor script: extraction,
//! validation, classification, and persistence through the public API.

#![cfg(unix)]

mod helpers;

use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::tempdir;

use voice_prosody::error::VoiceError;
use voice_prosody::model::{AnalysisOptions, EmotionLabel};
use voice_prosody::storage::AnalysisStore;
use voice_prosody::{VoiceAnalysisEngine, analyze_prosody};

fn options_for(script: PathBuf) -> AnalysisOptions {
    AnalysisOptions {
        extractor_bin: Some(script),
        ..AnalysisOptions::default()
    }
}

#[test]
fn analyze_prosody_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let script = helpers::write_success_extractor(dir.path());

    let analysis = analyze_prosody(Path::new("/audio/sample.wav"), &options_for(script))
        .expect("pipeline should succeed");

    assert_eq!(analysis.duration, 12.5);
    assert_eq!(analysis.pitch.mean_f0, 182.4);
    assert_eq!(analysis.pitch.voiced_fraction, 0.72);
    assert_eq!(analysis.rhythm.pause_count, 3);
    assert_eq!(analysis.voice_quality.hnr_mean, 14.2);
    assert_eq!(analysis.emotional_prosody.arousal_estimate, 0.55);
}

#[test]
fn analyze_prosody_surfaces_engine_failure() {
    let dir = tempdir().expect("tempdir");
    let payload = helpers::failure_payload("/audio/gone.wav", "File not found");
    let script = helpers::write_payload_extractor(dir.path(), "fail.sh", &payload);

    let err = analyze_prosody(Path::new("/audio/gone.wav"), &options_for(script))
        .expect_err("failure envelope must error");
    assert!(matches!(err, VoiceError::ExtractorOutput { .. }));
    assert_eq!(err.error_code(), "VP-OUTPUT");
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn analyze_prosody_rejects_implausible_output() {
    let dir = tempdir().expect("tempdir");
    let mut payload = helpers::success_payload();
    payload["pitch"]["voiced_fraction"] = json!(1.4);
    let script = helpers::write_payload_extractor(dir.path(), "implausible.sh", &payload);

    let err = analyze_prosody(Path::new("/audio/sample.wav"), &options_for(script))
        .expect_err("out-of-range voiced_fraction must be rejected, never clamped");
    assert!(matches!(err, VoiceError::ExtractorValidation { .. }));
    let text = err.to_string();
    assert!(text.contains("voiced_fraction"), "got: {text}");
    assert!(text.contains("outside"), "got: {text}");
}

#[test]
fn analyze_prosody_reports_missing_binary() {
    let options = options_for(PathBuf::from("/nonexistent/praat-analyzer"));
    let err = analyze_prosody(Path::new("/audio/sample.wav"), &options)
        .expect_err("missing binary must error");
    assert!(matches!(err, VoiceError::ExtractorMissing { .. }));
    assert_eq!(err.error_code(), "VP-PROC-MISSING");
}

#[test]
fn analyze_prosody_times_out_on_hung_extractor() {
    let dir = tempdir().expect("tempdir");
    let script = helpers::write_script(dir.path(), "hang.sh", "sleep 5");

    let options = AnalysisOptions {
        extractor_bin: Some(script),
        timeout_ms: 100,
        ..AnalysisOptions::default()
    };
    let err = analyze_prosody(Path::new("/audio/sample.wav"), &options)
        .expect_err("hung extractor must time out");
    assert!(matches!(
        err,
        VoiceError::ExtractorTimedOut { timeout_ms: 100, .. }
    ));
}

#[test]
fn ingest_pipeline_persists_and_classifies() {
    let dir = tempdir().expect("tempdir");
    let script = helpers::write_success_extractor(dir.path());
    let db_path = dir.path().join("analyses.sqlite3");
    let engine = VoiceAnalysisEngine::open(&db_path).expect("engine opens");

    let pair = engine
        .analyze_and_save(
            "audio-e2e-1",
            Path::new("/audio/sample.wav"),
            Some("story-e2e"),
            &options_for(script),
        )
        .expect("full pipeline should succeed");

    // Canonical payload: arousal 0.55 sits in the medium band, valence 0.18
    // in the else column.
    assert_eq!(pair.emotion.emotion_label, EmotionLabel::Neutral);
    assert!((pair.emotion.confidence - 0.81).abs() < 1e-9);
    assert_eq!(pair.emotion.arousal, 0.55);
    assert_eq!(pair.emotion.valence, 0.18);

    // Stored rows equal the in-memory pair exactly: full-precision REAL
    // columns, no hidden transformation.
    let store = AnalysisStore::open(&db_path).expect("second connection");
    let prosodic = store
        .latest_prosodic_by_audio_id("audio-e2e-1")
        .expect("query")
        .expect("prosodic row");
    assert_eq!(prosodic, pair.prosodic);
    assert_eq!(prosodic.mean_pitch_hz, 182.4);
    assert_eq!(prosodic.story_id.as_deref(), Some("story-e2e"));

    let emotion = store
        .latest_emotion_by_audio_id("audio-e2e-1")
        .expect("query")
        .expect("emotion row");
    assert_eq!(emotion, pair.emotion);
}

#[test]
fn reingesting_appends_rather_than_replacing() {
    let dir = tempdir().expect("tempdir");
    let script = helpers::write_success_extractor(dir.path());
    let db_path = dir.path().join("analyses.sqlite3");
    let engine = VoiceAnalysisEngine::open(&db_path).expect("engine opens");
    let options = options_for(script);

    let first = engine
        .analyze_and_save("audio-again", Path::new("/audio/sample.wav"), None, &options)
        .expect("first ingest");
    let second = engine
        .analyze_and_save("audio-again", Path::new("/audio/sample.wav"), None, &options)
        .expect("second ingest");

    assert_ne!(first.prosodic.id, second.prosodic.id);
    assert_ne!(first.emotion.id, second.emotion.id);

    let summaries = engine.recent(10).expect("recent");
    let rows_for_id = summaries
        .iter()
        .filter(|summary| summary.audio_id == "audio-again")
        .count();
    assert_eq!(rows_for_id, 2, "both analyses stay in history");
}
