//! Shared unit-test fixtures.
//!
//! One canonical validated analysis, mid-range everywhere: it passes every
//! plausibility check and trips none of the cultural-marker thresholds, so
//! tests mutate only the fields they exercise.

use std::path::{Path, PathBuf};

use crate::model::{
    EmotionalProsody, IntensityStats, PitchStats, PraatAnalysisResult, ProsodicAnalysisRecord,
    RhythmStats, SpeakingPace, VariabilityLevel, VoiceQualityRating, VoiceQualityStats,
};

pub(crate) fn analysis() -> PraatAnalysisResult {
    PraatAnalysisResult {
        file_path: "/audio/sample.wav".to_owned(),
        duration: 12.5,
        pitch: PitchStats {
            mean_f0: 182.4,
            median_f0: 179.8,
            std_f0: 24.6,
            min_f0: 140.2,
            max_f0: 280.7,
            range_f0: 140.5,
            range_semitones: 12.0,
            voiced_fraction: 0.72,
        },
        intensity: IntensityStats {
            mean_intensity: 62.3,
            median_intensity: 63.1,
            std_intensity: 5.4,
            min_intensity: 48.6,
            max_intensity: 66.6,
            dynamic_range: 18.0,
        },
        rhythm: RhythmStats {
            speech_rate: 3.8,
            articulation_rate: 4.4,
            pause_count: 3,
            mean_pause_duration: 0.98,
            total_pause_time: 2.94,
            speaking_time: 9.56,
            total_duration: 12.5,
        },
        voice_quality: VoiceQualityStats {
            jitter_local: 0.0132,
            shimmer_local: 0.0741,
            hnr_mean: 14.2,
            crest_factor: 4.1,
        },
        emotional_prosody: EmotionalProsody {
            arousal_estimate: 0.55,
            valence_estimate: 0.18,
            pitch_variability: VariabilityLevel::Medium,
            intensity_variability: VariabilityLevel::Medium,
            speaking_pace: SpeakingPace::Moderate,
            voice_quality_rating: VoiceQualityRating::Clear,
        },
    }
}

pub(crate) fn prosodic_record(audio_id: &str) -> ProsodicAnalysisRecord {
    ProsodicAnalysisRecord::from_analysis(audio_id, None, &analysis())
}

/// The canonical analysis as the extractor would print it: the validated
/// shape plus the `success` envelope.
pub(crate) fn success_payload_json() -> String {
    let mut value = serde_json::to_value(analysis()).expect("analysis serializes");
    value["success"] = serde_json::Value::Bool(true);
    value.to_string()
}

/// Write an executable `/bin/sh` script for use as a mock extractor binary.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Mock extractor that prints the canonical success payload for any input.
pub(crate) fn write_success_extractor(dir: &Path) -> PathBuf {
    let body = format!("cat <<'EOF'\n{}\nEOF", success_payload_json());
    write_script(dir, "mock-extractor.sh", &body)
}
